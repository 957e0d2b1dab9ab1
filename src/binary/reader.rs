use super::{to_endian, Endian, Scalar};
use crate::{IOResult, Readable};

/// Decoder of [`Scalar`](trait.Scalar.html) values from a borrowed
/// [`Readable`](../trait.Readable.html) stream.
pub struct BinaryReader<'a, S: Readable + ?Sized> {
    stream: &'a mut S,
    endian: Endian,
}

impl<'a, S: Readable + ?Sized> BinaryReader<'a, S> {
    /// Wrap `stream`, with values read from it in `endian` byte order.
    pub fn new(stream: &'a mut S, endian: Endian) -> Self {
        BinaryReader { stream, endian }
    }

    /// Byte order of the encoded values.
    pub fn endian(&self) -> Endian {
        self.endian
    }

    /// The wrapped stream.
    pub fn get_ref(&self) -> &S {
        &*self.stream
    }

    /// Mutable access to the wrapped stream.
    pub fn get_mut(&mut self) -> &mut S {
        &mut *self.stream
    }

    /// Read a value stored in the byte order of this reader.
    ///
    /// Returns `None` if the stream ended before the value was complete.
    /// The bytes of an incomplete value are consumed nonetheless.
    pub fn read<T: Scalar>(&mut self) -> IOResult<Option<T>> {
        let mut bytes = T::Bytes::default();
        let buf = bytes.as_mut();
        let len = buf.len();
        if self.stream.read(buf)? != len {
            return Ok(None);
        }
        Ok(Some(to_endian(T::from_native_bytes(bytes), self.endian)))
    }

    /// Read a value into `value`.
    ///
    /// Returns whether a complete value was read. `value` is left
    /// untouched otherwise.
    pub fn read_into<T: Scalar>(&mut self, value: &mut T) -> IOResult<bool> {
        match self.read()? {
            Some(v) => {
                *value = v;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::BinaryReader;
    use crate::binary::Endian;
    use crate::buffered::BufferedReader;
    use crate::stream::{ExternalMemoryReader, OverrunPolicy};
    use crate::tests::CountingStream;
    use crate::IOError;

    #[test]
    fn test_binary_read() {
        let data: Vec<u8> = (1u8..16).collect();
        let mut view = ExternalMemoryReader::new(&data);
        let mut buffered = BufferedReader::with_capacity(&mut view, 4);
        let mut reader = BinaryReader::new(&mut buffered, Endian::Big);
        assert_eq!(reader.read::<u8>().unwrap(), Some(1));
        assert_eq!(reader.read::<u16>().unwrap(), Some(0x0203));
        assert_eq!(reader.read::<u32>().unwrap(), Some(0x04050607));
        assert_eq!(
            reader.read::<u64>().unwrap(),
            Some(0x08090a0b0c0d0e0f)
        );
        assert_eq!(reader.read::<u8>().unwrap(), None);
    }

    #[test]
    fn test_binary_read_buffered_calls() {
        let data: Vec<u8> = (0u8..64).collect();
        let mut stream = CountingStream::new(&data, true);
        let mut buffered = BufferedReader::with_capacity(&mut stream, 64);
        let mut reader = BinaryReader::new(&mut buffered, Endian::Little);
        for _ in 0..16 {
            assert!(reader.read::<u32>().unwrap().is_some());
        }
        assert_eq!(reader.get_ref().get_ref().reads, 1);
    }

    #[test]
    fn test_binary_read_overrun_error() {
        let data = [1u8, 2, 3];
        let mut view =
            ExternalMemoryReader::with_policy(&data, OverrunPolicy::Error);
        let mut reader = BinaryReader::new(&mut view, Endian::Little);
        assert_eq!(reader.read::<u16>().unwrap(), Some(0x0201));
        assert!(matches!(
            reader.read::<u16>(),
            Err(IOError::OutOfRange(_))
        ));
        assert_eq!(reader.read::<i8>().unwrap(), Some(3));
    }
}
