use super::{to_endian, Endian, Scalar};
use crate::{IOResult, Writable};

/// Encoder of [`Scalar`](trait.Scalar.html) values into a borrowed
/// [`Writable`](../trait.Writable.html) stream.
pub struct BinaryWriter<'a, S: Writable + ?Sized> {
    stream: &'a mut S,
    endian: Endian,
}

impl<'a, S: Writable + ?Sized> BinaryWriter<'a, S> {
    /// Wrap `stream`, with values written to it in `endian` byte order.
    pub fn new(stream: &'a mut S, endian: Endian) -> Self {
        BinaryWriter { stream, endian }
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

    /// Write `value` in the byte order of this writer.
    ///
    /// Returns whether the stream accepted all the bytes of the value.
    /// A stream that runs out of room may keep part of the value.
    pub fn write<T: Scalar>(&mut self, value: T) -> IOResult<bool> {
        let bytes = to_endian(value, self.endian).to_native_bytes();
        let bytes = bytes.as_ref();
        Ok(self.stream.write(bytes)? == bytes.len())
    }
}
