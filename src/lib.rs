//! Composable streams of bytes.
//!
//! This library provides a small set of abstractions for reading, writing
//! and seeking sequences of bytes:
//!
//! * The stream capabilities [`Readable`], [`Writable`] and [`Seekable`],
//! and their legal compositions [`ReadWritable`], [`SeekableReadable`],
//! [`SeekableWritable`] and [`SeekableReadWritable`].
//! * In-memory [streams](stream/index.html): a growable
//! [`OwnedMemoryStream`](stream/struct.OwnedMemoryStream.html) and an
//! [`ExternalMemoryView`](stream/struct.ExternalMemoryView.html) over
//! memory owned by the caller.
//! * [Buffered](buffered/index.html) wrappers turning many small reads or
//! writes into few large ones on an underlying stream.
//! * A [binary](binary/index.html) codec reading and writing fixed-width
//! scalars in a chosen byte order.
//!
//! Streams compose from the top down: a
//! [`BinaryReader`](binary/struct.BinaryReader.html) reads from a
//! [`BufferedReader`](buffered/struct.BufferedReader.html) which reads from
//! a concrete stream.
//! ```
//! use bytestreams::binary::{BinaryReader, BinaryWriter, Endian};
//! use bytestreams::buffered::{BufferedReader, BufferedWriter};
//! use bytestreams::stream::OwnedMemoryStream;
//! use bytestreams::Seekable;
//!
//! let mut stream = OwnedMemoryStream::new();
//! {
//!     let mut buffered = BufferedWriter::new(&mut stream);
//!     let mut writer = BinaryWriter::new(&mut buffered, Endian::Big);
//!     assert!(writer.write(0x0102u16).unwrap());
//!     assert!(writer.write(3.5f64).unwrap());
//! }
//! assert_eq!(stream.total_size().unwrap(), 10);
//!
//! stream.set_position(0).unwrap();
//! let mut buffered = BufferedReader::new(&mut stream);
//! let mut reader = BinaryReader::new(&mut buffered, Endian::Big);
//! assert_eq!(reader.read::<u16>().unwrap(), Some(0x0102));
//! assert_eq!(reader.read::<f64>().unwrap(), Some(3.5));
//! assert_eq!(reader.read::<u8>().unwrap(), None);
//! ```

mod error;
pub use error::{IOError, IOResult};

/// Size of the scratch buffer used to skip bytes by reading them.
const SKIP_BUFFER_SIZE: usize = 1024;

/// Common base of every stream.
///
/// A stream is explicitly closed with
/// [`close()`](trait.Stream.html#method.close).
/// After a stream is closed, every operation other than dropping it
/// fails with [`IOError::Closed`](enum.IOError.html).
pub trait Stream {
    /// Close the stream, flushing it first if it has anything to flush.
    fn close(&mut self) -> IOResult<()> {
        Ok(())
    }

    /// Capability query: get this stream as a [`Seekable`] stream if it
    /// can seek.
    ///
    /// Wrappers use this method to discover whether the stream they wrap
    /// has a position.
    fn as_seekable(&mut self) -> Option<&mut dyn Seekable> {
        None
    }
}

/// A stream producing bytes.
pub trait Readable: Stream {
    /// Read bytes into `buf`.
    ///
    /// The call blocks until `buf` is full or the stream ends.
    /// The number of bytes read is returned. It is smaller than `buf`
    /// length only if the stream ended.
    fn read(&mut self, buf: &mut [u8]) -> IOResult<usize>;

    /// Number of bytes that can be read right away without blocking.
    /// Streams that cannot tell return 0.
    fn available(&mut self) -> IOResult<usize> {
        Ok(0)
    }

    /// Read at most `buf.len()` bytes that are immediately available.
    ///
    /// This method never blocks and never fails because not enough bytes
    /// are available: it may return 0.
    fn try_read(&mut self, buf: &mut [u8]) -> IOResult<usize> {
        let len = std::cmp::min(self.available()?, buf.len());
        if len == 0 {
            Ok(0)
        } else {
            self.read(&mut buf[..len])
        }
    }

    /// Read one byte. Returns `None` at the end of the stream.
    fn read_byte(&mut self) -> IOResult<Option<u8>> {
        let mut byte = [0u8; 1];
        match self.read(&mut byte)? {
            0 => Ok(None),
            _ => Ok(Some(byte[0])),
        }
    }

    /// Discard the next `n` bytes of the stream.
    /// Returns the number of bytes actually skipped.
    ///
    /// The default implementation reads and discards bytes.
    /// Streams that can seek should rather implement this method with
    /// [`skip_by_seek()`](stream/fn.skip_by_seek.html).
    fn skip(&mut self, n: usize) -> IOResult<usize> {
        let mut scratch = [0u8; SKIP_BUFFER_SIZE];
        let mut remaining = n;
        while remaining > 0 {
            let len = std::cmp::min(remaining, scratch.len());
            let read = self.read(&mut scratch[..len])?;
            if read == 0 {
                break;
            }
            remaining -= read;
        }
        Ok(n - remaining)
    }
}

/// A stream consuming bytes.
pub trait Writable: Stream {
    /// Write all the bytes of `buf`.
    ///
    /// The call blocks until the bytes are accepted by the underlying
    /// medium and returns the number of bytes accepted.
    fn write(&mut self, buf: &[u8]) -> IOResult<usize>;

    /// Write a single byte. Returns whether the byte was accepted.
    fn write_byte(&mut self, byte: u8) -> IOResult<bool> {
        Ok(self.write(&[byte])? == 1)
    }

    /// Make sure written bytes reached the underlying medium.
    fn flush(&mut self) -> IOResult<()> {
        Ok(())
    }
}

/// Origin of a [`seek()`](trait.Seekable.html#tymethod.seek).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeekOrigin {
    /// Offsets are counted from the first byte of the stream.
    Begin,
    /// Offsets are counted from the current position.
    Current,
    /// Offsets are counted from the end of the stream.
    End,
}

impl SeekOrigin {
    /// Convert an origin and an offset into a [`std::io::SeekFrom`].
    pub fn to_seek_from(self, offset: i64) -> IOResult<std::io::SeekFrom> {
        match self {
            SeekOrigin::Begin => u64::try_from(offset)
                .map(std::io::SeekFrom::Start)
                .map_err(|_| {
                    IOError::OutOfRange(format!(
                        "negative position {}",
                        offset
                    ))
                }),
            SeekOrigin::Current => Ok(std::io::SeekFrom::Current(offset)),
            SeekOrigin::End => Ok(std::io::SeekFrom::End(offset)),
        }
    }
}

/// A stream with an absolute position over a fixed addressable extent.
pub trait Seekable: Stream {
    /// Current position, in bytes from the beginning of the stream.
    fn position(&mut self) -> IOResult<u64>;

    /// Move the position `offset` bytes away from `origin`.
    /// The new position must lie in `[0, total_size()]`, otherwise the
    /// call fails with [`IOError::OutOfRange`](enum.IOError.html).
    /// On success, the new position is returned.
    fn seek(&mut self, origin: SeekOrigin, offset: i64) -> IOResult<u64>;

    /// Move to the absolute position `pos`.
    ///
    /// Positions past `i64::MAX` are reached with additional relative
    /// seeks.
    fn set_position(&mut self, pos: u64) -> IOResult<()> {
        let step = i64::MAX as u64;
        self.seek(SeekOrigin::Begin, std::cmp::min(pos, step) as i64)?;
        let mut left = pos.saturating_sub(step);
        while left > 0 {
            let offset = std::cmp::min(left, step);
            self.seek(SeekOrigin::Current, offset as i64)?;
            left -= offset;
        }
        Ok(())
    }

    /// Size of the stream addressable extent.
    ///
    /// The default implementation seeks to the end of the stream, reads
    /// the position and seeks back. Streams that can query their size
    /// directly should override it.
    fn total_size(&mut self) -> IOResult<u64> {
        let pos = self.position()?;
        let end = self.seek(SeekOrigin::End, 0);
        let restore = self.set_position(pos);
        let end = end?;
        restore?;
        Ok(end)
    }
}

/// A stream that can be both read and written.
pub trait ReadWritable: Readable + Writable {}
impl<T: Readable + Writable + ?Sized> ReadWritable for T {}

/// A readable stream with a position.
pub trait SeekableReadable: Seekable + Readable {}
impl<T: Seekable + Readable + ?Sized> SeekableReadable for T {}

/// A writable stream with a position.
pub trait SeekableWritable: Seekable + Writable {}
impl<T: Seekable + Writable + ?Sized> SeekableWritable for T {}

/// A readable and writable stream with a position.
pub trait SeekableReadWritable: Seekable + Readable + Writable {}
impl<T: Seekable + Readable + Writable + ?Sized> SeekableReadWritable for T {}

//----------------------------------------------------------------------------//
// Boxed streams
//----------------------------------------------------------------------------//

impl<T: Stream + ?Sized> Stream for Box<T> {
    fn close(&mut self) -> IOResult<()> {
        (**self).close()
    }

    fn as_seekable(&mut self) -> Option<&mut dyn Seekable> {
        (**self).as_seekable()
    }
}

impl<T: Readable + ?Sized> Readable for Box<T> {
    fn read(&mut self, buf: &mut [u8]) -> IOResult<usize> {
        (**self).read(buf)
    }

    fn available(&mut self) -> IOResult<usize> {
        (**self).available()
    }

    fn try_read(&mut self, buf: &mut [u8]) -> IOResult<usize> {
        (**self).try_read(buf)
    }

    fn read_byte(&mut self) -> IOResult<Option<u8>> {
        (**self).read_byte()
    }

    fn skip(&mut self, n: usize) -> IOResult<usize> {
        (**self).skip(n)
    }
}

impl<T: Writable + ?Sized> Writable for Box<T> {
    fn write(&mut self, buf: &[u8]) -> IOResult<usize> {
        (**self).write(buf)
    }

    fn write_byte(&mut self, byte: u8) -> IOResult<bool> {
        (**self).write_byte(byte)
    }

    fn flush(&mut self) -> IOResult<()> {
        (**self).flush()
    }
}

impl<T: Seekable + ?Sized> Seekable for Box<T> {
    fn position(&mut self) -> IOResult<u64> {
        (**self).position()
    }

    fn seek(&mut self, origin: SeekOrigin, offset: i64) -> IOResult<u64> {
        (**self).seek(origin, offset)
    }

    fn set_position(&mut self, pos: u64) -> IOResult<()> {
        (**self).set_position(pos)
    }

    fn total_size(&mut self) -> IOResult<u64> {
        (**self).total_size()
    }
}

/// Concrete stream implementations.
///
/// In-memory streams ([`OwnedMemoryStream`](struct.OwnedMemoryStream.html),
/// [`ExternalMemoryView`](struct.ExternalMemoryView.html)), a file backed
/// stream ([`FileStream`](struct.FileStream.html)) and adapters of
/// [`std::io`] objects ([`StdStream`](struct.StdStream.html),
/// [`StdSeekableStream`](struct.StdSeekableStream.html)).
pub mod stream;

/// Buffering of small reads and writes over an underlying stream.
pub mod buffered;

/// Endian aware reading and writing of fixed-width scalars.
pub mod binary;

#[cfg(feature = "config")]
/// Build buffered streams and codecs from a configuration file.
pub mod config;
