use crate::stream::{resolve_seek, skip_by_seek};
use crate::{
    IOError, IOResult, Readable, SeekOrigin, Seekable, Stream, Writable,
};

/// A stream owning a growable `Vec<u8>`.
///
/// Reads draw bytes from the storage at the cursor position.
/// Writes overwrite bytes in place up to the end of the storage, then
/// append beyond it, such that a write always succeeds entirely.
/// Closing the stream releases its storage.
///
/// ```
/// use bytestreams::stream::OwnedMemoryStream;
/// use bytestreams::{SeekOrigin, Seekable, Writable};
///
/// let mut stream = OwnedMemoryStream::new();
/// assert_eq!(stream.write(b"Some Text").unwrap(), 9);
/// assert_eq!(stream.position().unwrap(), 9);
/// assert_eq!(stream.total_size().unwrap(), 9);
/// assert_eq!(stream.seek(SeekOrigin::End, -2).unwrap(), 7);
/// ```
#[derive(Debug, Default)]
pub struct OwnedMemoryStream {
    vec: Vec<u8>,
    pos: usize,
    closed: bool,
}

impl OwnedMemoryStream {
    /// Create an empty stream.
    pub fn new() -> Self {
        OwnedMemoryStream {
            vec: Vec::new(),
            pos: 0usize,
            closed: false,
        }
    }

    /// Create a stream with a copy of `content`.
    /// The stream position is set at the beginning of the content.
    pub fn from_slice(content: &[u8]) -> Self {
        Self::from(content.to_vec())
    }

    /// Bytes currently stored in the stream.
    pub fn storage(&self) -> &[u8] {
        self.vec.as_slice()
    }

    /// Mutable access to the bytes currently stored in the stream.
    pub fn storage_mut(&mut self) -> &mut [u8] {
        self.vec.as_mut_slice()
    }

    /// Release the stream storage.
    pub fn into_inner(self) -> Vec<u8> {
        self.vec
    }

    fn check_open(&self) -> IOResult<()> {
        if self.closed {
            Err(IOError::Closed)
        } else {
            Ok(())
        }
    }
}

impl From<Vec<u8>> for OwnedMemoryStream {
    /// Adopt `vec` as the stream storage.
    fn from(vec: Vec<u8>) -> Self {
        OwnedMemoryStream {
            vec,
            pos: 0usize,
            closed: false,
        }
    }
}

impl Stream for OwnedMemoryStream {
    fn close(&mut self) -> IOResult<()> {
        self.check_open()?;
        self.vec = Vec::new();
        self.pos = 0;
        self.closed = true;
        Ok(())
    }

    fn as_seekable(&mut self) -> Option<&mut dyn Seekable> {
        Some(self)
    }
}

impl Readable for OwnedMemoryStream {
    fn read(&mut self, buf: &mut [u8]) -> IOResult<usize> {
        self.check_open()?;
        let len = std::cmp::min(buf.len(), self.vec.len() - self.pos);
        let range = self.pos..(self.pos + len);
        buf[..len].copy_from_slice(&self.vec[range]);
        self.pos += len;
        Ok(len)
    }

    fn available(&mut self) -> IOResult<usize> {
        self.check_open()?;
        Ok(self.vec.len() - self.pos)
    }

    fn skip(&mut self, n: usize) -> IOResult<usize> {
        skip_by_seek(self, n)
    }
}

impl Writable for OwnedMemoryStream {
    fn write(&mut self, buf: &[u8]) -> IOResult<usize> {
        self.check_open()?;
        let overwrite = std::cmp::min(buf.len(), self.vec.len() - self.pos);
        let range = self.pos..(self.pos + overwrite);
        self.vec[range].copy_from_slice(&buf[..overwrite]);
        self.vec.extend_from_slice(&buf[overwrite..]);
        self.pos += buf.len();
        Ok(buf.len())
    }
}

impl Seekable for OwnedMemoryStream {
    fn position(&mut self) -> IOResult<u64> {
        self.check_open()?;
        Ok(self.pos as u64)
    }

    fn seek(&mut self, origin: SeekOrigin, offset: i64) -> IOResult<u64> {
        self.check_open()?;
        let pos = resolve_seek(
            self.pos as u64,
            self.vec.len() as u64,
            origin,
            offset,
        )?;
        self.pos = pos as usize;
        Ok(pos)
    }

    fn total_size(&mut self) -> IOResult<u64> {
        self.check_open()?;
        Ok(self.vec.len() as u64)
    }
}
