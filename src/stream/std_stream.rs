use crate::stream::{resolve_seek, skip_by_seek};
use crate::{
    IOError, IOResult, Readable, SeekOrigin, Seekable, Stream, Writable,
};
use std::io::{ErrorKind, Read, Seek, SeekFrom, Write};

/// Read from a [`std::io::Read`] until `buf` is full or the source ends.
pub(crate) fn read_full<R: Read + ?Sized>(
    inner: &mut R,
    buf: &mut [u8],
) -> IOResult<usize> {
    let mut len = 0usize;
    while len < buf.len() {
        match inner.read(&mut buf[len..]) {
            Ok(0) => break,
            Ok(n) => len += n,
            Err(e) if e.kind() == ErrorKind::Interrupted => {}
            Err(e) => return Err(IOError::Io(e)),
        }
    }
    Ok(len)
}

/// Adapter of a [`std::io`] object without a position (pipe, socket,
/// standard input or output...).
///
/// The adapter is [`Readable`](../trait.Readable.html) if the object
/// implements [`std::io::Read`] and [`Writable`](../trait.Writable.html)
/// if it implements [`std::io::Write`]. It is never seekable.
/// Since the adapted object cannot tell how many bytes are pending,
/// [`try_read()`](../trait.Readable.html#method.try_read) always returns
/// 0.
pub struct StdStream<T> {
    inner: Option<T>,
}

impl<T> StdStream<T> {
    pub fn new(inner: T) -> Self {
        StdStream { inner: Some(inner) }
    }

    /// Get back the adapted object, unless the stream was closed.
    pub fn into_inner(self) -> Option<T> {
        self.inner
    }

    fn inner(&mut self) -> IOResult<&mut T> {
        self.inner.as_mut().ok_or(IOError::Closed)
    }
}

impl<T> Stream for StdStream<T> {
    fn close(&mut self) -> IOResult<()> {
        self.inner.take().map(|_| ()).ok_or(IOError::Closed)
    }
}

impl<T: Read> Readable for StdStream<T> {
    fn read(&mut self, buf: &mut [u8]) -> IOResult<usize> {
        read_full(self.inner()?, buf)
    }
}

impl<T: Write> Writable for StdStream<T> {
    fn write(&mut self, buf: &[u8]) -> IOResult<usize> {
        self.inner()?.write_all(buf)?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> IOResult<()> {
        self.inner()?.flush()?;
        Ok(())
    }
}

/// Adapter of a [`std::io::Seek`] object such as [`std::io::Cursor`].
///
/// The adapter is always [`Seekable`](../trait.Seekable.html), and
/// readable or writable depending on the adapted object.
/// Seeks past the end of the object are rejected, as for every other
/// stream.
pub struct StdSeekableStream<T: Seek> {
    inner: Option<T>,
}

impl<T: Seek> StdSeekableStream<T> {
    pub fn new(inner: T) -> Self {
        StdSeekableStream { inner: Some(inner) }
    }

    /// Get back the adapted object, unless the stream was closed.
    pub fn into_inner(self) -> Option<T> {
        self.inner
    }

    fn inner(&mut self) -> IOResult<&mut T> {
        self.inner.as_mut().ok_or(IOError::Closed)
    }
}

impl<T: Seek> Stream for StdSeekableStream<T> {
    fn close(&mut self) -> IOResult<()> {
        self.inner.take().map(|_| ()).ok_or(IOError::Closed)
    }

    fn as_seekable(&mut self) -> Option<&mut dyn Seekable> {
        Some(self)
    }
}

impl<T: Seek + Read> Readable for StdSeekableStream<T> {
    fn read(&mut self, buf: &mut [u8]) -> IOResult<usize> {
        read_full(self.inner()?, buf)
    }

    fn available(&mut self) -> IOResult<usize> {
        let pos = self.position()?;
        let size = self.total_size()?;
        Ok(size.saturating_sub(pos) as usize)
    }

    fn skip(&mut self, n: usize) -> IOResult<usize> {
        skip_by_seek(self, n)
    }
}

impl<T: Seek + Write> Writable for StdSeekableStream<T> {
    fn write(&mut self, buf: &[u8]) -> IOResult<usize> {
        self.inner()?.write_all(buf)?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> IOResult<()> {
        self.inner()?.flush()?;
        Ok(())
    }
}

impl<T: Seek> Seekable for StdSeekableStream<T> {
    fn position(&mut self) -> IOResult<u64> {
        Ok(self.inner()?.stream_position()?)
    }

    fn seek(&mut self, origin: SeekOrigin, offset: i64) -> IOResult<u64> {
        let current = self.position()?;
        let size = self.total_size()?;
        let target = resolve_seek(current, size, origin, offset)?;
        Ok(self.inner()?.seek(SeekFrom::Start(target))?)
    }

    fn total_size(&mut self) -> IOResult<u64> {
        let inner = self.inner()?;
        let pos = inner.stream_position()?;
        let end = inner.seek(SeekFrom::End(0));
        let restore = inner.seek(SeekFrom::Start(pos));
        let end = end?;
        restore?;
        Ok(end)
    }
}
