use crate::buffered::DEFAULT_BUFFER_SIZE;
use crate::{IOError, IOResult, SeekOrigin, Seekable, Stream, Writable};
use log::{debug, trace, warn};
use std::cmp::min;
use std::io::ErrorKind;

/// Buffered writer over a borrowed [`Writable`](../trait.Writable.html)
/// stream.
///
/// Written bytes accumulate in a pending region `[0, cursor)` of the
/// buffer and are pushed to the underlying stream in one write when the
/// buffer is full, when the writer is flushed, sought, closed or dropped.
/// A write that does not fit in the buffer fills it, flushes it and
/// writes its remainder directly to the underlying stream.
///
/// Pending bytes the underlying stream refuses when they are pushed are
/// dropped. A write that loses some of its own bytes this way returns a
/// short count. Bytes of earlier writes lost this way are reported as an
/// [`IOError::Io`](../enum.IOError.html) error of kind
/// [`WriteZero`](https://doc.rust-lang.org/std/io/enum.ErrorKind.html).
///
/// If the underlying stream is [`Seekable`](../trait.Seekable.html), the
/// writer is too: its position accounts for the pending bytes, and every
/// positional operation other than
/// [`position()`](../trait.Seekable.html#tymethod.position) flushes the
/// pending bytes first.
pub struct BufferedWriter<'a, S: Writable + ?Sized> {
    inner: &'a mut S,
    // None once the writer is closed.
    buffer: Option<Box<[u8]>>,
    cursor: usize,
}

impl<'a, S: Writable + ?Sized> BufferedWriter<'a, S> {
    /// Wrap `inner` with a buffer of
    /// [`DEFAULT_BUFFER_SIZE`](constant.DEFAULT_BUFFER_SIZE.html) bytes.
    pub fn new(inner: &'a mut S) -> Self {
        Self::with_capacity(inner, DEFAULT_BUFFER_SIZE)
    }

    /// Wrap `inner` with a buffer of `capacity` bytes.
    /// A writer of capacity 0 passes every write to the underlying stream.
    pub fn with_capacity(inner: &'a mut S, capacity: usize) -> Self {
        BufferedWriter {
            inner,
            buffer: Some(vec![0u8; capacity].into_boxed_slice()),
            cursor: 0,
        }
    }

    /// Size of the buffer.
    pub fn capacity(&self) -> usize {
        self.buffer.as_ref().map(|b| b.len()).unwrap_or(0)
    }

    /// Number of bytes written but not yet pushed to the underlying
    /// stream.
    pub fn pending_len(&self) -> usize {
        self.cursor
    }

    /// The wrapped stream.
    pub fn get_ref(&self) -> &S {
        &*self.inner
    }

    fn check_open(&self) -> IOResult<()> {
        match self.buffer {
            None => Err(IOError::Closed),
            Some(_) => Ok(()),
        }
    }

    /// Push pending bytes to the underlying stream.
    /// Returns the number of pending bytes the stream refused. They are
    /// dropped.
    fn flush_pending(&mut self) -> IOResult<usize> {
        if self.cursor == 0 {
            return Ok(0);
        }
        let buffer = self.buffer.as_ref().ok_or(IOError::Closed)?;
        let accepted = self.inner.write(&buffer[..self.cursor])?;
        trace!("buffered writer flushed {} bytes", accepted);
        let refused = self.cursor.saturating_sub(accepted);
        if refused > 0 {
            debug!("buffered writer dropped {} refused bytes", refused);
        }
        self.cursor = 0;
        Ok(refused)
    }

    /// Push pending bytes, failing if any of them is refused.
    fn push_pending(&mut self) -> IOResult<()> {
        match self.flush_pending()? {
            0 => Ok(()),
            refused => Err(lost_bytes(refused)),
        }
    }

    /// Push pending bytes while writing `len` bytes that are the last
    /// ones of the buffer. Returns how many of the `len` bytes were kept.
    fn push_pending_of(&mut self, len: usize) -> IOResult<usize> {
        let refused = self.flush_pending()?;
        if refused > len {
            Err(lost_bytes(refused - len))
        } else {
            Ok(len - refused)
        }
    }
}

fn lost_bytes(n: usize) -> IOError {
    IOError::Io(std::io::Error::new(
        ErrorKind::WriteZero,
        format!("underlying stream refused {} buffered bytes", n),
    ))
}

impl<'a, S: Writable + ?Sized> Stream for BufferedWriter<'a, S> {
    /// Flush pending bytes and release the buffer.
    /// The underlying stream itself is not closed.
    fn close(&mut self) -> IOResult<()> {
        self.check_open()?;
        let flushed = self.flush();
        self.buffer = None;
        self.cursor = 0;
        flushed
    }

    fn as_seekable(&mut self) -> Option<&mut dyn Seekable> {
        if self.inner.as_seekable().is_some() {
            Some(self)
        } else {
            None
        }
    }
}

impl<'a, S: Writable + ?Sized> Writable for BufferedWriter<'a, S> {
    fn write(&mut self, buf: &[u8]) -> IOResult<usize> {
        let buffer = self.buffer.as_mut().ok_or(IOError::Closed)?;
        let capacity = buffer.len();
        let len = min(capacity - self.cursor, buf.len());
        buffer[self.cursor..self.cursor + len].copy_from_slice(&buf[..len]);
        self.cursor += len;

        if len < buf.len() {
            let kept = self.push_pending_of(len)?;
            if kept < len {
                return Ok(kept);
            }
            let rest = &buf[len..];
            trace!("buffered writer bypass write of {} bytes", rest.len());
            Ok(len + self.inner.write(rest)?)
        } else if self.cursor == capacity {
            self.push_pending_of(len)
        } else {
            Ok(len)
        }
    }

    /// Push pending bytes and flush the underlying stream.
    /// Nothing happens if no byte is pending.
    fn flush(&mut self) -> IOResult<()> {
        self.check_open()?;
        if self.cursor == 0 {
            return Ok(());
        }
        let refused = self.flush_pending()?;
        self.inner.flush()?;
        match refused {
            0 => Ok(()),
            n => Err(lost_bytes(n)),
        }
    }
}

impl<'a, S: Writable + ?Sized> Seekable for BufferedWriter<'a, S> {
    fn position(&mut self) -> IOResult<u64> {
        self.check_open()?;
        let pending = self.cursor as u64;
        let inner = self.inner.as_seekable().ok_or(IOError::NotSeekable)?;
        Ok(inner.position()? + pending)
    }

    fn seek(&mut self, origin: SeekOrigin, offset: i64) -> IOResult<u64> {
        self.check_open()?;
        if self.inner.as_seekable().is_none() {
            return Err(IOError::NotSeekable);
        }
        self.push_pending()?;
        let inner = self.inner.as_seekable().ok_or(IOError::NotSeekable)?;
        inner.seek(origin, offset)
    }

    fn total_size(&mut self) -> IOResult<u64> {
        self.check_open()?;
        if self.inner.as_seekable().is_none() {
            return Err(IOError::NotSeekable);
        }
        self.push_pending()?;
        let inner = self.inner.as_seekable().ok_or(IOError::NotSeekable)?;
        inner.total_size()
    }
}

impl<'a, S: Writable + ?Sized> Drop for BufferedWriter<'a, S> {
    fn drop(&mut self) {
        if self.buffer.is_some() {
            if let Err(e) = self.close() {
                warn!("error while closing buffered writer: {}", e);
            }
        }
    }
}
