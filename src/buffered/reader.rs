use crate::buffered::DEFAULT_BUFFER_SIZE;
use crate::{IOError, IOResult, Readable, SeekOrigin, Seekable, Stream};
use log::{debug, trace, warn};
use std::cmp::min;

/// Buffered reader over a borrowed [`Readable`](../trait.Readable.html)
/// stream.
///
/// The reader keeps a window `[cursor, fill_end)` of bytes read from the
/// underlying stream but not yet delivered to the caller. Small reads are
/// served from the window and the window is refilled when it runs empty.
/// Reads larger than the buffer capacity bypass the buffer.
///
/// Because the window is read ahead, the physical position of the
/// underlying stream leads the logical position of the reader by the
/// number of unread bytes. When the underlying stream is
/// [`Seekable`](../trait.Seekable.html), the reader keeps track of the
/// physical position of the beginning of its window, such that:
/// * [`position()`](../trait.Seekable.html#tymethod.position) returns the
/// logical position,
/// * seeks landing inside the unread window do not touch the underlying
/// stream,
/// * closing or dropping the reader moves the underlying stream back to
/// the logical position.
///
/// Over a stream that cannot seek, positional methods fail with
/// [`IOError::NotSeekable`](../enum.IOError.html).
pub struct BufferedReader<'a, S: Readable + ?Sized> {
    inner: &'a mut S,
    // None once the reader is closed.
    buffer: Option<Box<[u8]>>,
    fill_end: usize,
    cursor: usize,
    // Physical position of the first byte of the buffer. None until the
    // buffer is first filled, or if `inner` cannot seek.
    fill_position: Option<u64>,
}

impl<'a, S: Readable + ?Sized> BufferedReader<'a, S> {
    /// Wrap `inner` with a buffer of
    /// [`DEFAULT_BUFFER_SIZE`](constant.DEFAULT_BUFFER_SIZE.html) bytes.
    pub fn new(inner: &'a mut S) -> Self {
        Self::with_capacity(inner, DEFAULT_BUFFER_SIZE)
    }

    /// Wrap `inner` with a buffer of `capacity` bytes.
    ///
    /// A reader of capacity 0 passes every read to the underlying
    /// stream and cannot peek.
    pub fn with_capacity(inner: &'a mut S, capacity: usize) -> Self {
        BufferedReader {
            inner,
            buffer: Some(vec![0u8; capacity].into_boxed_slice()),
            fill_end: 0,
            cursor: 0,
            fill_position: None,
        }
    }

    /// Size of the buffer.
    pub fn capacity(&self) -> usize {
        self.buffer.as_ref().map(|b| b.len()).unwrap_or(0)
    }

    /// Number of bytes in the buffer, delivered or not.
    pub fn buffered_len(&self) -> usize {
        self.fill_end
    }

    /// Number of bytes in the buffer not yet delivered.
    pub fn unread_len(&self) -> usize {
        self.fill_end - self.cursor
    }

    /// The wrapped stream.
    pub fn get_ref(&self) -> &S {
        &*self.inner
    }

    /// Read the next byte without consuming it.
    /// Returns `None` at the end of the stream.
    pub fn peek_byte(&mut self) -> IOResult<Option<u8>> {
        self.check_peek()?;
        if self.cursor == self.fill_end {
            self.fill(false, 1)?;
            if self.fill_end == 0 {
                return Ok(None);
            }
        }
        let buffer = self.buffer.as_ref().ok_or(IOError::Closed)?;
        Ok(Some(buffer[self.cursor]))
    }

    /// Copy the next bytes of the stream into `buf` without consuming
    /// them.
    ///
    /// At most [`capacity()`](struct.BufferedReader.html#method.capacity)
    /// bytes can be peeked. The number of bytes copied is returned and is
    /// smaller than `buf` length only if the stream ends or if `buf` is
    /// larger than the buffer.
    pub fn peek_bytes(&mut self, buf: &mut [u8]) -> IOResult<usize> {
        self.check_peek()?;
        let want = min(buf.len(), self.capacity());
        if self.unread_len() < want {
            self.fill(true, want)?;
        }
        let len = min(self.unread_len(), buf.len());
        let buffer = self.buffer.as_ref().ok_or(IOError::Closed)?;
        buf[..len].copy_from_slice(&buffer[self.cursor..self.cursor + len]);
        Ok(len)
    }

    fn check_open(&self) -> IOResult<()> {
        match self.buffer {
            None => Err(IOError::Closed),
            Some(_) => Ok(()),
        }
    }

    fn check_peek(&self) -> IOResult<()> {
        self.check_open()?;
        if self.capacity() == 0 {
            Err(IOError::NotSupported(
                "cannot peek through a buffer of capacity 0",
            ))
        } else {
            Ok(())
        }
    }

    fn physical_position(&mut self) -> IOResult<Option<u64>> {
        match self.inner.as_seekable() {
            None => Ok(None),
            Some(s) => Ok(Some(s.position()?)),
        }
    }

    /// Refill the buffer from the underlying stream.
    ///
    /// If `keep` is set, the unread bytes are moved to the front of the
    /// buffer, otherwise they are dropped. The buffer first takes all the
    /// bytes immediately available, then blocks until it holds at least
    /// `need` bytes or the stream ends.
    ///
    /// Bytes taken from the underlying stream stay in the window even if
    /// the blocking read fails afterwards.
    fn fill(&mut self, keep: bool, need: usize) -> IOResult<()> {
        let kept = if keep { self.fill_end - self.cursor } else { 0 };
        let physical = self.physical_position()?;
        let buffer = self.buffer.as_mut().ok_or(IOError::Closed)?;
        buffer.copy_within(self.cursor..self.cursor + kept, 0);
        self.cursor = 0;
        self.fill_end = kept;
        self.fill_position = physical.map(|p| p.saturating_sub(kept as u64));

        let need = min(need, buffer.len());
        if self.fill_end < buffer.len() {
            self.fill_end += self.inner.try_read(&mut buffer[kept..])?;
        }
        if self.fill_end < need {
            let end = self.fill_end;
            self.fill_end += self.inner.read(&mut buffer[end..need])?;
        }
        trace!("buffered reader filled {} bytes", self.fill_end - kept);
        Ok(())
    }

    /// Read into `buf` once the window is exhausted, either by refilling
    /// the window or straight from the underlying stream if `buf` is
    /// larger than the buffer.
    fn read_past_window(&mut self, buf: &mut [u8]) -> IOResult<usize> {
        if buf.len() > self.capacity() {
            trace!("buffered reader bypass read of {} bytes", buf.len());
            let len = self.inner.read(buf)?;
            self.reset_window(len as u64)?;
            Ok(len)
        } else {
            self.fill(false, buf.len())?;
            let len = min(self.fill_end, buf.len());
            let buffer = self.buffer.as_ref().ok_or(IOError::Closed)?;
            buf[..len].copy_from_slice(&buffer[..len]);
            self.cursor = len;
            Ok(len)
        }
    }

    /// Drop the buffer window after `consumed` more bytes were taken
    /// from the underlying stream past the end of the window.
    fn reset_window(&mut self, consumed: u64) -> IOResult<()> {
        self.fill_position = match self.fill_position {
            Some(p) => Some(p + self.fill_end as u64 + consumed),
            None => self.physical_position()?,
        };
        self.fill_end = 0;
        self.cursor = 0;
        Ok(())
    }
}

impl<'a, S: Readable + ?Sized> Stream for BufferedReader<'a, S> {
    /// Release the buffer. If the underlying stream can seek, it is moved
    /// back to the logical position of this reader.
    /// The underlying stream itself is not closed.
    fn close(&mut self) -> IOResult<()> {
        self.check_open()?;
        let logical = self.fill_position.map(|p| p + self.cursor as u64);
        let rewind = match (logical, self.inner.as_seekable()) {
            (Some(pos), Some(s)) => {
                debug!("buffered reader rewinds underlying stream to {}", pos);
                s.set_position(pos)
            }
            _ => Ok(()),
        };
        self.buffer = None;
        self.fill_end = 0;
        self.cursor = 0;
        self.fill_position = None;
        rewind
    }

    fn as_seekable(&mut self) -> Option<&mut dyn Seekable> {
        if self.inner.as_seekable().is_some() {
            Some(self)
        } else {
            None
        }
    }
}

impl<'a, S: Readable + ?Sized> Readable for BufferedReader<'a, S> {
    /// Read from the window first, then from the underlying stream.
    ///
    /// If bytes were already delivered from the window when the
    /// underlying stream fails, the read returns those bytes and the
    /// error is left for the next call.
    fn read(&mut self, buf: &mut [u8]) -> IOResult<usize> {
        let buffer = self.buffer.as_ref().ok_or(IOError::Closed)?;
        let from_buffer = min(self.fill_end - self.cursor, buf.len());
        buf[..from_buffer].copy_from_slice(
            &buffer[self.cursor..self.cursor + from_buffer],
        );
        self.cursor += from_buffer;

        let rest = &mut buf[from_buffer..];
        if rest.is_empty() {
            return Ok(from_buffer);
        }
        match self.read_past_window(rest) {
            Ok(len) => Ok(from_buffer + len),
            Err(e) if from_buffer == 0 => Err(e),
            Err(e) => {
                debug!(
                    "buffered reader returns {} bytes before error: {}",
                    from_buffer, e
                );
                Ok(from_buffer)
            }
        }
    }

    fn available(&mut self) -> IOResult<usize> {
        self.check_open()?;
        Ok(self.unread_len() + self.inner.available()?)
    }

    fn skip(&mut self, n: usize) -> IOResult<usize> {
        self.check_open()?;
        let unread = self.unread_len();
        if n <= unread {
            self.cursor += n;
            return Ok(n);
        }
        self.cursor = self.fill_end;
        let skipped = self.inner.skip(n - unread)?;
        self.reset_window(skipped as u64)?;
        Ok(unread + skipped)
    }
}

impl<'a, S: Readable + ?Sized> Seekable for BufferedReader<'a, S> {
    fn position(&mut self) -> IOResult<u64> {
        self.check_open()?;
        let logical = self.fill_position.map(|p| p + self.cursor as u64);
        let inner = self.inner.as_seekable().ok_or(IOError::NotSeekable)?;
        match logical {
            Some(pos) => Ok(pos),
            None => inner.position(),
        }
    }

    fn seek(&mut self, origin: SeekOrigin, offset: i64) -> IOResult<u64> {
        self.check_open()?;
        let cursor = self.cursor;
        let fill_end = self.fill_end;
        let window = self.fill_position;
        let inner = self.inner.as_seekable().ok_or(IOError::NotSeekable)?;

        // Without a window, the physical and logical positions match and
        // the seek is forwarded as is.
        let (start, target) = match (window, origin) {
            (Some(start), SeekOrigin::Begin) => (start, offset as i128),
            (Some(start), SeekOrigin::Current) => {
                (start, (start + cursor as u64) as i128 + offset as i128)
            }
            _ => {
                let pos = inner.seek(origin, offset)?;
                self.fill_position = Some(pos);
                self.fill_end = 0;
                self.cursor = 0;
                return Ok(pos);
            }
        };

        let logical = (start + cursor as u64) as i128;
        let window_end = (start + fill_end as u64) as i128;
        if (logical..=window_end).contains(&target) {
            self.cursor = (target - start as i128) as usize;
            return Ok(target as u64);
        }

        let absolute = i64::try_from(target).map_err(|_| {
            IOError::OutOfRange(format!("invalid position {}", target))
        })?;
        if absolute < 0 {
            return Err(IOError::OutOfRange(format!(
                "negative position {}",
                absolute
            )));
        }
        debug!("buffered reader seeks out of its window to {}", absolute);
        let pos = inner.seek(SeekOrigin::Begin, absolute)?;
        self.fill_position = Some(pos);
        self.fill_end = 0;
        self.cursor = 0;
        Ok(pos)
    }

    fn total_size(&mut self) -> IOResult<u64> {
        self.check_open()?;
        let inner = self.inner.as_seekable().ok_or(IOError::NotSeekable)?;
        inner.total_size()
    }
}

impl<'a, S: Readable + ?Sized> Drop for BufferedReader<'a, S> {
    fn drop(&mut self) {
        if self.buffer.is_some() {
            if let Err(e) = self.close() {
                warn!("error while closing buffered reader: {}", e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::BufferedReader;
    use crate::stream::{
        ExternalMemoryReader, OverrunPolicy, OwnedMemoryStream,
    };
    use crate::tests::{
        pattern, rand, random_chunks, test_readable, test_seekable,
        CountingStream,
    };
    use crate::{IOError, Readable, SeekOrigin, Seekable, Stream};

    const DATA: &[u8] = b"Some Text";

    #[test]
    fn test_buffered_read() {
        let mut stream = OwnedMemoryStream::from_slice(&[0u8, 1, 2, 3]);
        {
            let mut reader = BufferedReader::new(&mut stream);
            let mut buf = [0u8; 4];
            assert_eq!(reader.read(&mut buf).unwrap(), 4);
            assert_eq!(buf, [0u8, 1, 2, 3]);
            assert_eq!(reader.read(&mut buf).unwrap(), 0);
        }
        assert_eq!(stream.position().unwrap(), 4);
    }

    #[test]
    fn test_buffered_reader_contracts() {
        for capacity in [0usize, 1, 2, 4, 9, 16, 1024] {
            let mut stream = OwnedMemoryStream::from_slice(DATA);
            test_readable(
                &mut BufferedReader::with_capacity(&mut stream, capacity),
                DATA,
            );
            let mut stream = OwnedMemoryStream::from_slice(DATA);
            test_seekable(
                &mut BufferedReader::with_capacity(&mut stream, capacity),
                DATA,
            );
        }
    }

    #[test]
    fn test_buffered_read_chunks() {
        let data = pattern(2000);
        for _ in 0..200 {
            let capacity = rand(1, 300) as usize;
            let mut stream = OwnedMemoryStream::from_slice(&data);
            let mut reader =
                BufferedReader::with_capacity(&mut stream, capacity);
            let mut out = Vec::new();
            for chunk in random_chunks(data.len(), 2 * capacity) {
                let mut buf = vec![0u8; chunk];
                assert_eq!(reader.read(&mut buf).unwrap(), chunk);
                out.extend_from_slice(&buf);
                assert_eq!(reader.position().unwrap(), out.len() as u64);
            }
            assert_eq!(out, data);
            assert_eq!(reader.read(&mut [0u8; 8]).unwrap(), 0);
        }
    }

    #[test]
    fn test_buffered_small_reads_coalesce() {
        let mut stream = CountingStream::new(&pattern(64), true);
        {
            let mut reader = BufferedReader::with_capacity(&mut stream, 16);
            for i in 0..16u8 {
                assert_eq!(reader.read_byte().unwrap(), Some(i));
            }
            assert_eq!(reader.get_ref().reads, 1);
            assert_eq!(reader.read_byte().unwrap(), Some(16));
            assert_eq!(reader.get_ref().reads, 2);
        }
        // Closing rewinds the physical position to the logical one.
        assert_eq!(stream.physical_position(), 17);
    }

    #[test]
    fn test_buffered_bypass_read() {
        let data = pattern(64);
        let mut stream = CountingStream::new(&data, true);
        let mut reader = BufferedReader::with_capacity(&mut stream, 8);
        assert_eq!(reader.read_byte().unwrap(), Some(0));
        assert_eq!(reader.get_ref().reads, 1);
        assert_eq!(reader.unread_len(), 7);

        // 7 bytes from the window, 13 bytes straight from the stream.
        let mut buf = [0u8; 20];
        assert_eq!(reader.read(&mut buf).unwrap(), 20);
        assert_eq!(&buf, &data[1..21]);
        assert_eq!(reader.get_ref().reads, 2);
        assert_eq!(reader.unread_len(), 0);
        assert_eq!(reader.buffered_len(), 0);
        assert_eq!(reader.position().unwrap(), 21);
        assert_eq!(reader.read_byte().unwrap(), Some(21));
    }

    #[test]
    fn test_buffered_seek_in_window() {
        let data = pattern(64);
        let mut stream = CountingStream::new(&data, true);
        let mut reader = BufferedReader::with_capacity(&mut stream, 16);
        assert_eq!(reader.read_byte().unwrap(), Some(0));
        let calls = reader.get_ref().calls;

        // Moving inside the unread lookahead does not reach the stream.
        assert_eq!(reader.seek(SeekOrigin::Current, 4).unwrap(), 5);
        assert_eq!(reader.seek(SeekOrigin::Begin, 10).unwrap(), 10);
        assert_eq!(reader.seek(SeekOrigin::Current, 6).unwrap(), 16);
        assert_eq!(reader.position().unwrap(), 16);
        assert_eq!(reader.get_ref().calls, calls);

        // Moving out of the lookahead seeks the stream exactly once.
        assert_eq!(reader.seek(SeekOrigin::Current, -6).unwrap(), 10);
        assert_eq!(reader.get_ref().calls, calls + 1);
        assert_eq!(reader.get_ref().seeks, 1);
        assert_eq!(reader.read_byte().unwrap(), Some(10));

        let calls = reader.get_ref().calls;
        assert_eq!(reader.seek(SeekOrigin::End, -1).unwrap(), 63);
        assert_eq!(reader.get_ref().calls, calls + 1);
        assert_eq!(reader.read_byte().unwrap(), Some(63));
        assert_eq!(reader.read_byte().unwrap(), None);

        assert!(matches!(
            reader.seek(SeekOrigin::Current, -65),
            Err(IOError::OutOfRange(_))
        ));
        assert!(matches!(
            reader.seek(SeekOrigin::Begin, 65),
            Err(IOError::OutOfRange(_))
        ));
        assert_eq!(reader.position().unwrap(), 64);
    }

    #[test]
    fn test_buffered_peek() {
        let mut stream = OwnedMemoryStream::from_slice(DATA);
        let mut reader = BufferedReader::with_capacity(&mut stream, 4);
        assert_eq!(reader.peek_byte().unwrap(), Some(b'S'));
        assert_eq!(reader.peek_byte().unwrap(), Some(b'S'));
        assert_eq!(reader.position().unwrap(), 0);

        let mut buf = [0u8; 3];
        assert_eq!(reader.read(&mut buf).unwrap(), 3);
        assert_eq!(&buf, b"Som");

        // Peeking more than the window keeps the unread byte and refills.
        let mut buf = [0u8; 8];
        assert_eq!(reader.peek_bytes(&mut buf).unwrap(), 4);
        assert_eq!(&buf[..4], b"e Te");
        assert_eq!(reader.position().unwrap(), 3);

        assert_eq!(reader.skip(5).unwrap(), 5);
        assert_eq!(reader.peek_bytes(&mut buf).unwrap(), 1);
        assert_eq!(buf[0], b't');
        assert_eq!(reader.read_byte().unwrap(), Some(b't'));
        assert_eq!(reader.peek_byte().unwrap(), None);
        assert_eq!(reader.peek_bytes(&mut buf).unwrap(), 0);
    }

    #[test]
    fn test_buffered_peek_zero_capacity() {
        let mut stream = OwnedMemoryStream::from_slice(DATA);
        let mut reader = BufferedReader::with_capacity(&mut stream, 0);
        assert!(matches!(
            reader.peek_byte(),
            Err(IOError::NotSupported(_))
        ));
        assert!(matches!(
            reader.peek_bytes(&mut [0u8; 2]),
            Err(IOError::NotSupported(_))
        ));
        assert_eq!(reader.read_byte().unwrap(), Some(b'S'));
    }

    #[test]
    fn test_buffered_skip() {
        let data = pattern(100);
        let mut stream = CountingStream::new(&data, true);
        let mut reader = BufferedReader::with_capacity(&mut stream, 10);
        assert_eq!(reader.read_byte().unwrap(), Some(0));
        assert_eq!(reader.skip(4).unwrap(), 4);
        assert_eq!(reader.read_byte().unwrap(), Some(5));
        assert_eq!(reader.skip(50).unwrap(), 50);
        assert_eq!(reader.position().unwrap(), 56);
        assert_eq!(reader.read_byte().unwrap(), Some(56));
        assert_eq!(reader.skip(100).unwrap(), 43);
        assert_eq!(reader.read_byte().unwrap(), None);
    }

    #[test]
    fn test_buffered_not_seekable() {
        let data = pattern(32);
        let mut stream = CountingStream::new(&data, false);
        {
            let mut reader = BufferedReader::with_capacity(&mut stream, 8);
            assert!(reader.as_seekable().is_none());
            assert!(matches!(reader.position(), Err(IOError::NotSeekable)));
            assert!(matches!(
                reader.seek(SeekOrigin::Begin, 0),
                Err(IOError::NotSeekable)
            ));
            assert!(matches!(reader.total_size(), Err(IOError::NotSeekable)));
            test_readable(&mut reader, &data);
            reader.close().unwrap();
        }
        assert_eq!(stream.seeks, 0);
    }

    #[test]
    fn test_buffered_failed_fill_keeps_window() {
        let data = [1u8, 2, 3, 4, 5];
        let mut view =
            ExternalMemoryReader::with_policy(&data, OverrunPolicy::Error);
        {
            let mut reader = BufferedReader::with_capacity(&mut view, 8);
            // The view hands out its 5 bytes, then refuses the sixth.
            assert!(matches!(
                reader.read(&mut [0u8; 6]),
                Err(IOError::OutOfRange(_))
            ));
            assert_eq!(reader.position().unwrap(), 0);
            assert_eq!(reader.unread_len(), 5);

            let mut buf = [0u8; 2];
            assert_eq!(reader.read(&mut buf).unwrap(), 2);
            assert_eq!(buf, [1u8, 2]);
            assert_eq!(reader.seek(SeekOrigin::Begin, 0).unwrap(), 0);
            let mut buf = [0u8; 5];
            assert_eq!(reader.read(&mut buf).unwrap(), 5);
            assert_eq!(buf, data);
            assert_eq!(reader.position().unwrap(), 5);
        }
        assert_eq!(view.position().unwrap(), 5);
    }

    #[test]
    fn test_buffered_read_error_after_window() {
        let data = [1u8, 2, 3, 4, 5];
        let mut view =
            ExternalMemoryReader::with_policy(&data, OverrunPolicy::Error);
        let mut reader = BufferedReader::with_capacity(&mut view, 8);
        let mut buf = [0u8; 3];
        assert_eq!(reader.read(&mut buf).unwrap(), 3);

        // The last 2 bytes come from the window, the refill fails.
        let mut buf = [0u8; 4];
        assert_eq!(reader.read(&mut buf).unwrap(), 2);
        assert_eq!(&buf[..2], &[4u8, 5]);
        assert_eq!(reader.position().unwrap(), 5);

        // Nothing was delivered this time: the error surfaces.
        assert!(matches!(
            reader.read(&mut buf),
            Err(IOError::OutOfRange(_))
        ));
        assert_eq!(reader.position().unwrap(), 5);

        // Same through the bypass path.
        assert_eq!(reader.seek(SeekOrigin::Begin, 3).unwrap(), 3);
        assert_eq!(reader.read_byte().unwrap(), Some(4));
        let mut buf = [0u8; 12];
        assert_eq!(reader.read(&mut buf).unwrap(), 1);
        assert_eq!(buf[0], 5);
        assert_eq!(reader.position().unwrap(), 5);
    }

    #[test]
    fn test_buffered_reader_close() {
        let mut stream = OwnedMemoryStream::from_slice(DATA);
        let mut reader = BufferedReader::with_capacity(&mut stream, 8);
        let mut buf = [0u8; 3];
        assert_eq!(reader.read(&mut buf).unwrap(), 3);
        reader.close().unwrap();
        assert!(matches!(reader.read(&mut buf), Err(IOError::Closed)));
        assert!(matches!(reader.position(), Err(IOError::Closed)));
        assert!(matches!(reader.peek_byte(), Err(IOError::Closed)));
        assert!(matches!(reader.close(), Err(IOError::Closed)));
        drop(reader);
        assert_eq!(stream.position().unwrap(), 3);
        // The underlying stream is still open.
        assert_eq!(stream.read_byte().unwrap(), Some(b'e'));
    }
}
