use crate::stream::{resolve_seek, skip_by_seek};
use crate::{
    IOError, IOResult, Readable, SeekOrigin, Seekable, Stream, Writable,
};

/// What an [`ExternalMemoryView`] does when a read or a write does not
/// fit in the remaining bytes of the view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "config", derive(serde::Deserialize))]
#[cfg_attr(feature = "config", serde(rename_all = "lowercase"))]
pub enum OverrunPolicy {
    /// Serve only the bytes that fit.
    #[default]
    Truncate,
    /// Fail with [`IOError::OutOfRange`](../enum.IOError.html).
    Error,
}

/// A stream over a span of memory borrowed from the caller.
///
/// The capacity of the view is the length of the span and never changes.
/// The view is readable when it borrows `&[u8]` and readable and writable
/// when it borrows `&mut [u8]`. The borrow guarantees the memory outlives
/// the view.
///
/// When an operation would go past the end of the span, the view either
/// truncates the operation or fails, depending on its
/// [`OverrunPolicy`].
///
/// ```
/// use bytestreams::stream::{ExternalMemoryReader, OverrunPolicy};
/// use bytestreams::{IOError, Readable};
///
/// let data = [1u8, 2, 3];
/// let mut buf = [0u8; 4];
///
/// let mut view = ExternalMemoryReader::new(&data);
/// assert_eq!(view.read(&mut buf).unwrap(), 3);
///
/// let mut view =
///     ExternalMemoryReader::with_policy(&data, OverrunPolicy::Error);
/// assert!(matches!(view.read(&mut buf), Err(IOError::OutOfRange(_))));
/// ```
#[derive(Debug)]
pub struct ExternalMemoryView<B> {
    storage: B,
    pos: usize,
    policy: OverrunPolicy,
    closed: bool,
}

/// Read-only view of borrowed memory.
pub type ExternalMemoryReader<'a> = ExternalMemoryView<&'a [u8]>;

/// Read-write view of borrowed memory.
pub type ExternalMemoryWriter<'a> = ExternalMemoryView<&'a mut [u8]>;

impl<B: AsRef<[u8]>> ExternalMemoryView<B> {
    /// Create a view truncating operations at the end of `storage`.
    pub fn new(storage: B) -> Self {
        Self::with_policy(storage, OverrunPolicy::Truncate)
    }

    /// Create a view handling overruns with `policy`.
    pub fn with_policy(storage: B, policy: OverrunPolicy) -> Self {
        ExternalMemoryView {
            storage,
            pos: 0usize,
            policy,
            closed: false,
        }
    }

    /// The borrowed span.
    pub fn storage(&self) -> &[u8] {
        self.storage.as_ref()
    }

    /// How the view handles operations running past its end.
    pub fn policy(&self) -> OverrunPolicy {
        self.policy
    }

    /// Length of the borrowed span.
    pub fn capacity(&self) -> usize {
        self.storage.as_ref().len()
    }

    fn check_open(&self) -> IOResult<()> {
        if self.closed {
            Err(IOError::Closed)
        } else {
            Ok(())
        }
    }

    /// Number of bytes an operation of `requested` bytes may touch.
    fn fit(&self, requested: usize) -> IOResult<usize> {
        let remaining = self.capacity() - self.pos;
        if requested <= remaining {
            Ok(requested)
        } else {
            match self.policy {
                OverrunPolicy::Truncate => Ok(remaining),
                OverrunPolicy::Error => Err(IOError::OutOfRange(format!(
                    "{} bytes requested at position {} of a {} bytes view",
                    requested,
                    self.pos,
                    self.capacity()
                ))),
            }
        }
    }
}

impl<B: AsRef<[u8]>> Stream for ExternalMemoryView<B> {
    fn close(&mut self) -> IOResult<()> {
        self.check_open()?;
        self.closed = true;
        Ok(())
    }

    fn as_seekable(&mut self) -> Option<&mut dyn Seekable> {
        Some(self)
    }
}

impl<B: AsRef<[u8]>> Readable for ExternalMemoryView<B> {
    fn read(&mut self, buf: &mut [u8]) -> IOResult<usize> {
        self.check_open()?;
        let len = self.fit(buf.len())?;
        let range = self.pos..(self.pos + len);
        buf[..len].copy_from_slice(&self.storage.as_ref()[range]);
        self.pos += len;
        Ok(len)
    }

    fn available(&mut self) -> IOResult<usize> {
        self.check_open()?;
        Ok(self.capacity() - self.pos)
    }

    fn skip(&mut self, n: usize) -> IOResult<usize> {
        skip_by_seek(self, n)
    }
}

impl<B: AsRef<[u8]> + AsMut<[u8]>> Writable for ExternalMemoryView<B> {
    fn write(&mut self, buf: &[u8]) -> IOResult<usize> {
        self.check_open()?;
        let len = self.fit(buf.len())?;
        let range = self.pos..(self.pos + len);
        self.storage.as_mut()[range].copy_from_slice(&buf[..len]);
        self.pos += len;
        Ok(len)
    }
}

impl<B: AsRef<[u8]>> Seekable for ExternalMemoryView<B> {
    fn position(&mut self) -> IOResult<u64> {
        self.check_open()?;
        Ok(self.pos as u64)
    }

    fn seek(&mut self, origin: SeekOrigin, offset: i64) -> IOResult<u64> {
        self.check_open()?;
        let pos = resolve_seek(
            self.pos as u64,
            self.capacity() as u64,
            origin,
            offset,
        )?;
        self.pos = pos as usize;
        Ok(pos)
    }

    fn total_size(&mut self) -> IOResult<u64> {
        self.check_open()?;
        Ok(self.capacity() as u64)
    }
}
