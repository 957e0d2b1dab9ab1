use crate::stream::std_stream::read_full;
use crate::stream::{resolve_seek, skip_by_seek};
#[cfg(feature = "mmap")]
use crate::stream::{ExternalMemoryReader, ExternalMemoryWriter};
use crate::{
    IOError, IOResult, Readable, SeekOrigin, Seekable, Stream, Writable,
};
#[cfg(feature = "mmap")]
use log::debug;
#[cfg(feature = "mmap")]
use memmap2::{Mmap, MmapMut, MmapOptions};
use std::fs::{File, OpenOptions};
use std::io::{Seek, Write};
use std::path::Path;

#[cfg(feature = "mmap")]
enum Mapping {
    ReadOnly(Mmap),
    Writable(MmapMut),
}

/// A stream implementation based on a [`std::fs::File`].
///
/// The file handle is released when the stream is closed or dropped.
/// With the `mmap` feature, a region of the file can be mapped in memory
/// and accessed through an
/// [`ExternalMemoryView`](struct.ExternalMemoryView.html). The stream owns
/// the mapping until it is unmapped, remapped or closed.
pub struct FileStream {
    // Declared before `file` so that it is dropped first.
    #[cfg(feature = "mmap")]
    mapping: Option<Mapping>,
    file: Option<File>,
}

impl FileStream {
    /// Open the file pointed by `path` for reading.
    pub fn open<P: AsRef<Path>>(path: P) -> IOResult<Self> {
        Ok(Self::from(File::open(path)?))
    }

    /// Create or truncate the file pointed by `path` and open it for
    /// writing.
    pub fn create<P: AsRef<Path>>(path: P) -> IOResult<Self> {
        Ok(Self::from(File::create(path)?))
    }

    /// Open or create the file pointed by `path` for reading and writing.
    pub fn open_read_write<P: AsRef<Path>>(path: P) -> IOResult<Self> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .open(path)?;
        Ok(Self::from(file))
    }

    /// Open an anonymous temporary file for reading and writing.
    /// The file is deleted by the operating system once closed.
    #[cfg(feature = "tempfile")]
    pub fn temporary() -> IOResult<Self> {
        Ok(Self::from(tempfile::tempfile()?))
    }

    fn file(&mut self) -> IOResult<&mut File> {
        self.file.as_mut().ok_or(IOError::Closed)
    }

    /// Check that `[begin, begin + len)` lies in the file and resolve a
    /// `len` of 0 to the rest of the file.
    #[cfg(feature = "mmap")]
    fn map_range(&mut self, begin: u64, len: usize) -> IOResult<usize> {
        let size = self.total_size()?;
        let len = match len {
            0 => size.saturating_sub(begin) as usize,
            len => len,
        };
        let end = begin as i128 + len as i128;
        if begin > size || end > size as i128 {
            return Err(IOError::OutOfRange(format!(
                "cannot map [{}, {}) of a {} bytes file",
                begin, end, size
            )));
        }
        if len == 0 {
            return Err(IOError::NotSupported("cannot map an empty region"));
        }
        self.unmap()?;
        debug!("file stream maps [{}, {})", begin, end);
        Ok(len)
    }

    /// Map `len` bytes of the file starting at offset `begin` in memory
    /// for reading. A `len` of 0 maps the rest of the file.
    ///
    /// A previous mapping is released first. The region must lie inside
    /// the file, otherwise
    /// [`IOError::OutOfRange`](../enum.IOError.html) is returned.
    #[cfg(feature = "mmap")]
    pub fn map_to_memory(
        &mut self,
        begin: u64,
        len: usize,
    ) -> IOResult<ExternalMemoryReader<'_>> {
        let len = self.map_range(begin, len)?;
        let file = self.file.as_ref().ok_or(IOError::Closed)?;
        // The mapping lives in this stream and the view borrows it, so
        // the stream cannot touch the file while the view is alive.
        let map =
            unsafe { MmapOptions::new().offset(begin).len(len).map(file)? };
        let mapping = self.mapping.insert(Mapping::ReadOnly(map));
        match mapping {
            Mapping::ReadOnly(map) => Ok(ExternalMemoryReader::new(&map[..])),
            Mapping::Writable(map) => {
                Ok(ExternalMemoryReader::new(&map[..]))
            }
        }
    }

    /// Map `len` bytes of the file starting at offset `begin` in memory
    /// for reading and writing. A `len` of 0 maps the rest of the file.
    ///
    /// The file must be open for writing. Writes through the view reach
    /// the file once the mapping is unmapped or the stream closed.
    #[cfg(feature = "mmap")]
    pub fn map_to_memory_mut(
        &mut self,
        begin: u64,
        len: usize,
    ) -> IOResult<ExternalMemoryWriter<'_>> {
        let len = self.map_range(begin, len)?;
        let file = self.file.as_ref().ok_or(IOError::Closed)?;
        // Same as `map_to_memory()`.
        let map = unsafe {
            MmapOptions::new().offset(begin).len(len).map_mut(file)?
        };
        let mapping = self.mapping.insert(Mapping::Writable(map));
        match mapping {
            Mapping::Writable(map) => {
                Ok(ExternalMemoryWriter::new(&mut map[..]))
            }
            Mapping::ReadOnly(_) => Err(IOError::NotSupported(
                "read-only mapping cannot be written",
            )),
        }
    }

    /// Release the current mapping, if any, writing its changes back to
    /// the file.
    #[cfg(feature = "mmap")]
    pub fn unmap(&mut self) -> IOResult<()> {
        if let Some(Mapping::Writable(map)) = self.mapping.take() {
            map.flush()?;
        }
        Ok(())
    }
}

impl From<File> for FileStream {
    fn from(file: File) -> Self {
        FileStream {
            #[cfg(feature = "mmap")]
            mapping: None,
            file: Some(file),
        }
    }
}

impl Stream for FileStream {
    fn close(&mut self) -> IOResult<()> {
        #[cfg(feature = "mmap")]
        self.unmap()?;
        let mut file = self.file.take().ok_or(IOError::Closed)?;
        file.flush()?;
        Ok(())
    }

    fn as_seekable(&mut self) -> Option<&mut dyn Seekable> {
        Some(self)
    }
}

impl Readable for FileStream {
    fn read(&mut self, buf: &mut [u8]) -> IOResult<usize> {
        read_full(self.file()?, buf)
    }

    fn available(&mut self) -> IOResult<usize> {
        let size = self.total_size()?;
        let pos = self.position()?;
        Ok(size.saturating_sub(pos) as usize)
    }

    fn skip(&mut self, n: usize) -> IOResult<usize> {
        skip_by_seek(self, n)
    }
}

impl Writable for FileStream {
    fn write(&mut self, buf: &[u8]) -> IOResult<usize> {
        self.file()?.write_all(buf)?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> IOResult<()> {
        self.file()?.flush()?;
        Ok(())
    }
}

impl Seekable for FileStream {
    fn position(&mut self) -> IOResult<u64> {
        Ok(self.file()?.stream_position()?)
    }

    fn seek(&mut self, origin: SeekOrigin, offset: i64) -> IOResult<u64> {
        let target = origin.to_seek_from(offset)?;
        let file = self.file()?;
        // Seeking past the end of a file is legal for the OS but not
        // for a stream.
        let size = file.metadata()?.len();
        let current = file.stream_position()?;
        resolve_seek(current, size, origin, offset)?;
        Ok(file.seek(target)?)
    }

    fn total_size(&mut self) -> IOResult<u64> {
        Ok(self.file()?.metadata()?.len())
    }
}
