use crate::{IOError, IOResult, Readable, SeekOrigin, Seekable};

/// Compute the target of a seek on a stream of `size` bytes currently
/// at position `current`.
///
/// The target must lie in `[0, size]`, otherwise
/// [`IOError::OutOfRange`](../enum.IOError.html) is returned.
pub fn resolve_seek(
    current: u64,
    size: u64,
    origin: SeekOrigin,
    offset: i64,
) -> IOResult<u64> {
    let base = match origin {
        SeekOrigin::Begin => 0i128,
        SeekOrigin::Current => current as i128,
        SeekOrigin::End => size as i128,
    };
    let target = base + offset as i128;
    if target < 0 || target > size as i128 {
        Err(IOError::out_of_range(target, size))
    } else {
        Ok(target as u64)
    }
}

/// Skip up to `n` bytes of a seekable stream with a single relative seek.
///
/// At most [`available()`](../trait.Readable.html#method.available) bytes
/// are skipped. Returns the number of bytes skipped.
pub fn skip_by_seek<S>(stream: &mut S, n: usize) -> IOResult<usize>
where
    S: Readable + Seekable + ?Sized,
{
    let len = std::cmp::min(n, stream.available()?);
    if len > 0 {
        stream.seek(SeekOrigin::Current, len as i64)?;
    }
    Ok(len)
}

mod memory_stream;
pub use memory_stream::OwnedMemoryStream;
mod external_view;
pub use external_view::{
    ExternalMemoryReader, ExternalMemoryView, ExternalMemoryWriter,
    OverrunPolicy,
};
mod file_stream;
pub use file_stream::FileStream;
mod std_stream;
pub use std_stream::{StdSeekableStream, StdStream};
