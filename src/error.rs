//----------------------------------------------------------------------------//
// Error conditions raised by streams.
//----------------------------------------------------------------------------//

/// Error type of every stream operation of this crate.
///
/// Short reads and short writes are not errors: they are reported through
/// the returned byte count (or `None`/`false` in the
/// [`binary`](../binary/index.html) codec). The variants below are raised
/// only when an operation violates a stream capability or bound, or when
/// the underlying medium fails.
#[derive(Debug, thiserror::Error)]
pub enum IOError {
    /// The stream was closed and cannot be used anymore.
    #[error("stream is closed")]
    Closed,
    /// A seek target or a bounded access falls outside of the stream
    /// addressable extent.
    #[error("out of range: {0}")]
    OutOfRange(String),
    /// Position, seek or size was requested on a stream that cannot seek.
    #[error("stream is not seekable")]
    NotSeekable,
    /// The operation cannot be implemented with the stream current
    /// settings.
    #[error("operation not supported: {0}")]
    NotSupported(&'static str),
    /// Failure of the underlying medium.
    #[error("I/O failure: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type of stream operations.
/// See [`IOError`](enum.IOError.html).
pub type IOResult<T> = Result<T, IOError>;

impl IOError {
    pub(crate) fn out_of_range(target: i128, size: u64) -> Self {
        IOError::OutOfRange(format!(
            "position {} is outside of [0, {}]",
            target, size
        ))
    }
}
