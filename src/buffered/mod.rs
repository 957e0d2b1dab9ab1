//! Buffered streams.
//!
//! A buffered wrapper borrows a stream and coalesces many small
//! operations into few large ones on it:
//!
//! * [`BufferedReader`] keeps a lookahead window of bytes read from the
//! underlying stream but not yet delivered to the caller,
//! * [`BufferedWriter`] keeps a pending region of bytes written by the
//! caller but not yet pushed to the underlying stream.
//!
//! Operations larger than the buffer capacity bypass the buffer and go
//! straight to the underlying stream.
//!
//! The wrapped stream is mutably borrowed for the lifetime of the wrapper
//! such that it cannot be touched behind the wrapper back. Doing so would
//! desynchronize the buffer from the underlying stream position.
//!
//! ```
//! use bytestreams::buffered::BufferedReader;
//! use bytestreams::stream::OwnedMemoryStream;
//! use bytestreams::{Readable, Seekable};
//!
//! let mut stream = OwnedMemoryStream::from_slice(b"Some Text");
//! {
//!     let mut reader = BufferedReader::with_capacity(&mut stream, 4);
//!     assert_eq!(reader.peek_byte().unwrap(), Some(b'S'));
//!     let mut buf = [0u8; 2];
//!     assert_eq!(reader.read(&mut buf).unwrap(), 2);
//!     assert_eq!(&buf, b"So");
//!     assert_eq!(reader.position().unwrap(), 2);
//! }
//! // The wrapped stream is left where the reader stopped consuming.
//! assert_eq!(stream.position().unwrap(), 2);
//! ```

/// Default capacity of buffered readers and writers.
pub const DEFAULT_BUFFER_SIZE: usize = 1024;

mod reader;
pub use reader::BufferedReader;
mod writer;
pub use writer::BufferedWriter;
