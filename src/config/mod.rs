//! Module to set up buffered streams and codecs from a configuration
//! file.
//!
//! Configuration files/strings use the [`toml`](https://toml.io/en/)
//! format. Every key is optional:
//! ```toml
//! buffer_size = 4096  # Capacity of buffered wrappers, default 1024.
//! endian = "big"      # "native", "little" or "big", default "native".
//! overrun = "error"   # "truncate" or "error", default "truncate".
//! ```
//! The [`StreamConfig`] structure parses such a configuration and builds
//! the configured objects over streams supplied by the caller:
//! ```
//! use bytestreams::config::StreamConfig;
//! use bytestreams::stream::OwnedMemoryStream;
//!
//! let config = StreamConfig::from_str("
//! buffer_size = 16
//! endian = 'big'
//! ").unwrap();
//!
//! let mut stream = OwnedMemoryStream::new();
//! {
//!     let mut buffered = config.buffered_writer(&mut stream);
//!     let mut writer = config.binary_writer(&mut buffered);
//!     writer.write(0x0102u16).unwrap();
//! }
//! assert_eq!(stream.storage(), &[1u8, 2]);
//! ```

use crate::binary::{BinaryReader, BinaryWriter, Endian};
use crate::buffered::{BufferedReader, BufferedWriter, DEFAULT_BUFFER_SIZE};
use crate::stream::{
    ExternalMemoryReader, ExternalMemoryWriter, ExternalMemoryView,
    OverrunPolicy,
};
use crate::{Readable, Writable};
use serde::Deserialize;
use std::path::Path;

mod error;
pub use error::ConfigError;

/// Settings of the buffered wrappers, binary codecs and external memory
/// views built by a configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StreamConfig {
    pub buffer_size: usize,
    pub endian: Endian,
    pub overrun: OverrunPolicy,
}

impl Default for StreamConfig {
    fn default() -> Self {
        StreamConfig {
            buffer_size: DEFAULT_BUFFER_SIZE,
            endian: Endian::Native,
            overrun: OverrunPolicy::Truncate,
        }
    }
}

impl StreamConfig {
    /// Parse a configuration string.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Result<Self, ConfigError> {
        let value = toml::from_str::<toml::Value>(s)?;
        Self::from_toml(value)
    }

    /// Parse a configuration file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let s = std::fs::read_to_string(path)?;
        Self::from_str(s.as_str())
    }

    /// Build a configuration from a parsed toml document.
    pub fn from_toml(value: toml::Value) -> Result<Self, ConfigError> {
        if !value.is_table() {
            return Err(ConfigError::ConfigFormat(format!(
                "expected a table, found a {}",
                value.type_str()
            )));
        }
        value
            .try_into()
            .map_err(|e| ConfigError::ConfigFormat(format!("{}", e)))
    }

    pub fn buffered_reader<'a, S: Readable + ?Sized>(
        &self,
        stream: &'a mut S,
    ) -> BufferedReader<'a, S> {
        BufferedReader::with_capacity(stream, self.buffer_size)
    }

    pub fn buffered_writer<'a, S: Writable + ?Sized>(
        &self,
        stream: &'a mut S,
    ) -> BufferedWriter<'a, S> {
        BufferedWriter::with_capacity(stream, self.buffer_size)
    }

    pub fn binary_reader<'a, S: Readable + ?Sized>(
        &self,
        stream: &'a mut S,
    ) -> BinaryReader<'a, S> {
        BinaryReader::new(stream, self.endian)
    }

    pub fn binary_writer<'a, S: Writable + ?Sized>(
        &self,
        stream: &'a mut S,
    ) -> BinaryWriter<'a, S> {
        BinaryWriter::new(stream, self.endian)
    }

    pub fn external_reader<'a>(
        &self,
        storage: &'a [u8],
    ) -> ExternalMemoryReader<'a> {
        ExternalMemoryView::with_policy(storage, self.overrun)
    }

    pub fn external_writer<'a>(
        &self,
        storage: &'a mut [u8],
    ) -> ExternalMemoryWriter<'a> {
        ExternalMemoryView::with_policy(storage, self.overrun)
    }
}
