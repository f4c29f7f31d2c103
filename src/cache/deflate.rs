//! [`DeflateProvider`] backed by `flate2`.

use std::io::{Read, Write};

use flate2::read::{DeflateDecoder, GzDecoder, ZlibDecoder};
use flate2::write::{DeflateEncoder, GzEncoder, ZlibEncoder};
use flate2::Compression;

use super::{CacheError, DeflateProvider};

/// Container format produced by a [`FlateProvider`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FlateFormat {
    /// Raw DEFLATE stream, no header or checksum.
    Deflate,
    /// zlib header and Adler-32 trailer.
    Zlib,
    /// gzip header and CRC-32 trailer.
    #[default]
    Gzip,
}

/// Compresses cache values with DEFLATE in the configured container format.
///
/// Buffers are only readable by a provider using the same format.
///
/// # Examples
///
/// ```rust
/// use cachelite::cache::{DeflateProvider, FlateProvider};
///
/// let provider = FlateProvider::default();
/// let buffer = provider.deflate("héllo wörld").unwrap();
/// assert_eq!(provider.inflate(&buffer).unwrap(), "héllo wörld");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlateProvider {
    format: FlateFormat,
    level: Compression,
}

impl FlateProvider {
    /// Create a provider for `format` at the default compression level.
    pub fn new(format: FlateFormat) -> Self {
        Self {
            format,
            level: Compression::default(),
        }
    }

    /// Set the compression level, 0 (store) to 9 (best). Values above 9 are
    /// clamped.
    pub fn with_level(mut self, level: u32) -> Self {
        self.level = Compression::new(level.min(9));
        self
    }

    /// The container format.
    pub fn format(&self) -> FlateFormat {
        self.format
    }

    /// The compression level.
    pub fn level(&self) -> u32 {
        self.level.level()
    }
}

impl Default for FlateProvider {
    fn default() -> Self {
        Self::new(FlateFormat::default())
    }
}

impl DeflateProvider for FlateProvider {
    fn deflate(&self, text: &str) -> Result<Vec<u8>, CacheError> {
        let bytes = text.as_bytes();
        let out = match self.format {
            FlateFormat::Deflate => {
                let mut encoder = DeflateEncoder::new(Vec::new(), self.level);
                encoder.write_all(bytes)?;
                encoder.finish()?
            }
            FlateFormat::Zlib => {
                let mut encoder = ZlibEncoder::new(Vec::new(), self.level);
                encoder.write_all(bytes)?;
                encoder.finish()?
            }
            FlateFormat::Gzip => {
                let mut encoder = GzEncoder::new(Vec::new(), self.level);
                encoder.write_all(bytes)?;
                encoder.finish()?
            }
        };
        Ok(out)
    }

    fn inflate(&self, buffer: &[u8]) -> Result<String, CacheError> {
        let mut out = Vec::new();
        match self.format {
            FlateFormat::Deflate => DeflateDecoder::new(buffer).read_to_end(&mut out)?,
            FlateFormat::Zlib => ZlibDecoder::new(buffer).read_to_end(&mut out)?,
            FlateFormat::Gzip => GzDecoder::new(buffer).read_to_end(&mut out)?,
        };
        Ok(String::from_utf8(out)?)
    }
}
