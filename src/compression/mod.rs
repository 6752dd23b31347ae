// src/compression/mod.rs
//! Decompression of repodata files
//!
//! Mirrors publish `primary.xml` and `filelists.xml` as gzip, xz or zstd.
//! The format is detected from magic bytes first and from the `href`
//! extension second, so an uncompressed file with a misleading name still
//! parses.

use crate::error::{Error, Result};
use std::io::Read;

/// Supported compression formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompressionFormat {
    /// No compression (raw data)
    None,
    /// Gzip compression (.gz)
    Gzip,
    /// XZ/LZMA compression (.xz)
    Xz,
    /// Zstandard compression (.zst)
    Zstd,
}

impl CompressionFormat {
    /// Detect compression format from file extension
    pub fn from_extension(path: &str) -> Self {
        if path.ends_with(".gz") {
            Self::Gzip
        } else if path.ends_with(".xz") {
            Self::Xz
        } else if path.ends_with(".zst") || path.ends_with(".zstd") {
            Self::Zstd
        } else {
            Self::None
        }
    }

    /// Detect compression format from magic bytes
    ///
    /// - Gzip: `1f 8b`
    /// - XZ: `fd 37 7a 58 5a 00`
    /// - Zstd: `28 b5 2f fd`
    pub fn from_magic_bytes(data: &[u8]) -> Self {
        if data.starts_with(&[0x1f, 0x8b]) {
            Self::Gzip
        } else if data.starts_with(&[0xfd, 0x37, 0x7a, 0x58, 0x5a, 0x00]) {
            Self::Xz
        } else if data.starts_with(&[0x28, 0xb5, 0x2f, 0xfd]) {
            Self::Zstd
        } else {
            Self::None
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Gzip => "gzip",
            Self::Xz => "xz",
            Self::Zstd => "zstd",
        }
    }
}

impl std::fmt::Display for CompressionFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Decompress a byte slice using the specified format
pub fn decompress(data: &[u8], format: CompressionFormat) -> Result<Vec<u8>> {
    let mut decoder: Box<dyn Read + '_> = match format {
        CompressionFormat::None => return Ok(data.to_vec()),
        CompressionFormat::Gzip => Box::new(flate2::read::GzDecoder::new(data)),
        CompressionFormat::Xz => Box::new(xz2::read::XzDecoder::new(data)),
        CompressionFormat::Zstd => Box::new(zstd::Decoder::new(data).map_err(|e| {
            Error::ParseError(format!("Failed to create zstd decoder: {}", e))
        })?),
    };

    let mut output = Vec::new();
    decoder.read_to_end(&mut output).map_err(|e| {
        Error::ParseError(format!("Failed to decompress {} data: {}", format, e))
    })?;
    Ok(output)
}

/// Decompress a downloaded repodata file
///
/// Magic bytes win; the extension of `href` is the fallback.
pub fn decompress_auto(href: &str, data: &[u8]) -> Result<Vec<u8>> {
    let format = match CompressionFormat::from_magic_bytes(data) {
        CompressionFormat::None => CompressionFormat::from_extension(href),
        detected => detected,
    };
    decompress(data, format)
}
