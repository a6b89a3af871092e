//! Serialized form of an index blob: JSON, optionally inside a gzip envelope.

use std::io::{Read, Write};

use flate2::Compression;
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use serde::{Deserialize, Serialize};

use crate::error::{FerretError, Result};
use crate::index::IndexData;

/// The two leading bytes of every gzip stream.
pub const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// Default gzip level.
pub const DEFAULT_COMPRESSION_LEVEL: u32 = 6;

/// Compression settings shared by the storage backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompressionConfig {
    /// Wrap encoded blobs in a gzip envelope.
    pub enabled: bool,
    /// Gzip level, 0 to 9.
    pub level: u32,
}

impl Default for CompressionConfig {
    fn default() -> Self {
        CompressionConfig {
            enabled: false,
            level: DEFAULT_COMPRESSION_LEVEL,
        }
    }
}

impl CompressionConfig {
    /// Compression disabled.
    pub fn none() -> Self {
        Self::default()
    }

    /// Gzip at the given level.
    pub fn gzip(level: u32) -> Self {
        CompressionConfig {
            enabled: true,
            level,
        }
    }
}

/// Check whether `bytes` start with the gzip magic header.
pub fn is_compressed(bytes: &[u8]) -> bool {
    bytes.len() >= 2 && bytes[..2] == GZIP_MAGIC
}

/// Encode an index to bytes.
pub fn encode(data: &IndexData, compression: CompressionConfig) -> Result<Vec<u8>> {
    let json = serde_json::to_vec(data).map_err(|e| {
        FerretError::storage_with_source(format!("Failed to encode index {}", data.name()), e)
    })?;

    if !compression.enabled {
        return Ok(json);
    }

    let mut encoder = GzEncoder::new(
        Vec::with_capacity(json.len() / 4),
        Compression::new(compression.level.min(9)),
    );
    let compress_error = |e: std::io::Error| {
        FerretError::storage_with_source(format!("Failed to compress index {}", data.name()), e)
    };
    encoder.write_all(&json).map_err(compress_error)?;
    encoder.finish().map_err(compress_error)
}

/// Decode bytes produced by [`encode`], or a legacy uncompressed blob.
pub fn decode(bytes: &[u8]) -> Result<IndexData> {
    if is_compressed(bytes) {
        let mut json = Vec::with_capacity(bytes.len() * 4);
        GzDecoder::new(bytes)
            .read_to_end(&mut json)
            .map_err(|e| FerretError::storage_with_source("Failed to decompress index", e))?;
        decode_json(&json)
    } else {
        decode_json(bytes)
    }
}

fn decode_json(json: &[u8]) -> Result<IndexData> {
    serde_json::from_slice(json)
        .map_err(|e| FerretError::storage_with_source("Failed to decode index", e))
}
