//! zlib wrapper for container payloads.
//!
//! Containers store a single zlib stream (2-byte header, deflate body,
//! adler32 trailer) of the whole serialized payload.

use std::io::{Read, Write};

use flate2::read::ZlibDecoder;
use flate2::write::ZlibEncoder;
use flate2::Compression;
use log::trace;

use crate::localization::types::error::{LocalizationError, Result};

/// Inflates a complete zlib stream. A stream that stops before its end
/// marker is an error, not a short result.
pub fn decompress(payload: &[u8]) -> Result<Vec<u8>> {
    trace!("Decompressing with Zlib: {} bytes", payload.len());

    let mut output = Vec::with_capacity(payload.len().saturating_mul(4));
    let mut decoder = ZlibDecoder::new(payload);
    decoder.read_to_end(&mut output).map_err(|e| {
        LocalizationError::DecompressionError(format!("Zlib decompression failed: {}", e))
    })?;
    Ok(output)
}

/// Deflates `payload` into a zlib stream at the given level.
pub fn compress(payload: &[u8], level: Compression) -> Result<Vec<u8>> {
    trace!("Compressing with Zlib: {} bytes at level {}", payload.len(), level.level());

    let to_error =
        |e: std::io::Error| LocalizationError::CompressionError(format!("Zlib compression failed: {}", e));

    let mut encoder = ZlibEncoder::new(Vec::with_capacity(payload.len() / 2), level);
    encoder.write_all(payload).map_err(to_error)?;
    encoder.finish().map_err(to_error)
}
