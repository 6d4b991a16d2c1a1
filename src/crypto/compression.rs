//! DEFLATE compression of containers before encryption.
//!
//! Output starts with a marker byte: [`STORED`] when deflating would not
//! shrink the input (the bytes follow verbatim), [`DEFLATED`] otherwise.

use flate2::write::{DeflateDecoder, DeflateEncoder};
use flate2::Compression;
use std::io::Write;
use thiserror::Error;

/// Marker for data kept as-is.
pub const STORED: u8 = 0;

/// Marker for DEFLATE-compressed data.
pub const DEFLATED: u8 = 1;

/// Compression errors.
#[derive(Error, Debug)]
pub enum CompressionError {
    #[error("Compression failed: {0}")]
    CompressionFailed(String),

    #[error("Decompression failed: {0}")]
    DecompressionFailed(String),
}

/// Compresses `data`, falling back to storing it when DEFLATE does not help.
pub fn compress(data: &[u8]) -> Result<Vec<u8>, CompressionError> {
    let mut encoder = DeflateEncoder::new(vec![DEFLATED], Compression::best());
    encoder
        .write_all(data)
        .map_err(|e| CompressionError::CompressionFailed(e.to_string()))?;
    let deflated = encoder
        .finish()
        .map_err(|e| CompressionError::CompressionFailed(e.to_string()))?;

    if deflated.len() <= data.len() {
        return Ok(deflated);
    }

    let mut stored = Vec::with_capacity(data.len() + 1);
    stored.push(STORED);
    stored.extend_from_slice(data);
    Ok(stored)
}

/// Reverses [`compress`].
pub fn decompress(data: &[u8]) -> Result<Vec<u8>, CompressionError> {
    let Some((&marker, body)) = data.split_first() else {
        return Err(CompressionError::DecompressionFailed(
            "missing marker byte".to_string(),
        ));
    };

    match marker {
        STORED => Ok(body.to_vec()),
        DEFLATED => {
            let mut decoder = DeflateDecoder::new(Vec::new());
            decoder
                .write_all(body)
                .and_then(|_| decoder.finish())
                .map_err(|e| CompressionError::DecompressionFailed(e.to_string()))
        }
        other => Err(CompressionError::DecompressionFailed(format!(
            "invalid marker byte: {other}"
        ))),
    }
}

/// Compressed size over original size; below 1.0 means compression helped.
pub fn compression_ratio(original_len: usize, compressed_len: usize) -> f64 {
    if original_len == 0 {
        return 1.0;
    }
    compressed_len as f64 / original_len as f64
}
