//! Payload transforms applied between framing and embedding.
//!
//! - DEFLATE compression with a stored fallback
//! - Passphrase encryption (HKDF-SHA256 + ChaCha20-Poly1305)

pub mod compression;
pub mod symmetric;

pub use compression::{compress, compression_ratio, decompress, CompressionError};
pub use symmetric::{decrypt, encrypt, SymmetricError};
