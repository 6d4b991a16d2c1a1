//! Length-prefixed ciphertext frame carried in the audio.
//!
//! Format: `[4 bytes big-endian length][ciphertext]`, serialized as a flat
//! bitstream with the most significant bit of each byte first.

use super::engine::EngineError;

/// Bits spent on the length prefix.
pub const LENGTH_PREFIX_BITS: u64 = 32;

/// Ciphertext wrapped for embedding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmbeddedFrame {
    ciphertext: Vec<u8>,
}

impl EmbeddedFrame {
    /// Wraps `ciphertext`, whose length must fit the 32-bit prefix.
    pub fn new(ciphertext: Vec<u8>) -> Result<Self, EngineError> {
        if u32::try_from(ciphertext.len()).is_err() {
            return Err(EngineError::FrameTooLarge(ciphertext.len()));
        }
        Ok(Self { ciphertext })
    }

    pub fn ciphertext(&self) -> &[u8] {
        &self.ciphertext
    }

    pub fn into_ciphertext(self) -> Vec<u8> {
        self.ciphertext
    }

    /// Bits needed to embed the frame, prefix included.
    pub fn bit_len(&self) -> u64 {
        LENGTH_PREFIX_BITS + self.ciphertext.len() as u64 * 8
    }

    /// The frame as a bitstream, one `0`/`1` per item.
    pub fn bits(&self) -> impl Iterator<Item = u8> + '_ {
        let prefix = (self.ciphertext.len() as u32).to_be_bytes();
        prefix
            .into_iter()
            .chain(self.ciphertext.iter().copied())
            .flat_map(byte_bits)
    }
}

/// MSB-first bits of one byte.
fn byte_bits(byte: u8) -> impl Iterator<Item = u8> {
    (0..8).rev().map(move |shift| (byte >> shift) & 1)
}

/// Packs MSB-first bits back into bytes. Trailing bits that do not fill a
/// byte are dropped.
pub(crate) fn pack_bits<I: IntoIterator<Item = u8>>(bits: I) -> Vec<u8> {
    let mut bytes = Vec::new();
    let mut current = 0u8;
    let mut filled = 0;
    for bit in bits {
        current = (current << 1) | (bit & 1);
        filled += 1;
        if filled == 8 {
            bytes.push(current);
            current = 0;
            filled = 0;
        }
    }
    bytes
}
