//! Passphrase encryption of compressed containers.
//!
//! - HKDF-SHA256 expands the passphrase into a 256-bit key
//! - ChaCha20-Poly1305 encrypts and authenticates
//!
//! Output: `nonce (12 bytes) || ciphertext || tag (16 bytes)`. A wrong
//! passphrase fails tag verification instead of yielding garbage.

use chacha20poly1305::{
    aead::{Aead, KeyInit},
    ChaCha20Poly1305, Nonce,
};
use hkdf::Hkdf;
use rand::rngs::OsRng;
use rand::RngCore;
use sha2::Sha256;
use thiserror::Error;
use zeroize::Zeroizing;

const HKDF_INFO: &[u8] = b"WAVSTEGO-V1-KEY";

/// Fixed so the same passphrase always yields the same key.
const HKDF_SALT: &[u8] = b"WAVSTEGO-V1-SALT";

const NONCE_SIZE: usize = 12;

const TAG_SIZE: usize = 16;

/// Bytes added to every plaintext.
pub const OVERHEAD: usize = NONCE_SIZE + TAG_SIZE;

/// Errors that can occur during symmetric encryption.
#[derive(Error, Debug)]
pub enum SymmetricError {
    #[error("Encryption failed: {0}")]
    EncryptionFailed(String),

    #[error("Decryption failed (wrong passphrase or corrupted data)")]
    DecryptionFailed,

    #[error("Ciphertext too short: {0} bytes")]
    CiphertextTooShort(usize),

    #[error("Key derivation failed")]
    KeyDerivationFailed,
}

fn derive_key(passphrase: &[u8]) -> Result<Zeroizing<[u8; 32]>, SymmetricError> {
    let hk = Hkdf::<Sha256>::new(Some(HKDF_SALT), passphrase);
    let mut key = Zeroizing::new([0u8; 32]);
    hk.expand(HKDF_INFO, &mut key[..])
        .map_err(|_| SymmetricError::KeyDerivationFailed)?;
    Ok(key)
}

fn cipher_for(passphrase: &[u8]) -> Result<ChaCha20Poly1305, SymmetricError> {
    let key = derive_key(passphrase)?;
    ChaCha20Poly1305::new_from_slice(&key[..])
        .map_err(|_| SymmetricError::KeyDerivationFailed)
}

/// Encrypts `plaintext` under `passphrase` with a fresh random nonce.
pub fn encrypt(plaintext: &[u8], passphrase: &[u8]) -> Result<Vec<u8>, SymmetricError> {
    let cipher = cipher_for(passphrase)?;

    let mut nonce_bytes = [0u8; NONCE_SIZE];
    OsRng.fill_bytes(&mut nonce_bytes);

    let ciphertext = cipher
        .encrypt(Nonce::from_slice(&nonce_bytes), plaintext)
        .map_err(|e| SymmetricError::EncryptionFailed(e.to_string()))?;

    let mut out = Vec::with_capacity(NONCE_SIZE + ciphertext.len());
    out.extend_from_slice(&nonce_bytes);
    out.extend_from_slice(&ciphertext);
    Ok(out)
}

/// Decrypts data produced by [`encrypt`].
pub fn decrypt(data: &[u8], passphrase: &[u8]) -> Result<Vec<u8>, SymmetricError> {
    if data.len() < OVERHEAD {
        return Err(SymmetricError::CiphertextTooShort(data.len()));
    }

    let (nonce_bytes, ciphertext) = data.split_at(NONCE_SIZE);
    cipher_for(passphrase)?
        .decrypt(Nonce::from_slice(nonce_bytes), ciphertext)
        .map_err(|_| SymmetricError::DecryptionFailed)
}
