//! Pipeline error type.

use std::path::PathBuf;

use thiserror::Error;

use crate::acquire::AcquireError;
use crate::config::MAX_PASSPHRASE_LEN;
use crate::container::ContainerError;
use crate::crypto::{CompressionError, SymmetricError};
use crate::stego::{AudioError, EngineError};

/// Errors that abort an encode or decode cycle.
#[derive(Error, Debug)]
pub enum StegoError {
    #[error("Passphrase is {0} bytes, only {MAX_PASSPHRASE_LEN} are allowed")]
    PassphraseTooLong(usize),

    #[error("Cannot access {}: {source}", .path.display())]
    FileAccess {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Acquire(#[from] AcquireError),

    #[error("Failed to write audio: {0}")]
    AudioWrite(#[source] AudioError),

    #[error("Malformed container: {0}")]
    MalformedContainer(#[from] ContainerError),

    #[error(transparent)]
    Embedding(#[from] EngineError),

    #[error(transparent)]
    Compression(#[from] CompressionError),

    #[error(transparent)]
    Crypto(#[from] SymmetricError),
}

impl StegoError {
    pub(crate) fn file_access(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::FileAccess {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, StegoError>;
