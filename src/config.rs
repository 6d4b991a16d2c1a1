//! Immutable cycle configuration, built once from the command line.

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use zeroize::Zeroizing;

use crate::error::{Result, StegoError};

/// Longest accepted passphrase, in bytes.
pub const MAX_PASSPHRASE_LEN: usize = 16;

/// Default external decoder used when an input is not a readable WAV.
pub const DEFAULT_TRANSCODER: &str = "ffmpeg";

/// Default bound on a transcoder run.
pub const DEFAULT_TRANSCODE_TIMEOUT: Duration = Duration::from_secs(60);

/// A validated passphrase, wiped from memory on drop.
#[derive(Clone)]
pub struct Passphrase(Zeroizing<Vec<u8>>);

impl Passphrase {
    /// Accepts at most [`MAX_PASSPHRASE_LEN`] bytes.
    pub fn new(passphrase: impl Into<Vec<u8>>) -> Result<Self> {
        let bytes = Zeroizing::new(passphrase.into());
        if bytes.len() > MAX_PASSPHRASE_LEN {
            return Err(StegoError::PassphraseTooLong(bytes.len()));
        }
        Ok(Self(bytes))
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Debug for Passphrase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Passphrase(..)")
    }
}

/// What to hide.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageSource {
    /// A literal text message.
    Text(String),
    /// A file whose path names it and whose contents are the payload.
    File(PathBuf),
}

impl MessageSource {
    /// Interprets a `-m` argument: an existing file is hidden as a file,
    /// anything else is taken as the message text.
    pub fn resolve(arg: &str) -> Self {
        if Path::new(arg).is_file() {
            MessageSource::File(PathBuf::from(arg))
        } else {
            MessageSource::Text(arg.to_string())
        }
    }
}

/// External transcoder settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranscoderConfig {
    pub program: PathBuf,
    pub timeout: Duration,
}

impl Default for TranscoderConfig {
    fn default() -> Self {
        Self {
            program: PathBuf::from(DEFAULT_TRANSCODER),
            timeout: DEFAULT_TRANSCODE_TIMEOUT,
        }
    }
}

/// Settings for one encode cycle.
#[derive(Debug, Clone)]
pub struct EncodeConfig {
    pub passphrase: Passphrase,
    pub message: MessageSource,
    /// Cover audio.
    pub audio: PathBuf,
    /// Where the stego WAV is written.
    pub output: PathBuf,
}

/// Settings for one decode cycle.
#[derive(Debug, Clone)]
pub struct DecodeConfig {
    pub passphrase: Passphrase,
    pub audio: PathBuf,
    /// Directory extracted files are written into.
    pub output_dir: PathBuf,
}
