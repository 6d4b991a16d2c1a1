//! Audio acquisition.
//!
//! [`TranscodingAcquirer`] reads WAV files natively and, when that fails,
//! falls back once to an external decoder that converts the input to a
//! temporary 16-bit PCM WAV. [`MemoryAcquirer`] serves prepared buffers.

use std::collections::HashMap;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::config::TranscoderConfig;
use crate::stego::{AudioError, SampleBuffer};

/// How often a running transcoder is polled for exit.
const POLL_INTERVAL: Duration = Duration::from_millis(20);

/// Errors raised while obtaining samples.
#[derive(Error, Debug)]
pub enum AcquireError {
    #[error("Cannot read audio file {}: {source}", .path.display())]
    Unreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Audio decode failed: {0}")]
    Decode(#[from] AudioError),

    #[error("Transcoding failed: {0}")]
    Transcode(String),

    #[error("Transcoder timed out after {0:?}")]
    TranscodeTimeout(Duration),
}

/// Source of decoded sample buffers.
pub trait AudioAcquirer {
    /// Decodes the audio at `path`.
    fn acquire(&self, path: &Path) -> Result<SampleBuffer, AcquireError>;
}

/// Native WAV decoding with an external-decoder fallback.
#[derive(Debug, Clone, Default)]
pub struct TranscodingAcquirer {
    config: TranscoderConfig,
}

impl TranscodingAcquirer {
    pub fn new(config: TranscoderConfig) -> Self {
        Self { config }
    }

    /// Converts `input` to 16-bit PCM WAV and decodes the result.
    ///
    /// The temporary WAV is removed when this returns, on every path.
    fn transcode(&self, input: &Path) -> Result<SampleBuffer, AcquireError> {
        let temp = tempfile::Builder::new()
            .prefix("wavstego-")
            .suffix(".wav")
            .tempfile()
            .map_err(|e| AcquireError::Transcode(format!("cannot create temp file: {e}")))?;

        let program = &self.config.program;
        debug!(
            program = %program.display(),
            output = %temp.path().display(),
            "starting transcoder"
        );

        let mut child = Command::new(program)
            .args(["-nostdin", "-y", "-loglevel", "error", "-i"])
            .arg(input)
            .args(["-acodec", "pcm_s16le"])
            .arg(temp.path())
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| {
                AcquireError::Transcode(format!("cannot start {}: {e}", program.display()))
            })?;

        // Drained concurrently so a chatty transcoder cannot block on a full pipe.
        let stderr_reader = child.stderr.take().map(|mut pipe| {
            thread::spawn(move || {
                let mut captured = String::new();
                let _ = pipe.read_to_string(&mut captured);
                captured
            })
        });

        let status = wait_with_timeout(&mut child, self.config.timeout)?;
        if !status.success() {
            let stderr = stderr_reader
                .and_then(|reader| reader.join().ok())
                .unwrap_or_default();
            return Err(AcquireError::Transcode(format!(
                "{} exited with {status}: {}",
                program.display(),
                stderr.trim()
            )));
        }

        let buffer = SampleBuffer::from_file(temp.path())?;
        info!("Transcoded {} to 16-bit PCM", input.display());
        Ok(buffer)
    }
}

impl AudioAcquirer for TranscodingAcquirer {
    fn acquire(&self, path: &Path) -> Result<SampleBuffer, AcquireError> {
        std::fs::metadata(path).map_err(|source| AcquireError::Unreadable {
            path: path.to_path_buf(),
            source,
        })?;

        match SampleBuffer::from_file(path) {
            Ok(buffer) => Ok(buffer),
            Err(native) => {
                warn!(
                    "{} is not a readable WAV ({native}), trying {}",
                    path.display(),
                    self.config.program.display()
                );
                self.transcode(path)
            }
        }
    }
}

/// Waits for `child`, killing it once `timeout` has elapsed.
fn wait_with_timeout(child: &mut Child, timeout: Duration) -> Result<ExitStatus, AcquireError> {
    let deadline = Instant::now() + timeout;
    loop {
        match child.try_wait() {
            Ok(Some(status)) => return Ok(status),
            Ok(None) => {}
            Err(e) => {
                let _ = child.kill();
                let _ = child.wait();
                return Err(AcquireError::Transcode(format!("cannot wait for transcoder: {e}")));
            }
        }

        if Instant::now() >= deadline {
            let _ = child.kill();
            let _ = child.wait();
            return Err(AcquireError::TranscodeTimeout(timeout));
        }
        thread::sleep(POLL_INTERVAL);
    }
}

/// Serves buffers registered in memory, keyed by path.
#[derive(Debug, Clone, Default)]
pub struct MemoryAcquirer {
    buffers: HashMap<PathBuf, SampleBuffer>,
}

impl MemoryAcquirer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `buffer` under `path`, replacing any previous entry.
    pub fn insert(&mut self, path: impl Into<PathBuf>, buffer: SampleBuffer) {
        self.buffers.insert(path.into(), buffer);
    }

    pub fn with(mut self, path: impl Into<PathBuf>, buffer: SampleBuffer) -> Self {
        self.insert(path, buffer);
        self
    }
}

impl AudioAcquirer for MemoryAcquirer {
    fn acquire(&self, path: &Path) -> Result<SampleBuffer, AcquireError> {
        self.buffers
            .get(path)
            .cloned()
            .ok_or_else(|| AcquireError::Unreadable {
                path: path.to_path_buf(),
                source: std::io::Error::new(std::io::ErrorKind::NotFound, "no such buffer"),
            })
    }
}
