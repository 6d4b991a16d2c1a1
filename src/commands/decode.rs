//! Decode command - recover a hidden message or file from a WAV file.

use anyhow::{Context, Result};

use wavstego::{decode_cycle, DecodeConfig, DecodeOutcome, TranscoderConfig, TranscodingAcquirer};

use super::CommandExecutor;

/// Prints a hidden message, or writes a hidden file into the output directory
/// under its original name.
pub struct DecodeCommand {
    pub config: DecodeConfig,
    pub transcoder: TranscoderConfig,
}

impl CommandExecutor for DecodeCommand {
    fn execute(&self) -> Result<()> {
        let acquirer = TranscodingAcquirer::new(self.transcoder.clone());

        let outcome = decode_cycle(&self.config, &acquirer).with_context(|| {
            format!("Failed to recover data from {}", self.config.audio.display())
        })?;

        match outcome {
            DecodeOutcome::Message(text) => println!("{text}"),
            DecodeOutcome::File { path, size } => {
                eprintln!("Extracted file {} ({} bytes)", path.display(), size);
            }
        }

        Ok(())
    }
}
