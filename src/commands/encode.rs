//! Encode command - hide a message or file in a WAV file.

use anyhow::{Context, Result};

use wavstego::{encode_cycle, EncodeConfig, TranscoderConfig, TranscodingAcquirer};

use super::CommandExecutor;

/// Hides the configured message or file and prints a short report.
pub struct EncodeCommand {
    pub config: EncodeConfig,
    pub transcoder: TranscoderConfig,
}

impl CommandExecutor for EncodeCommand {
    fn execute(&self) -> Result<()> {
        let acquirer = TranscodingAcquirer::new(self.transcoder.clone());

        let report = encode_cycle(&self.config, &acquirer).with_context(|| {
            format!("Failed to hide data in {}", self.config.audio.display())
        })?;

        let seal = &report.seal;
        println!(
            "Hidden {} in {}",
            if report.is_file { "file" } else { "message" },
            report.output.display()
        );
        println!(
            "  Container: {} bytes, compressed: {} bytes ({:.1}%), encrypted: {} bytes",
            seal.container_len,
            seal.compressed_len,
            seal.compression_ratio() * 100.0,
            seal.ciphertext_len
        );
        println!(
            "  Capacity used: {} of {} bits ({:.2}%)",
            report.bits_used,
            report.capacity_bits,
            report.capacity_used_percent()
        );

        Ok(())
    }
}
