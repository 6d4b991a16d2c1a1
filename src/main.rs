//! wavstego - hide messages and files in WAV audio
//!
//! Encode: `wavstego -e <pin> -m <message-or-file> -a <audio> -o <output.wav>`
//! Decode: `wavstego -d <pin> -a <audio>`

mod commands;

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use clap::{ArgGroup, Parser};
use tracing_subscriber::EnvFilter;

use commands::{CommandExecutor, DecodeCommand, EncodeCommand};
use wavstego::{DecodeConfig, EncodeConfig, MessageSource, Passphrase, TranscoderConfig};

/// wavstego - hide messages and files in WAV audio
///
/// The payload is compressed, encrypted with the pin and written into the
/// least significant bits of the audio samples. Inputs that are not WAV
/// files are converted with ffmpeg first.
#[derive(Parser, Debug)]
#[command(name = "wavstego")]
#[command(version)]
#[command(about = "Hide compressed, encrypted messages and files in WAV audio")]
#[command(group(ArgGroup::new("mode").required(true).args(["encode", "decode"])))]
struct Cli {
    /// Encode mode with pin set (at most 16 bytes)
    #[arg(short = 'e', long, value_name = "PIN", requires_all = ["message", "output"])]
    encode: Option<String>,

    /// Decode mode with pin set; a hidden file is written to the current
    /// directory under its original name
    #[arg(short = 'd', long, value_name = "PIN")]
    decode: Option<String>,

    /// Message file to hide; if no such file exists the text itself is hidden
    #[arg(short = 'm', long, value_name = "FILE|TEXT", requires = "encode")]
    message: Option<String>,

    /// Audio file
    #[arg(short = 'a', long, value_name = "FILE")]
    audio: PathBuf,

    /// Output audio file
    #[arg(short = 'o', long, value_name = "FILE", requires = "encode")]
    output: Option<PathBuf>,

    /// External decoder for non-WAV inputs
    #[arg(long, value_name = "PATH", env = "WAVSTEGO_FFMPEG", default_value = "ffmpeg")]
    ffmpeg: PathBuf,

    /// Seconds to wait for the external decoder
    #[arg(
        long,
        value_name = "SECS",
        env = "WAVSTEGO_TRANSCODE_TIMEOUT",
        default_value_t = 60
    )]
    transcode_timeout: u64,

    /// Verbose output (shows every pipeline stage)
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    fn into_command(self) -> Result<Box<dyn CommandExecutor>> {
        let transcoder = TranscoderConfig {
            program: self.ffmpeg,
            timeout: Duration::from_secs(self.transcode_timeout),
        };

        if let Some(pin) = self.decode {
            return Ok(Box::new(DecodeCommand {
                config: DecodeConfig {
                    passphrase: Passphrase::new(pin)?,
                    audio: self.audio,
                    output_dir: PathBuf::from("."),
                },
                transcoder,
            }));
        }

        let (Some(pin), Some(message), Some(output)) = (self.encode, self.message, self.output)
        else {
            anyhow::bail!("Missing arguments: encode needs -e <pin> -m <file> -o <output>");
        };
        Ok(Box::new(EncodeCommand {
            config: EncodeConfig {
                passphrase: Passphrase::new(pin)?,
                message: MessageSource::resolve(&message),
                audio: self.audio,
                output,
            },
            transcoder,
        }))
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "wavstego=info" } else { "wavstego=warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    cli.into_command()?.execute()
}
