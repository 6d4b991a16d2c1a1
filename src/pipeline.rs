//! Encode and decode cycles.
//!
//! Encode: container → compress → encrypt → embed → denormalize → WAV.
//! Decode: WAV → normalize → extract → decrypt → decompress → container.
//!
//! Every stage consumes the whole output of the previous one and any failure
//! aborts the cycle. Output files are written to a temporary file next to
//! their destination and renamed into place only once complete.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::acquire::{AcquireError, AudioAcquirer};
use crate::config::{DecodeConfig, EncodeConfig, MessageSource, Passphrase};
use crate::container::{decode_container, Container};
use crate::crypto::{compress, compression_ratio, decompress, decrypt, encrypt};
use crate::error::{Result, StegoError};
use crate::stego::{self, AudioError, SampleBuffer, LENGTH_PREFIX_BITS};

/// Sizes observed while sealing a container.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SealStats {
    pub container_len: usize,
    pub compressed_len: usize,
    pub ciphertext_len: usize,
}

impl SealStats {
    pub fn compression_ratio(&self) -> f64 {
        compression_ratio(self.container_len, self.compressed_len)
    }
}

/// Summary of a finished encode cycle.
#[derive(Debug, Clone, PartialEq)]
pub struct EncodeReport {
    pub output: PathBuf,
    pub is_file: bool,
    pub seal: SealStats,
    pub bits_used: u64,
    pub capacity_bits: u64,
}

impl EncodeReport {
    /// Share of the audio's capacity taken by the hidden frame, in percent.
    pub fn capacity_used_percent(&self) -> f64 {
        if self.capacity_bits == 0 {
            return 0.0;
        }
        self.bits_used as f64 * 100.0 / self.capacity_bits as f64
    }
}

/// What a decode cycle recovered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodeOutcome {
    /// A text message; nothing was written.
    Message(String),
    /// A file written to `path`.
    File { path: PathBuf, size: usize },
}

/// Frames, compresses and encrypts `container`.
pub fn seal(container: &Container, passphrase: &Passphrase) -> Result<Vec<u8>> {
    seal_with_stats(container, passphrase).map(|(ciphertext, _)| ciphertext)
}

fn seal_with_stats(
    container: &Container,
    passphrase: &Passphrase,
) -> Result<(Vec<u8>, SealStats)> {
    let framed = container.to_bytes()?;
    let compressed = compress(&framed)?;
    info!(
        "Compression finished (ratio: {:.1}%)",
        compression_ratio(framed.len(), compressed.len()) * 100.0
    );

    let ciphertext = encrypt(&compressed, passphrase.as_bytes())?;
    info!("Encryption finished");

    let stats = SealStats {
        container_len: framed.len(),
        compressed_len: compressed.len(),
        ciphertext_len: ciphertext.len(),
    };
    Ok((ciphertext, stats))
}

/// Decrypts, decompresses and parses what [`seal`] produced.
pub fn unseal(ciphertext: &[u8], passphrase: &Passphrase) -> Result<Container> {
    let compressed = decrypt(ciphertext, passphrase.as_bytes())?;
    info!("Decryption finished");

    let framed = decompress(&compressed)?;
    info!("Decompression finished");

    Ok(decode_container(&framed)?)
}

/// Hides `container` in a copy of `buffer`.
pub fn hide(
    buffer: &SampleBuffer,
    container: &Container,
    passphrase: &Passphrase,
) -> Result<SampleBuffer> {
    hide_with_stats(buffer, container, passphrase).map(|(hidden, _)| hidden)
}

fn hide_with_stats(
    buffer: &SampleBuffer,
    container: &Container,
    passphrase: &Passphrase,
) -> Result<(SampleBuffer, SealStats)> {
    let (ciphertext, stats) = seal_with_stats(container, passphrase)?;

    // The scale comes from the cover, never from the embedded samples.
    let mut cover = buffer.clone();
    let scale = cover.normalize();
    if !scale.is_unity() {
        debug!(scale = scale.factor(), "normalized float samples");
    }

    let mut hidden = stego::embed(&cover, &ciphertext)?;
    hidden.denormalize_changed(&cover, buffer, scale);
    info!("Stego finished");
    Ok((hidden, stats))
}

/// Recovers the container hidden by [`hide`].
pub fn reveal(mut buffer: SampleBuffer, passphrase: &Passphrase) -> Result<Container> {
    buffer.normalize();
    let ciphertext = stego::extract(&buffer)?;
    debug!(bytes = ciphertext.len(), "extracted ciphertext");
    unseal(&ciphertext, passphrase)
}

/// Builds the container for `source`, reading the file if there is one.
pub fn load_container(source: &MessageSource) -> Result<Container> {
    match source {
        MessageSource::Text(text) => Ok(Container::message(text.as_bytes())),
        MessageSource::File(path) => {
            let data = fs::read(path).map_err(|e| StegoError::file_access(path, e))?;
            let name = path.to_string_lossy().into_owned();
            Ok(Container::file(name, data))
        }
    }
}

fn acquire_audio(acquirer: &dyn AudioAcquirer, path: &Path) -> Result<SampleBuffer> {
    let buffer = acquirer.acquire(path)?;
    if buffer.is_empty() {
        return Err(AcquireError::Decode(AudioError::Empty).into());
    }

    let meta = buffer.metadata();
    info!(
        channels = meta.channels,
        bits = meta.bits_per_sample,
        sample_rate = meta.sample_rate,
        data_size = meta.data_size(),
        "Audio file opened"
    );
    Ok(buffer)
}

/// Runs a full encode cycle.
pub fn encode_cycle(config: &EncodeConfig, acquirer: &dyn AudioAcquirer) -> Result<EncodeReport> {
    info!("Encode cycle started");

    let container = load_container(&config.message)?;
    info!("Message/File prepared");

    let cover = acquire_audio(acquirer, &config.audio)?;
    let (hidden, stats) = hide_with_stats(&cover, &container, &config.passphrase)?;

    write_atomically(&config.output, |path| {
        hidden.save(path).map_err(StegoError::AudioWrite)
    })?;
    info!("Wrote {}", config.output.display());

    Ok(EncodeReport {
        output: config.output.clone(),
        is_file: container.is_file(),
        seal: stats,
        bits_used: LENGTH_PREFIX_BITS + stats.ciphertext_len as u64 * 8,
        capacity_bits: cover.capacity_bits(),
    })
}

/// Runs a full decode cycle.
///
/// Text messages are returned; files are written into `config.output_dir`
/// under the last component of their stored name, replacing any existing
/// file of that name.
pub fn decode_cycle(config: &DecodeConfig, acquirer: &dyn AudioAcquirer) -> Result<DecodeOutcome> {
    info!("Decode cycle started");

    let buffer = acquire_audio(acquirer, &config.audio)?;
    let container = reveal(buffer, &config.passphrase)?;

    let Some(payload) = container.payload() else {
        return Ok(DecodeOutcome::Message(container.text().into_owned()));
    };

    let path = config.output_dir.join(container.file_name()?);
    write_atomically(&path, |tmp| {
        fs::write(tmp, payload).map_err(|e| StegoError::file_access(tmp, e))
    })?;
    info!("A file ({}) is extracted", path.display());

    Ok(DecodeOutcome::File {
        path,
        size: payload.len(),
    })
}

/// Produces `destination` through `write` on a sibling temporary file.
///
/// The temporary file is removed if `write` or the final rename fails. A new
/// file gets the usual umask-derived mode; a replaced file keeps its mode.
fn write_atomically<F>(destination: &Path, write: F) -> Result<()>
where
    F: FnOnce(&Path) -> Result<()>,
{
    let dir = match destination.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut builder = tempfile::Builder::new();
    builder.prefix(".wavstego-");
    // Same mode a plain create would get; the umask still applies.
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        builder.permissions(fs::Permissions::from_mode(0o666));
    }
    let temp = builder
        .tempfile_in(dir)
        .map_err(|e| StegoError::file_access(dir, e))?;

    write(temp.path())?;

    if let Ok(existing) = fs::metadata(destination) {
        fs::set_permissions(temp.path(), existing.permissions())
            .map_err(|e| StegoError::file_access(temp.path(), e))?;
    }

    temp.persist(destination)
        .map_err(|e| StegoError::file_access(destination, e.error))?;
    Ok(())
}
