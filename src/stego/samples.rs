//! Decoded audio sample buffers.
//!
//! Holds the interleaved samples of every channel together with the stream
//! metadata needed to write them back, and implements the amplitude
//! normalization that puts float streams into an embeddable range.
//!
//! Integer PCM (8/16/24/32-bit) and 32-bit float WAV files are supported.

use hound::{SampleFormat, WavReader, WavSpec, WavWriter};
use std::io::{Cursor, Read, Seek, Write};
use std::path::Path;
use thiserror::Error;

/// Errors that can occur while loading or saving audio.
#[derive(Error, Debug)]
pub enum AudioError {
    #[error("Audio load error: {0}")]
    AudioLoadError(String),

    #[error("Audio save error: {0}")]
    AudioSaveError(String),

    #[error("Audio contains no samples")]
    Empty,

    #[error("Unsupported audio format: {0}")]
    UnsupportedFormat(String),

    #[error("Non-finite float sample at index {0}")]
    NonFiniteSample(usize),
}

/// How samples are quantized.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SampleKind {
    /// Two's-complement integers of `bits_per_sample` width.
    Int,
    /// IEEE 754 single-precision amplitudes, nominally in `[-1, 1]`.
    Float,
}

/// Stream metadata.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AudioMetadata {
    pub channels: u16,
    pub bits_per_sample: u16,
    pub sample_rate: u32,
    pub kind: SampleKind,
    /// Samples per channel.
    pub frames: u64,
}

impl AudioMetadata {
    /// Raw size of the sample data in bytes.
    pub fn data_size(&self) -> u64 {
        self.frames * u64::from(self.channels) * u64::from(self.bits_per_sample).div_ceil(8)
    }

    /// Number of bits that can be hidden: one per sample.
    pub fn capacity_bits(&self) -> u64 {
        self.frames * u64::from(self.channels)
    }

    fn wav_spec(&self) -> WavSpec {
        WavSpec {
            channels: self.channels,
            sample_rate: self.sample_rate,
            bits_per_sample: self.bits_per_sample,
            sample_format: match self.kind {
                SampleKind::Int => SampleFormat::Int,
                SampleKind::Float => SampleFormat::Float,
            },
        }
    }
}

/// Interleaved sample data.
#[derive(Debug, Clone, PartialEq)]
pub enum Samples {
    Int(Vec<i32>),
    Float(Vec<f32>),
}

impl Samples {
    pub fn len(&self) -> usize {
        match self {
            Samples::Int(v) => v.len(),
            Samples::Float(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Factor a float stream was divided by during normalization.
///
/// Always a power of two, so dividing and multiplying by it is exact unless
/// the quotient falls into the subnormal range and loses precision.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Scale(f32);

impl Scale {
    pub const UNITY: Scale = Scale(1.0);

    /// Largest scale; keeps the factor finite for any finite peak.
    const MAX: f32 = 1.701_411_8e38; // 2^127

    /// Smallest power of two not below `peak`, or unity when `peak <= 1`.
    pub fn for_peak(peak: f32) -> Self {
        let mut factor = 1.0f32;
        while factor < peak && factor < Self::MAX {
            factor *= 2.0;
        }
        Scale(factor)
    }

    pub fn factor(self) -> f32 {
        self.0
    }

    pub fn is_unity(self) -> bool {
        self.0 == 1.0
    }
}

/// A decoded audio stream.
#[derive(Debug, Clone, PartialEq)]
pub struct SampleBuffer {
    metadata: AudioMetadata,
    samples: Samples,
}

impl SampleBuffer {
    /// Creates an integer PCM buffer from interleaved samples.
    pub fn from_int(
        channels: u16,
        sample_rate: u32,
        bits_per_sample: u16,
        samples: Vec<i32>,
    ) -> Result<Self, AudioError> {
        if !matches!(bits_per_sample, 8 | 16 | 24 | 32) {
            return Err(AudioError::UnsupportedFormat(format!(
                "{bits_per_sample}-bit integer PCM"
            )));
        }
        Self::new(channels, sample_rate, bits_per_sample, SampleKind::Int, Samples::Int(samples))
    }

    /// Creates a 32-bit float buffer from interleaved samples.
    pub fn from_float(
        channels: u16,
        sample_rate: u32,
        samples: Vec<f32>,
    ) -> Result<Self, AudioError> {
        if let Some(index) = samples.iter().position(|s| !s.is_finite()) {
            return Err(AudioError::NonFiniteSample(index));
        }
        Self::new(channels, sample_rate, 32, SampleKind::Float, Samples::Float(samples))
    }

    fn new(
        channels: u16,
        sample_rate: u32,
        bits_per_sample: u16,
        kind: SampleKind,
        samples: Samples,
    ) -> Result<Self, AudioError> {
        if channels == 0 {
            return Err(AudioError::UnsupportedFormat("zero channels".to_string()));
        }
        if samples.len() % usize::from(channels) != 0 {
            return Err(AudioError::AudioLoadError(format!(
                "{} samples do not divide into {} channels",
                samples.len(),
                channels
            )));
        }

        let metadata = AudioMetadata {
            channels,
            bits_per_sample,
            sample_rate,
            kind,
            frames: (samples.len() / usize::from(channels)) as u64,
        };
        Ok(Self { metadata, samples })
    }

    /// Loads a WAV file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, AudioError> {
        let reader =
            WavReader::open(path).map_err(|e| AudioError::AudioLoadError(e.to_string()))?;

        Self::from_reader(reader)
    }

    /// Loads WAV data from memory.
    pub fn from_wav_bytes(bytes: &[u8]) -> Result<Self, AudioError> {
        let reader = WavReader::new(Cursor::new(bytes))
            .map_err(|e| AudioError::AudioLoadError(e.to_string()))?;

        Self::from_reader(reader)
    }

    fn from_reader<R: Read>(reader: WavReader<R>) -> Result<Self, AudioError> {
        let spec = reader.spec();

        match spec.sample_format {
            SampleFormat::Int => {
                let samples = reader
                    .into_samples::<i32>()
                    .collect::<Result<Vec<_>, _>>()
                    .map_err(|e| AudioError::AudioLoadError(e.to_string()))?;
                Self::from_int(spec.channels, spec.sample_rate, spec.bits_per_sample, samples)
            }
            SampleFormat::Float if spec.bits_per_sample == 32 => {
                let samples = reader
                    .into_samples::<f32>()
                    .collect::<Result<Vec<_>, _>>()
                    .map_err(|e| AudioError::AudioLoadError(e.to_string()))?;
                Self::from_float(spec.channels, spec.sample_rate, samples)
            }
            SampleFormat::Float => Err(AudioError::UnsupportedFormat(format!(
                "{}-bit float",
                spec.bits_per_sample
            ))),
        }
    }

    /// Writes the buffer as a WAV file.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), AudioError> {
        let writer = WavWriter::create(path, self.metadata.wav_spec())
            .map_err(|e| AudioError::AudioSaveError(e.to_string()))?;

        self.write_samples(writer)
    }

    /// Returns the buffer encoded as WAV bytes.
    pub fn to_wav_bytes(&self) -> Result<Vec<u8>, AudioError> {
        let mut bytes = Vec::new();
        {
            let writer = WavWriter::new(Cursor::new(&mut bytes), self.metadata.wav_spec())
                .map_err(|e| AudioError::AudioSaveError(e.to_string()))?;
            self.write_samples(writer)?;
        }
        Ok(bytes)
    }

    fn write_samples<W: Write + Seek>(&self, mut writer: WavWriter<W>) -> Result<(), AudioError> {
        let written = match &self.samples {
            Samples::Int(samples) => samples.iter().try_for_each(|s| writer.write_sample(*s)),
            Samples::Float(samples) => samples.iter().try_for_each(|s| writer.write_sample(*s)),
        };
        written.map_err(|e| AudioError::AudioSaveError(e.to_string()))?;

        writer
            .finalize()
            .map_err(|e| AudioError::AudioSaveError(e.to_string()))
    }

    pub fn metadata(&self) -> &AudioMetadata {
        &self.metadata
    }

    pub fn samples(&self) -> &Samples {
        &self.samples
    }

    pub(crate) fn samples_mut(&mut self) -> &mut Samples {
        &mut self.samples
    }

    /// Total number of samples across all channels.
    pub fn sample_count(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn capacity_bits(&self) -> u64 {
        self.metadata.capacity_bits()
    }

    /// Largest ciphertext, in bytes, that fits after the length prefix.
    pub fn capacity_bytes(&self) -> u64 {
        (self.capacity_bits() / 8).saturating_sub(4)
    }

    /// Returns the duration in seconds.
    pub fn duration_secs(&self) -> f64 {
        self.metadata.frames as f64 / f64::from(self.metadata.sample_rate)
    }

    /// Brings a float stream into `[-1, 1]`.
    ///
    /// Float samples are divided by [`Scale::for_peak`] of the peak amplitude
    /// when it exceeds 1.0. Integer streams are left as they are: the engine
    /// embeds directly into their quantized LSBs.
    pub fn normalize(&mut self) -> Scale {
        match &mut self.samples {
            Samples::Int(_) => Scale::UNITY,
            Samples::Float(samples) => {
                let peak = samples.iter().fold(0.0f32, |peak, s| peak.max(s.abs()));
                let scale = Scale::for_peak(peak);
                if !scale.is_unity() {
                    samples.iter_mut().for_each(|s| *s /= scale.0);
                }
                scale
            }
        }
    }

    /// Undoes [`normalize`](Self::normalize) with the scale it returned.
    pub fn denormalize(&mut self, scale: Scale) {
        if let Samples::Float(samples) = &mut self.samples {
            if !scale.is_unity() {
                samples.iter_mut().for_each(|s| *s *= scale.0);
            }
        }
    }

    /// Undoes normalization for samples that differ from `normalized` and
    /// restores every other sample from `original`.
    ///
    /// `normalized` is `original` after [`normalize`](Self::normalize)
    /// returned `scale`. Unlike [`denormalize`](Self::denormalize) this is
    /// exact for tiny samples whose normalized value went subnormal.
    pub(crate) fn denormalize_changed(
        &mut self,
        normalized: &SampleBuffer,
        original: &SampleBuffer,
        scale: Scale,
    ) {
        let (Samples::Float(samples), Samples::Float(before), Samples::Float(source)) =
            (&mut self.samples, &normalized.samples, &original.samples)
        else {
            return;
        };
        for ((sample, before), source) in samples.iter_mut().zip(before).zip(source) {
            if sample.to_bits() == before.to_bits() {
                *sample = *source;
            } else {
                *sample *= scale.0;
            }
        }
    }
}

/// Generates a mono 16-bit sine wave for tests.
#[cfg(test)]
pub(crate) fn sine_buffer(sample_count: usize) -> SampleBuffer {
    let samples: Vec<i32> = (0..sample_count)
        .map(|i| {
            let t = i as f64 / 44100.0;
            (f64::sin(2.0 * std::f64::consts::PI * 440.0 * t) * 16000.0) as i32
        })
        .collect();

    SampleBuffer::from_int(1, 44100, 16, samples).unwrap()
}
