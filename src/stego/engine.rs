//! LSB embedding engine.
//!
//! Sample `i` of the interleaved stream carries bit `i` of the
//! [`EmbeddedFrame`] bitstream. Extraction reads the 32-bit length prefix,
//! then exactly that many bytes, and never looks at the remaining samples.
//!
//! Integer samples carry the bit in the LSB of their two's-complement value.
//! Float samples are viewed as 23-fractional-bit fixed point
//! (`q = round(x * 2^23)`) and carry the bit in the LSB of `q`.

use thiserror::Error;

use super::frame::{pack_bits, EmbeddedFrame, LENGTH_PREFIX_BITS};
use super::samples::{SampleBuffer, Samples};

/// Errors raised while embedding or extracting.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum EngineError {
    #[error("Insufficient capacity: need {needed_bits} bits, audio holds {capacity_bits}")]
    InsufficientCapacity { needed_bits: u64, capacity_bits: u64 },

    #[error("Truncated stream: {declared_bits} bits declared, {available_bits} available")]
    TruncatedStream {
        declared_bits: u64,
        available_bits: u64,
    },

    #[error("Frame too large: {0} bytes")]
    FrameTooLarge(usize),

    #[error("Float sample {index} lies outside [-1, 1]; normalize the buffer first")]
    SampleOutOfRange { index: usize },
}

/// `2^23`: one unit of the float fixed-point view.
const FIXED_ONE: f32 = 8_388_608.0;

/// Largest fixed-point magnitude of a normalized sample.
const FIXED_MAX: u32 = 1 << 23;

/// A sample that can carry one bit.
trait LsbSample: Copy {
    fn lsb(self) -> u8;
    fn with_lsb(self, bit: u8) -> Self;
}

impl LsbSample for i32 {
    fn lsb(self) -> u8 {
        (self & 1) as u8
    }

    fn with_lsb(self, bit: u8) -> Self {
        (self & !1) | i32::from(bit & 1)
    }
}

fn to_fixed(sample: f32) -> i32 {
    (sample * FIXED_ONE).round() as i32
}

impl LsbSample for f32 {
    fn lsb(self) -> u8 {
        (to_fixed(self) & 1) as u8
    }

    fn with_lsb(self, bit: u8) -> Self {
        let q = to_fixed(self);
        if (q & 1) as u8 == bit & 1 {
            return self;
        }
        // Step away from zero so the peak never shrinks, except at full
        // scale where that would leave [-1, 1].
        let step = match (q < 0, q.unsigned_abs() >= FIXED_MAX) {
            (false, false) => 1,
            (true, false) => -1,
            (false, true) => -1,
            (true, true) => 1,
        };
        (q + step) as f32 / FIXED_ONE
    }
}

/// Hides `ciphertext` in a copy of `buffer`.
///
/// Samples past the end of the bitstream are left untouched. Float buffers
/// must be normalized: a carrying sample outside `[-1, 1]` is rejected.
pub fn embed(buffer: &SampleBuffer, ciphertext: &[u8]) -> Result<SampleBuffer, EngineError> {
    let frame = EmbeddedFrame::new(ciphertext.to_vec())?;
    let capacity_bits = buffer.capacity_bits();
    let needed_bits = frame.bit_len();

    if needed_bits > capacity_bits {
        return Err(EngineError::InsufficientCapacity {
            needed_bits,
            capacity_bits,
        });
    }

    if let Samples::Float(samples) = buffer.samples() {
        let carrying = usize::try_from(needed_bits).unwrap_or(usize::MAX);
        if let Some(index) = samples.iter().take(carrying).position(|s| s.abs() > 1.0) {
            return Err(EngineError::SampleOutOfRange { index });
        }
    }

    let mut stego = buffer.clone();
    match stego.samples_mut() {
        Samples::Int(samples) => write_bits(samples, frame.bits()),
        Samples::Float(samples) => write_bits(samples, frame.bits()),
    }
    Ok(stego)
}

/// Recovers the ciphertext hidden by [`embed`].
pub fn extract(buffer: &SampleBuffer) -> Result<Vec<u8>, EngineError> {
    let frame = match buffer.samples() {
        Samples::Int(samples) => read_frame(samples)?,
        Samples::Float(samples) => read_frame(samples)?,
    };
    Ok(frame.into_ciphertext())
}

fn write_bits<T: LsbSample>(samples: &mut [T], bits: impl Iterator<Item = u8>) {
    for (sample, bit) in samples.iter_mut().zip(bits) {
        *sample = sample.with_lsb(bit);
    }
}

fn read_bytes<T: LsbSample>(samples: &[T]) -> Vec<u8> {
    pack_bits(samples.iter().map(|s| s.lsb()))
}

fn read_frame<T: LsbSample>(samples: &[T]) -> Result<EmbeddedFrame, EngineError> {
    let prefix_len = LENGTH_PREFIX_BITS as usize;
    if samples.len() < prefix_len {
        return Err(EngineError::TruncatedStream {
            declared_bits: LENGTH_PREFIX_BITS,
            available_bits: samples.len() as u64,
        });
    }

    let (prefix, body) = samples.split_at(prefix_len);
    let mut raw = [0u8; 4];
    raw.copy_from_slice(&read_bytes(prefix));
    let length = u32::from_be_bytes(raw) as usize;

    let declared_bits = length as u64 * 8;
    let available_bits = body.len() as u64;
    if declared_bits > available_bits {
        return Err(EngineError::TruncatedStream {
            declared_bits,
            available_bits,
        });
    }

    EmbeddedFrame::new(read_bytes(&body[..length * 8]))
}
