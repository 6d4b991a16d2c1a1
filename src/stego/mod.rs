//! LSB steganography on decoded audio.
//!
//! - [`samples`]: sample buffers, WAV I/O and amplitude normalization
//! - [`frame`]: the length-prefixed ciphertext frame
//! - [`engine`]: embedding into and extraction from sample LSBs

pub mod engine;
pub mod frame;
pub mod samples;

pub use engine::{embed, extract, EngineError};
pub use frame::{EmbeddedFrame, LENGTH_PREFIX_BITS};
pub use samples::{AudioError, AudioMetadata, SampleBuffer, SampleKind, Samples, Scale};
