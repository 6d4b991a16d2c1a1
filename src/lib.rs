//! # wavstego - hide messages and files in WAV audio
//!
//! A message or file is framed into a [`Container`], compressed, encrypted
//! with a passphrase of at most 16 bytes, and written one bit per sample into
//! the least significant bits of a WAV file. Decoding reverses every step and
//! either returns the text or writes the file back out.
//!
//! ## Example
//!
//! ```rust
//! use wavstego::{hide, reveal, Container, Passphrase, SampleBuffer};
//!
//! let samples: Vec<i32> = (0..4096).map(|i| ((i * 37) % 2000) - 1000).collect();
//! let cover = SampleBuffer::from_int(1, 44100, 16, samples).unwrap();
//! let passphrase = Passphrase::new("abc").unwrap();
//!
//! let hidden = hide(&cover, &Container::message("hello"), &passphrase).unwrap();
//! let recovered = reveal(hidden, &passphrase).unwrap();
//!
//! assert_eq!(recovered.text(), "hello");
//! ```
//!
//! ## Modules
//!
//! - [`container`]: the plaintext message/file container
//! - [`crypto`]: compression and passphrase encryption
//! - [`stego`]: sample buffers and the LSB embedding engine
//! - [`acquire`]: WAV decoding with an external transcoder fallback
//! - [`pipeline`]: the encode and decode cycles

pub mod acquire;
pub mod config;
pub mod container;
pub mod crypto;
pub mod error;
pub mod pipeline;
pub mod stego;

pub use acquire::{AcquireError, AudioAcquirer, MemoryAcquirer, TranscodingAcquirer};
pub use config::{
    DecodeConfig, EncodeConfig, MessageSource, Passphrase, TranscoderConfig, MAX_PASSPHRASE_LEN,
};
pub use container::{decode_container, encode_container, Container, ContainerError};
pub use error::StegoError;
pub use pipeline::{
    decode_cycle, encode_cycle, hide, load_container, reveal, seal, unseal, DecodeOutcome,
    EncodeReport, SealStats,
};
pub use stego::{AudioError, AudioMetadata, EngineError, SampleBuffer, SampleKind, Samples, Scale};
