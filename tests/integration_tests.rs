//! Integration tests for wavstego
//!
//! Covers the full pipeline through real WAV files: round trips for text and
//! files, capacity limits, passphrase handling and the on-disk behavior of
//! the encode and decode cycles.

use std::fs;
use std::path::{Path, PathBuf};

use hound::{SampleFormat, WavSpec, WavWriter};
use rand::Rng;
use tempfile::tempdir;

use wavstego::{
    decode_container, decode_cycle, encode_container, encode_cycle, hide, reveal, seal,
    AcquireError, Container, DecodeConfig, DecodeOutcome, EncodeConfig, EngineError,
    MemoryAcquirer, MessageSource, Passphrase, SampleBuffer, StegoError, TranscoderConfig,
    TranscodingAcquirer,
};

/// Writes a mono 16-bit sine wave WAV with hound.
fn write_sine_wav(path: &Path, sample_count: usize) {
    let spec = WavSpec {
        channels: 1,
        sample_rate: 44100,
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    };
    let mut writer = WavWriter::create(path, spec).unwrap();
    for i in 0..sample_count {
        let t = i as f64 / 44100.0;
        let sample = (f64::sin(2.0 * std::f64::consts::PI * 440.0 * t) * 12000.0) as i16;
        writer.write_sample(sample).unwrap();
    }
    writer.finalize().unwrap();
}

fn pass(p: &str) -> Passphrase {
    Passphrase::new(p).unwrap()
}

fn acquirer() -> TranscodingAcquirer {
    // Never reached for WAV inputs.
    TranscodingAcquirer::new(TranscoderConfig {
        program: PathBuf::from("/nonexistent/ffmpeg"),
        ..TranscoderConfig::default()
    })
}

fn random_buffer(channels: u16, frames: usize) -> SampleBuffer {
    let mut rng = rand::thread_rng();
    let samples = (0..frames * channels as usize)
        .map(|_| rng.gen_range(-32768..=32767))
        .collect();
    SampleBuffer::from_int(channels, 44100, 16, samples).unwrap()
}

/// End-to-end: text message through a real WAV file.
#[test]
fn test_text_message_end_to_end() {
    let dir = tempdir().unwrap();
    let cover = dir.path().join("cover.wav");
    let output = dir.path().join("stego.wav");
    write_sine_wav(&cover, 8192);

    let report = encode_cycle(
        &EncodeConfig {
            passphrase: pass("abc"),
            message: MessageSource::Text("hello".into()),
            audio: cover,
            output: output.clone(),
        },
        &acquirer(),
    )
    .unwrap();
    assert!(!report.is_file);
    assert!(report.bits_used <= report.capacity_bits);
    assert_eq!(report.capacity_bits, 8192);

    let outcome = decode_cycle(
        &DecodeConfig {
            passphrase: pass("abc"),
            audio: output,
            output_dir: dir.path().to_path_buf(),
        },
        &acquirer(),
    )
    .unwrap();
    assert_eq!(outcome, DecodeOutcome::Message("hello".to_string()));
}

/// End-to-end: a file is restored under its base name.
#[test]
fn test_file_end_to_end() {
    let work = tempdir().unwrap();
    let source_dir = work.path().join("inbox");
    let out_dir = work.path().join("extracted");
    fs::create_dir_all(&source_dir).unwrap();
    fs::create_dir_all(&out_dir).unwrap();

    let notes = source_dir.join("notes.txt");
    fs::write(&notes, b"data").unwrap();
    let cover = work.path().join("cover.wav");
    let output = work.path().join("stego.wav");
    write_sine_wav(&cover, 8192);

    let message = MessageSource::resolve(notes.to_str().unwrap());
    assert_eq!(message, MessageSource::File(notes.clone()));

    let report = encode_cycle(
        &EncodeConfig {
            passphrase: pass("xyz"),
            message,
            audio: cover,
            output: output.clone(),
        },
        &acquirer(),
    )
    .unwrap();
    assert!(report.is_file);

    let outcome = decode_cycle(
        &DecodeConfig {
            passphrase: pass("xyz"),
            audio: output,
            output_dir: out_dir.clone(),
        },
        &acquirer(),
    )
    .unwrap();

    let extracted = out_dir.join("notes.txt");
    assert_eq!(
        outcome,
        DecodeOutcome::File {
            path: extracted.clone(),
            size: 4
        }
    );
    assert_eq!(fs::read(&extracted).unwrap(), b"data");
}

/// Decoding a file overwrites an existing file of the same name.
#[test]
fn test_decode_overwrites_existing_file() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("report.csv"), b"stale").unwrap();

    let container = Container::file("/home/user/report.csv", b"a,b\n1,2\n".to_vec());
    let hidden = hide(&random_buffer(2, 4000), &container, &pass("pin")).unwrap();
    let acquirer = MemoryAcquirer::new().with("stego.wav", hidden);

    decode_cycle(
        &DecodeConfig {
            passphrase: pass("pin"),
            audio: "stego.wav".into(),
            output_dir: dir.path().to_path_buf(),
        },
        &acquirer,
    )
    .unwrap();
    assert_eq!(fs::read(dir.path().join("report.csv")).unwrap(), b"a,b\n1,2\n");
}

/// Round trip over random payloads and passphrases of every allowed length.
#[test]
fn test_roundtrip_random_payloads() {
    let mut rng = rand::thread_rng();
    let cover = random_buffer(2, 40_000);

    for len in [0usize, 1, 7, 100, 2000] {
        for pass_len in [0usize, 1, 16] {
            let payload: Vec<u8> = (0..len).map(|_| rng.gen()).collect();
            let pin: String = (0..pass_len).map(|_| rng.gen_range('a'..='z')).collect();
            let passphrase = pass(&pin);

            let container = Container::file("blob.bin", payload.clone());
            let hidden = hide(&cover, &container, &passphrase).unwrap();
            let recovered = reveal(hidden, &passphrase).unwrap();

            assert_eq!(recovered.payload().unwrap_or_default(), payload.as_slice());
            assert_eq!(recovered.is_file(), len > 0);
        }
    }
}

/// Round trip through every supported integer depth and 32-bit float.
#[test]
fn test_roundtrip_all_sample_formats() {
    let container = Container::message("format independent");
    let passphrase = pass("depths");

    let mut covers: Vec<SampleBuffer> = [(8u16, 127i32), (16, 32767), (24, 8_388_607), (32, i32::MAX)]
        .into_iter()
        .map(|(bits, max)| {
            let samples = (0..2048i64)
                .map(|i| ((i * 7919) % (2 * i64::from(max) + 1) - i64::from(max)) as i32)
                .collect();
            SampleBuffer::from_int(1, 8000, bits, samples).unwrap()
        })
        .collect();
    covers.push(
        SampleBuffer::from_float(1, 8000, (0..2048).map(|i| (i as f32 * 0.01).cos() * 0.7).collect())
            .unwrap(),
    );

    for cover in covers {
        let hidden = hide(&cover, &container, &passphrase).unwrap();
        let reloaded = SampleBuffer::from_wav_bytes(&hidden.to_wav_bytes().unwrap()).unwrap();
        assert_eq!(reloaded.metadata(), cover.metadata());
        assert_eq!(reveal(reloaded, &passphrase).unwrap(), container);
    }
}

/// The exact ciphertext size fits; one more byte does not.
#[test]
fn test_capacity_boundary() {
    let container = Container::message("boundary");
    let ciphertext_len = seal(&container, &pass("p")).unwrap().len();
    let needed_bits = (4 + ciphertext_len) * 8;

    let exact = random_buffer(1, needed_bits);
    let hidden = hide(&exact, &container, &pass("p")).unwrap();
    assert_eq!(reveal(hidden, &pass("p")).unwrap(), container);

    let short = random_buffer(1, needed_bits - 1);
    assert!(matches!(
        hide(&short, &container, &pass("p")),
        Err(StegoError::Embedding(EngineError::InsufficientCapacity { .. }))
    ));
}

/// Wrong passphrase is reported, never silently decoded.
#[test]
fn test_wrong_passphrase_fails() {
    let cover = random_buffer(1, 4096);
    let hidden = hide(&cover, &Container::message("secret"), &pass("right")).unwrap();
    assert!(matches!(
        reveal(hidden, &pass("wrong")),
        Err(StegoError::Crypto(_))
    ));
}

/// Audio without hidden data fails cleanly.
#[test]
fn test_reveal_clean_audio_fails() {
    let cover = SampleBuffer::from_int(1, 44100, 16, vec![0; 4096]).unwrap();
    // All-zero LSBs declare an empty ciphertext, too short to decrypt.
    assert!(matches!(
        reveal(cover, &pass("abc")),
        Err(StegoError::Crypto(_))
    ));
}

#[test]
fn test_passphrase_too_long_rejected() {
    assert!(matches!(
        Passphrase::new("seventeen-chars!!"),
        Err(StegoError::PassphraseTooLong(17))
    ));
}

/// Container framing disambiguation at the `payload_len == 0` boundary.
#[test]
fn test_container_disambiguation() {
    let text = decode_container(&encode_container(b"just text", None).unwrap()).unwrap();
    assert_eq!(text.name_or_text(), b"just text");
    assert_eq!(text.payload(), None);

    let file = decode_container(&encode_container(b"a.bin", Some(b"\x00\x01")).unwrap()).unwrap();
    assert_eq!(file.payload(), Some(&b"\x00\x01"[..]));

    let empty = decode_container(&encode_container(b"a.bin", Some(b"")).unwrap()).unwrap();
    assert_eq!(empty.payload(), None);
}

/// Decoding a text message never creates files.
#[test]
fn test_text_decode_writes_nothing() {
    let dir = tempdir().unwrap();
    let hidden = hide(&random_buffer(1, 4096), &Container::message("hi"), &pass("k")).unwrap();
    let acquirer = MemoryAcquirer::new().with("in.wav", hidden);

    decode_cycle(
        &DecodeConfig {
            passphrase: pass("k"),
            audio: "in.wav".into(),
            output_dir: dir.path().to_path_buf(),
        },
        &acquirer,
    )
    .unwrap();
    assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
}

/// Failed decode leaves no partial file behind.
#[test]
fn test_failed_decode_writes_nothing() {
    let dir = tempdir().unwrap();
    let container = Container::file("leak.txt", b"payload".to_vec());
    let hidden = hide(&random_buffer(1, 4096), &container, &pass("k")).unwrap();
    let acquirer = MemoryAcquirer::new().with("in.wav", hidden);

    let result = decode_cycle(
        &DecodeConfig {
            passphrase: pass("not-k"),
            audio: "in.wav".into(),
            output_dir: dir.path().to_path_buf(),
        },
        &acquirer,
    );
    assert!(result.is_err());
    assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
}

/// A missing cover file is an access error, not a transcoder run.
#[test]
fn test_missing_audio() {
    let dir = tempdir().unwrap();
    let result = encode_cycle(
        &EncodeConfig {
            passphrase: pass("abc"),
            message: MessageSource::Text("hello".into()),
            audio: dir.path().join("missing.wav"),
            output: dir.path().join("out.wav"),
        },
        &acquirer(),
    );
    assert!(matches!(
        result,
        Err(StegoError::Acquire(AcquireError::Unreadable { .. }))
    ));
    assert!(!dir.path().join("out.wav").exists());
}

/// Only the samples carrying the frame are modified.
#[test]
fn test_unused_samples_untouched() {
    let cover = random_buffer(1, 10_000);
    let container = Container::message("short");
    let ciphertext_len = seal(&container, &pass("p")).unwrap().len();
    let hidden = hide(&cover, &container, &pass("p")).unwrap();

    let used = (4 + ciphertext_len) * 8;
    let (wavstego::Samples::Int(before), wavstego::Samples::Int(after)) =
        (cover.samples(), hidden.samples())
    else {
        unreachable!()
    };
    assert_eq!(&before[used..], &after[used..]);
}
