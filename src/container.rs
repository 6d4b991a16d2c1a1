//! Plaintext message container.
//!
//! Wire format (all lengths little-endian u32):
//!
//! ```text
//! [name_or_text_len][name_or_text][payload_len][payload]
//! ```
//!
//! A `payload_len` of zero means `name_or_text` is a text message. Any other
//! value means `name_or_text` is a file path and `payload_len` bytes of file
//! content follow. An empty file therefore frames exactly like a text message
//! and decodes as one.

use std::borrow::Cow;

use thiserror::Error;

/// Size of one length field.
const LEN_FIELD: usize = 4;

/// Smallest valid container: two empty length fields.
pub const MIN_CONTAINER_LEN: usize = 2 * LEN_FIELD;

/// Errors produced while framing or parsing a container.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ContainerError {
    #[error("Container too short: {0} bytes, need at least {MIN_CONTAINER_LEN}")]
    TooShort(usize),

    #[error("Declared {field} length {declared} exceeds the {remaining} bytes remaining")]
    LengthOverflow {
        field: &'static str,
        declared: usize,
        remaining: usize,
    },

    #[error("{0} unexpected bytes after the payload")]
    TrailingBytes(usize),

    #[error("Field too large to frame: {0} bytes")]
    FieldTooLarge(usize),

    #[error("Container does not carry a usable file name")]
    InvalidFileName,
}

/// A text message, or a named file with its contents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Container {
    name_or_text: Vec<u8>,
    payload: Option<Vec<u8>>,
}

impl Container {
    /// Creates a text message container.
    pub fn message(text: impl Into<Vec<u8>>) -> Self {
        Self {
            name_or_text: text.into(),
            payload: None,
        }
    }

    /// Creates a file container.
    ///
    /// An empty `data` cannot be told apart from a text message on the wire,
    /// so it is stored as one.
    pub fn file(name: impl Into<Vec<u8>>, data: Vec<u8>) -> Self {
        Self {
            name_or_text: name.into(),
            payload: if data.is_empty() { None } else { Some(data) },
        }
    }

    /// Raw text-or-name field.
    pub fn name_or_text(&self) -> &[u8] {
        &self.name_or_text
    }

    /// File contents, if this container carries a file.
    pub fn payload(&self) -> Option<&[u8]> {
        self.payload.as_deref()
    }

    pub fn is_file(&self) -> bool {
        self.payload.is_some()
    }

    /// The text-or-name field as UTF-8, replacing invalid sequences.
    pub fn text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.name_or_text)
    }

    /// Name to materialize the payload under: everything after the last `/`.
    pub fn file_name(&self) -> Result<&str, ContainerError> {
        let base = match self.name_or_text.iter().rposition(|&b| b == b'/') {
            Some(slash) => &self.name_or_text[slash + 1..],
            None => &self.name_or_text[..],
        };
        let name = std::str::from_utf8(base).map_err(|_| ContainerError::InvalidFileName)?;
        if name.is_empty() || name == "." || name == ".." || name.contains('\0') {
            return Err(ContainerError::InvalidFileName);
        }
        Ok(name)
    }

    /// Serializes the container.
    pub fn to_bytes(&self) -> Result<Vec<u8>, ContainerError> {
        encode_container(&self.name_or_text, self.payload.as_deref())
    }

    /// Parses a serialized container.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ContainerError> {
        decode_container(bytes)
    }
}

fn len_field(len: usize) -> Result<[u8; LEN_FIELD], ContainerError> {
    u32::try_from(len)
        .map(u32::to_le_bytes)
        .map_err(|_| ContainerError::FieldTooLarge(len))
}

/// Frames `name_or_text` and an optional payload.
///
/// `None` and an empty payload both produce `payload_len == 0`.
pub fn encode_container(
    name_or_text: &[u8],
    payload: Option<&[u8]>,
) -> Result<Vec<u8>, ContainerError> {
    let payload = payload.unwrap_or_default();

    let mut out = Vec::with_capacity(MIN_CONTAINER_LEN + name_or_text.len() + payload.len());
    out.extend_from_slice(&len_field(name_or_text.len())?);
    out.extend_from_slice(name_or_text);
    out.extend_from_slice(&len_field(payload.len())?);
    out.extend_from_slice(payload);
    Ok(out)
}

/// Parses a framed container.
pub fn decode_container(bytes: &[u8]) -> Result<Container, ContainerError> {
    if bytes.len() < MIN_CONTAINER_LEN {
        return Err(ContainerError::TooShort(bytes.len()));
    }

    let (name_or_text, rest) = take_field(bytes, "name", LEN_FIELD)?;
    let (payload, rest) = take_field(rest, "payload", 0)?;

    if !rest.is_empty() {
        return Err(ContainerError::TrailingBytes(rest.len()));
    }

    Ok(Container {
        name_or_text: name_or_text.to_vec(),
        payload: if payload.is_empty() {
            None
        } else {
            Some(payload.to_vec())
        },
    })
}

/// Reads one length-prefixed field, requiring `reserve` bytes to remain after it.
fn take_field<'a>(
    bytes: &'a [u8],
    field: &'static str,
    reserve: usize,
) -> Result<(&'a [u8], &'a [u8]), ContainerError> {
    let (len_bytes, rest) = bytes.split_at(LEN_FIELD);
    let mut raw = [0u8; LEN_FIELD];
    raw.copy_from_slice(len_bytes);
    let declared = u32::from_le_bytes(raw) as usize;

    let available = rest.len().saturating_sub(reserve);
    if declared > available {
        return Err(ContainerError::LengthOverflow {
            field,
            declared,
            remaining: available,
        });
    }
    Ok(rest.split_at(declared))
}
