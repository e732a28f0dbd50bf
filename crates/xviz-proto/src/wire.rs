// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Wire encodings of an [`Envelope`].
//!
//! JSON frame:
//!
//! ``{"type": "<type-tag>", "data": {...}}``
//!
//! Binary frame:
//!
//! ``MAGIC(4) = "PBE1" || PAYLOAD``
//!
//! * PAYLOAD is the CBOR encoding of the envelope (enums as integer tags,
//!   colours and image data as byte strings).
//! * Receivers validate MAGIC before touching PAYLOAD.

use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;

use crate::envelope::Envelope;

/// Binary frame magic, ASCII "PBE1".
pub const MAGIC: [u8; 4] = *b"PBE1";

/// Errors raised while encoding or decoding frames.
#[derive(Debug, Error)]
pub enum WireError {
    /// JSON encode/decode failed.
    #[error("json codec: {0}")]
    Json(#[from] serde_json::Error),
    /// CBOR encode failed.
    #[error("cbor encode: {0}")]
    CborEncode(#[from] ciborium::ser::Error<std::io::Error>),
    /// CBOR decode failed.
    #[error("cbor decode: {0}")]
    CborDecode(#[from] ciborium::de::Error<std::io::Error>),
    /// Frame shorter than the magic prefix.
    #[error("incomplete frame: need at least {need} bytes, have {have}")]
    Incomplete {
        /// Minimum bytes required.
        need: usize,
        /// Bytes available.
        have: usize,
    },
    /// Frame does not start with [`MAGIC`].
    #[error("bad magic: {found:02x?}")]
    BadMagic {
        /// The four bytes found in place of the magic.
        found: [u8; 4],
    },
}

/// Encode to CBOR bytes.
pub fn to_cbor<T: Serialize>(value: &T) -> Result<Vec<u8>, WireError> {
    let mut out = Vec::new();
    ciborium::into_writer(value, &mut out)?;
    Ok(out)
}

/// Decode from CBOR bytes.
pub fn from_cbor<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, WireError> {
    Ok(ciborium::from_reader(bytes)?)
}

/// Encode an envelope (owned or borrowed) as a JSON frame.
pub fn encode_json<E: Serialize>(envelope: &E) -> Result<String, WireError> {
    Ok(serde_json::to_string(envelope)?)
}

/// Decode a JSON frame.
pub fn decode_json(text: &str) -> Result<Envelope, WireError> {
    Ok(serde_json::from_str(text)?)
}

/// Encode an envelope (owned or borrowed) as a magic-prefixed binary frame.
pub fn encode_binary<E: Serialize>(envelope: &E) -> Result<Vec<u8>, WireError> {
    let mut out = Vec::with_capacity(256);
    out.extend_from_slice(&MAGIC);
    ciborium::into_writer(envelope, &mut out)?;
    Ok(out)
}

/// Decode a magic-prefixed binary frame.
pub fn decode_binary(bytes: &[u8]) -> Result<Envelope, WireError> {
    let payload = strip_magic(bytes)?;
    from_cbor(payload)
}

/// Validates the magic prefix and returns the payload that follows it.
pub fn strip_magic(bytes: &[u8]) -> Result<&[u8], WireError> {
    let Some((head, payload)) = bytes.split_first_chunk::<4>() else {
        return Err(WireError::Incomplete { need: MAGIC.len(), have: bytes.len() });
    };
    if *head != MAGIC {
        return Err(WireError::BadMagic { found: *head });
    }
    Ok(payload)
}

/// `true` when `bytes` starts with [`MAGIC`].
pub fn is_binary_frame(bytes: &[u8]) -> bool {
    bytes.starts_with(&MAGIC)
}

// --- Unit tests -----------------------------------------------------------
