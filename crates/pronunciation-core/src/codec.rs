//! Obfuscated transport payload
//!
//! Clients send `base64(json)` with throwaway characters spliced in. Given a
//! wire string `S` of length `L`, the base64 text is
//! `S[0..2] ++ S[3..7] ++ S[8..L-1]`: index 2, index 7 and the final
//! character are dropped. Not a security measure.
//!
//! Positions are counted on the string exactly as received: a throwaway
//! character may be whitespace, so nothing is trimmed.

use base64::{engine::general_purpose::STANDARD, Engine};
use serde::Deserialize;
use thiserror::Error;

use crate::types::EvaluationRequest;

/// Shortest wire string the slicing rule is defined for
pub const MIN_ENCODED_LEN: usize = 9;

#[derive(Debug, Error)]
pub enum CodecError {
    #[error("Encoded payload too short: {len} characters (minimum 9)")]
    TooShort { len: usize },

    #[error("Invalid base64 payload: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("Payload is not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),

    #[error("Invalid JSON payload: {0}")]
    Json(#[from] serde_json::Error),
}

/// Wire shape: missing fields default to empty strings
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct WirePayload {
    transcribed_text: String,
    target_text: String,
}

impl From<WirePayload> for EvaluationRequest {
    fn from(p: WirePayload) -> Self {
        EvaluationRequest {
            transcribed_text: p.transcribed_text,
            target_text: p.target_text,
        }
    }
}

/// Decoder/encoder for the obfuscated payload format
pub struct PayloadCodec;

impl PayloadCodec {
    /// Strip the throwaway characters, returning the embedded base64 text
    pub fn unscramble(encoded: &str) -> Result<String, CodecError> {
        let chars: Vec<char> = encoded.chars().collect();
        let len = chars.len();
        if len < MIN_ENCODED_LEN {
            return Err(CodecError::TooShort { len });
        }

        Ok(chars[0..2]
            .iter()
            .chain(&chars[3..7])
            .chain(&chars[8..len - 1])
            .collect())
    }

    pub fn decode(encoded: &str) -> Result<EvaluationRequest, CodecError> {
        let base64_text = Self::unscramble(encoded)?;
        let bytes = STANDARD.decode(base64_text.as_bytes())?;
        let json = String::from_utf8(bytes)?;
        let payload: WirePayload = serde_json::from_str(&json)?;
        Ok(payload.into())
    }

    /// Produce a wire string for `request`, splicing `filler` in at index 2,
    /// index 7 and the end.
    ///
    /// Assumes the base64 text is at least 6 characters, which any JSON
    /// object with both fields satisfies.
    pub fn encode(request: &EvaluationRequest, filler: char) -> Result<String, CodecError> {
        let json = serde_json::to_string(request)?;
        Ok(Self::scramble(&STANDARD.encode(json), filler))
    }

    /// Inverse of [`PayloadCodec::unscramble`] for base64 text of 6+ characters
    pub fn scramble(base64_text: &str, filler: char) -> String {
        let mut out: Vec<char> = base64_text.chars().collect();
        out.insert(2.min(out.len()), filler);
        out.insert(7.min(out.len()), filler);
        out.push(filler);
        out.into_iter().collect()
    }
}
