//! Payload normalization for the client → child direction.
//!
//! The child reads its stdin strictly line by line, so every payload must
//! leave the adapter as exactly one line. Valid JSON is re-serialized
//! compactly (key order and number text preserved, non-ASCII unescaped).
//! Anything else has its raw CR/LF bytes replaced by spaces and is forwarded
//! as-is; this path never fails.

use serde_json::Value;

/// A payload after the parse attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum Parsed {
    /// The payload is valid JSON.
    Json(Value),
    /// The payload is not valid JSON (or not UTF-8); carried as raw bytes.
    Opaque(Vec<u8>),
}

/// Try to parse a payload as JSON.
pub fn parse_payload(payload: &[u8]) -> Parsed {
    match serde_json::from_slice::<Value>(payload) {
        Ok(value) => Parsed::Json(value),
        Err(e) => {
            tracing::debug!(error = %e, len = payload.len(), "payload is not valid JSON");
            Parsed::Opaque(payload.to_vec())
        }
    }
}

/// Serialize a message without insignificant whitespace.
pub fn compact(value: &Value) -> Vec<u8> {
    // Serializing a `Value` only fails for non-string map keys, which
    // `Value` cannot hold.
    serde_json::to_vec(value).unwrap_or_default()
}

/// Replace every CR and LF byte with a space so the payload stays one line.
pub fn sanitize(payload: &[u8]) -> Vec<u8> {
    payload
        .iter()
        .map(|&b| if b == b'\r' || b == b'\n' { b' ' } else { b })
        .collect()
}

/// Single-line wire form of a payload, without filtering.
pub fn normalize(payload: &[u8]) -> Vec<u8> {
    match parse_payload(payload) {
        Parsed::Json(value) => compact(&value),
        Parsed::Opaque(raw) => sanitize(&raw),
    }
}
