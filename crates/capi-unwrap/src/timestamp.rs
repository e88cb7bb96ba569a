//! Timestamp capture and timestamp-key derivation.

use base64::Engine;

use crate::error::{EnvelopeError, EnvelopeResult};
use crate::types::TimestampKey;

/// Current time in milliseconds since the Unix epoch.
///
/// Capture this once per attempt and send the same value with the request.
pub fn now_millis() -> u64 {
    chrono::Utc::now().timestamp_millis().max(0) as u64
}

/// Derive the timestamp key: the first 16 characters of the base64-encoded
/// decimal timestamp, taken as raw ASCII bytes.
///
/// Sixteen base64 characters cover the first 12 digits only, so 13-digit
/// timestamps within the same 10 ms window share a key.
pub fn derive(timestamp_millis: u64) -> EnvelopeResult<TimestampKey> {
    let encoded = base64::engine::general_purpose::STANDARD.encode(timestamp_millis.to_string());
    let prefix = encoded.as_bytes().get(..16).ok_or_else(|| {
        EnvelopeError::Format(format!(
            "timestamp {timestamp_millis} encodes to {} chars, need 16",
            encoded.len()
        ))
    })?;

    let mut key = [0u8; 16];
    key.copy_from_slice(prefix);
    Ok(TimestampKey::from_bytes(key))
}
