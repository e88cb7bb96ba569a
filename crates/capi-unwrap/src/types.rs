//! Core data types for a single unwrap attempt.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::Stage;

/// Key derived from the request timestamp. Opens the key envelope only.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct TimestampKey([u8; 16]);

impl TimestampKey {
    pub const fn from_bytes(bytes: [u8; 16]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 16] {
        &self.0
    }

    /// The key as text. Always ASCII, since it is a base64 prefix.
    pub fn as_str(&self) -> &str {
        std::str::from_utf8(&self.0).unwrap_or_default()
    }
}

impl fmt::Debug for TimestampKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("TimestampKey(..)")
    }
}

/// Per-exchange key recovered from the response metadata. Opens the payload.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct DynamicKey([u8; 16]);

impl DynamicKey {
    pub const fn from_bytes(bytes: [u8; 16]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 16] {
        &self.0
    }
}

impl TryFrom<&[u8]> for DynamicKey {
    type Error = usize;

    /// Fails with the actual length when it is not 16.
    fn try_from(bytes: &[u8]) -> Result<Self, Self::Error> {
        <[u8; 16]>::try_from(bytes)
            .map(Self)
            .map_err(|_| bytes.len())
    }
}

impl fmt::Debug for DynamicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("DynamicKey(..)")
    }
}

/// Response body record returned by every endpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiResponse {
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub msg: String,
    /// Base64 payload envelope.
    #[serde(default)]
    pub data: String,
    #[serde(default)]
    pub success: bool,
}

impl ApiResponse {
    pub fn from_json(body: &[u8]) -> serde_json::Result<Self> {
        serde_json::from_slice(body)
    }
}

/// Raw materials of one request/response exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Exchange {
    /// Millisecond timestamp sent with the request.
    pub timestamp_millis: u64,
    /// Base64 key envelope from the response metadata, if the server sent one.
    pub key_envelope: Option<String>,
    /// Base64 payload envelope from the response body.
    pub payload_envelope: String,
}

impl Exchange {
    pub fn new(timestamp_millis: u64, key_envelope: Option<String>, response: &ApiResponse) -> Self {
        Self {
            timestamp_millis,
            key_envelope,
            payload_envelope: response.data.clone(),
        }
    }
}

/// Progress of the unwrap pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "stage", rename_all = "snake_case")]
pub enum PipelineState {
    Start,
    TimestampKeyed,
    DynamicKeyResolved,
    PayloadDecoded,
    Failed(Stage),
}

impl PipelineState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, PipelineState::PayloadDecoded | PipelineState::Failed(_))
    }
}
