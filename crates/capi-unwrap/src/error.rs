//! Error types for the unwrapping engine.

use std::fmt;

use serde::Serialize;

/// Pipeline stage that produced an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    /// Deriving the key from the request timestamp.
    TimestampKey,
    /// Recovering the dynamic key from the key envelope.
    DynamicKey,
    /// Recovering the plaintext from the payload envelope.
    Payload,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::TimestampKey => "timestamp_key",
            Stage::DynamicKey => "dynamic_key",
            Stage::Payload => "payload",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why an envelope could not be opened.
#[derive(thiserror::Error, Debug)]
pub enum EnvelopeError {
    #[error("Missing key envelope in response metadata")]
    MissingKeyHeader,

    #[error("Base64 decode error: {0}")]
    Base64Decode(#[from] base64::DecodeError),

    #[error("Format error: {0}")]
    Format(String),

    #[error("Padding error: {0}")]
    Padding(String),

    #[error("Decompression error: {0}")]
    Decompression(#[source] std::io::Error),

    #[error("Compression error: {0}")]
    Compression(#[source] std::io::Error),

    #[error("Key derivation error: dynamic key is {len} bytes, expected 16")]
    KeyDerivation { len: usize },

    #[error("Invalid UTF-8 in plaintext: {0}")]
    InvalidUtf8(#[from] std::string::FromUtf8Error),
}

/// A failed unwrap: the stage that broke and the underlying cause.
#[derive(thiserror::Error, Debug)]
#[error("{stage} stage failed: {source}")]
pub struct UnwrapError {
    stage: Stage,
    #[source]
    source: EnvelopeError,
}

impl UnwrapError {
    pub fn new(stage: Stage, source: EnvelopeError) -> Self {
        Self { stage, source }
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub fn kind(&self) -> &EnvelopeError {
        &self.source
    }

    pub fn is_missing_key_header(&self) -> bool {
        matches!(self.source, EnvelopeError::MissingKeyHeader)
    }
}

/// Result type for the primitives, before a stage is attached.
pub type EnvelopeResult<T> = Result<T, EnvelopeError>;

/// Result type for the staged pipeline.
pub type UnwrapResult<T> = Result<T, UnwrapError>;

/// Attach a stage to a primitive error.
pub(crate) trait StageExt<T> {
    fn at(self, stage: Stage) -> UnwrapResult<T>;
}

impl<T> StageExt<T> for EnvelopeResult<T> {
    fn at(self, stage: Stage) -> UnwrapResult<T> {
        self.map_err(|e| UnwrapError::new(stage, e))
    }
}
