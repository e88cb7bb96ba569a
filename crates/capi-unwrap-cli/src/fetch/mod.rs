//! HTTP collaborator: issues the request and hands the materials to the engine.

pub mod client;

pub use client::{ApiClient, Fetched};

use capi_unwrap::UnwrapError;

/// Errors from a fetch, including engine failures.
#[derive(thiserror::Error, Debug)]
pub enum FetchError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Unexpected HTTP status: {status}")]
    Status {
        status: u16,
        /// Seconds from a `retry-after` header, if present.
        retry_after: Option<u64>,
    },

    #[error("Invalid response body: {0}")]
    Body(#[from] serde_json::Error),

    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    #[error(transparent)]
    Unwrap(#[from] UnwrapError),
}

impl FetchError {
    /// Whether a fresh attempt (with a fresh timestamp) might succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            FetchError::Http(e) => e.is_timeout() || e.is_connect() || e.is_request(),
            FetchError::Status { status, .. } => *status >= 500 || *status == 429,
            _ => false,
        }
    }
}

pub type FetchResult<T> = Result<T, FetchError>;
