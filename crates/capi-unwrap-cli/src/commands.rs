//! Offline subcommands. Each returns the text `main` prints.

use std::path::Path;

use anyhow::{Context, Result};

use capi_unwrap::timestamp::{derive, now_millis};
use capi_unwrap::{unwrap_exchange, ApiResponse, Exchange};

use crate::output::render;

/// Where the payload envelope for `decode` comes from.
#[derive(Debug, Clone)]
pub enum PayloadSource<'a> {
    /// Base64 envelope given directly.
    Inline(&'a str),
    /// JSON response body file; its `data` field is the envelope.
    BodyFile(&'a Path),
}

/// Unwrap captured materials.
pub fn decode(
    timestamp_millis: u64,
    key_envelope: Option<&str>,
    payload: PayloadSource<'_>,
    pretty: bool,
) -> Result<String> {
    let payload_envelope = match payload {
        PayloadSource::Inline(text) => text.to_string(),
        PayloadSource::BodyFile(path) => {
            let body =
                std::fs::read(path).with_context(|| format!("reading {}", path.display()))?;
            ApiResponse::from_json(&body)
                .with_context(|| format!("parsing {}", path.display()))?
                .data
        }
    };

    let exchange = Exchange {
        timestamp_millis,
        key_envelope: key_envelope.map(str::to_string),
        payload_envelope,
    };
    let text = unwrap_exchange(&exchange)?;
    Ok(render(&text, pretty, None))
}

/// Build both envelopes and return them as pretty JSON.
pub fn seal(timestamp_millis: Option<u64>, dynamic_key: &str, text: &str) -> Result<String> {
    let ts = timestamp_millis.unwrap_or_else(now_millis);
    let sealed = capi_unwrap::seal(ts, dynamic_key.as_bytes(), text.as_bytes())?;
    Ok(serde_json::to_string_pretty(&sealed)?)
}

/// `<timestamp> <key>` for the given or current timestamp.
pub fn derive_key(timestamp_millis: Option<u64>) -> Result<String> {
    let ts = timestamp_millis.unwrap_or_else(now_millis);
    let key = derive(ts)?;
    Ok(format!("{ts} {}", key.as_str()))
}
