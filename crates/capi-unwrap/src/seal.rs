//! Build envelopes the way the server does. Used for fixtures and the CLI
//! `seal` command; the fetch path never calls this.

use base64::Engine;
use serde::Serialize;

use crate::error::{Stage, StageExt, UnwrapResult};
use crate::{block, compress, timestamp};

/// Both envelopes for one simulated exchange.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SealedExchange {
    pub timestamp_millis: u64,
    /// Goes in the response metadata.
    pub key_envelope: String,
    /// Goes in the body's `data` field.
    pub payload_envelope: String,
}

/// Gzip, pad, encrypt, base64.
fn seal_envelope(plain: &[u8], key: &[u8]) -> crate::error::EnvelopeResult<String> {
    let blob = compress::compress(plain)?;
    let ciphertext = block::seal(&blob, key)?;
    Ok(base64::engine::general_purpose::STANDARD.encode(ciphertext))
}

/// Seal `dynamic_key` under the timestamp key and `plaintext` under `dynamic_key`.
pub fn seal(timestamp_millis: u64, dynamic_key: &[u8], plaintext: &[u8]) -> UnwrapResult<SealedExchange> {
    let tkey = timestamp::derive(timestamp_millis).at(Stage::TimestampKey)?;
    let key_envelope = seal_envelope(dynamic_key, tkey.as_bytes()).at(Stage::DynamicKey)?;
    let payload_envelope = seal_envelope(plaintext, dynamic_key).at(Stage::Payload)?;

    Ok(SealedExchange {
        timestamp_millis,
        key_envelope,
        payload_envelope,
    })
}
