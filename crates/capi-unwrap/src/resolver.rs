//! Dynamic key recovery from the out-of-band key envelope.

use base64::Engine;

use crate::error::{EnvelopeError, Stage, StageExt, UnwrapError, UnwrapResult};
use crate::types::{DynamicKey, TimestampKey};
use crate::{block, compress};

/// Open the key envelope with the timestamp key.
///
/// A missing or blank envelope fails before any decoding is attempted. The
/// decompressed bytes are the key itself and must be exactly 16 long.
pub fn resolve(envelope: Option<&str>, timestamp_key: &TimestampKey) -> UnwrapResult<DynamicKey> {
    let envelope = match envelope.map(str::trim) {
        Some(text) if !text.is_empty() => text,
        _ => return Err(UnwrapError::new(Stage::DynamicKey, EnvelopeError::MissingKeyHeader)),
    };

    let ciphertext = base64::engine::general_purpose::STANDARD
        .decode(envelope)
        .map_err(EnvelopeError::from)
        .at(Stage::DynamicKey)?;
    let blob = block::decode(&ciphertext, timestamp_key.as_bytes()).at(Stage::DynamicKey)?;
    let raw = compress::decode(&blob).at(Stage::DynamicKey)?;

    DynamicKey::try_from(raw.as_slice()).map_err(|len| {
        UnwrapError::new(Stage::DynamicKey, EnvelopeError::KeyDerivation { len })
    })
}
