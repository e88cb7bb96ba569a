//! Payload envelope decoding.

use base64::Engine;

use crate::error::{EnvelopeError, Stage, StageExt, UnwrapResult};
use crate::types::DynamicKey;
use crate::{block, compress};

/// Open the payload envelope with the dynamic key and return the text verbatim.
pub fn decode(envelope: &str, dynamic_key: &DynamicKey) -> UnwrapResult<String> {
    let ciphertext = base64::engine::general_purpose::STANDARD
        .decode(envelope.trim())
        .map_err(EnvelopeError::from)
        .at(Stage::Payload)?;
    let blob = block::decode(&ciphertext, dynamic_key.as_bytes()).at(Stage::Payload)?;
    let raw = compress::decode(&blob).at(Stage::Payload)?;
    String::from_utf8(raw)
        .map_err(EnvelopeError::from)
        .at(Stage::Payload)
}

#[cfg(test)]
mod tests {
    use super::*;

    const KEY: DynamicKey = DynamicKey::from_bytes(*b"ABCDEFGHIJKLMNOP");

    fn envelope_for(plain: &[u8]) -> String {
        let blob = compress::compress(plain).unwrap();
        let sealed = block::seal(&blob, KEY.as_bytes()).unwrap();
        base64::engine::general_purpose::STANDARD.encode(sealed)
    }

    #[test]
    fn test_decodes_text_verbatim() {
        let text = r#"{"list":[1,2,3], "note":"ünïcödé"}"#;
        assert_eq!(decode(&envelope_for(text.as_bytes()), &KEY).unwrap(), text);
    }

    #[test]
    fn test_no_json_validation() {
        assert_eq!(decode(&envelope_for(b"{not json"), &KEY).unwrap(), "{not json");
    }

    #[test]
    fn test_invalid_utf8_reported() {
        let err = decode(&envelope_for(&[0xC3, 0x28]), &KEY).unwrap_err();
        assert!(matches!(err.kind(), EnvelopeError::InvalidUtf8(_)));
        assert_eq!(err.stage(), Stage::Payload);
    }

    #[test]
    fn test_unaligned_ciphertext() {
        let env = base64::engine::general_purpose::STANDARD.encode([1u8; 20]);
        let err = decode(&env, &KEY).unwrap_err();
        assert!(matches!(err.kind(), EnvelopeError::Format(_)));
    }

    #[test]
    fn test_plain_gzip_without_encryption_rejected() {
        let blob = compress::compress(b"{}").unwrap();
        let env = base64::engine::general_purpose::STANDARD.encode(blob);
        assert!(decode(&env, &KEY).is_err());
    }
}
