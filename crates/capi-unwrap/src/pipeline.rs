//! The unwrap pipeline: timestamp key, then dynamic key, then payload.
//!
//! Any stage failure ends the attempt. Retrying means running a fresh
//! attempt with a newly captured timestamp; nothing here is reused.

use crate::error::{Stage, StageExt, UnwrapResult};
use crate::types::{Exchange, PipelineState};
use crate::{payload, resolver, timestamp};

/// Recover the plaintext from one exchange's materials.
pub fn unwrap(timestamp_millis: u64, key_envelope: &str, payload_envelope: &str) -> UnwrapResult<String> {
    Unwrapper::new().run(timestamp_millis, Some(key_envelope), payload_envelope)
}

/// Like [`unwrap`], but the key envelope may be absent from the response.
pub fn unwrap_exchange(exchange: &Exchange) -> UnwrapResult<String> {
    Unwrapper::new().run(
        exchange.timestamp_millis,
        exchange.key_envelope.as_deref(),
        &exchange.payload_envelope,
    )
}

/// Single-use pipeline runner that records how far it got.
#[derive(Debug)]
pub struct Unwrapper {
    state: PipelineState,
}

impl Default for Unwrapper {
    fn default() -> Self {
        Self::new()
    }
}

impl Unwrapper {
    pub fn new() -> Self {
        Self {
            state: PipelineState::Start,
        }
    }

    pub fn state(&self) -> PipelineState {
        self.state
    }

    /// Run every stage in order. The state ends at `PayloadDecoded` or
    /// `Failed(stage)`.
    pub fn run(
        &mut self,
        timestamp_millis: u64,
        key_envelope: Option<&str>,
        payload_envelope: &str,
    ) -> UnwrapResult<String> {
        let result = self.stages(timestamp_millis, key_envelope, payload_envelope);
        if let Err(e) = &result {
            self.state = PipelineState::Failed(e.stage());
            tracing::debug!(stage = %e.stage(), error = %e.kind(), "unwrap failed");
        }
        result
    }

    fn stages(
        &mut self,
        timestamp_millis: u64,
        key_envelope: Option<&str>,
        payload_envelope: &str,
    ) -> UnwrapResult<String> {
        let tkey = timestamp::derive(timestamp_millis).at(Stage::TimestampKey)?;
        self.advance(PipelineState::TimestampKeyed);

        let dkey = resolver::resolve(key_envelope, &tkey)?;
        self.advance(PipelineState::DynamicKeyResolved);

        let text = payload::decode(payload_envelope, &dkey)?;
        self.advance(PipelineState::PayloadDecoded);
        Ok(text)
    }

    fn advance(&mut self, next: PipelineState) {
        tracing::debug!(from = ?self.state, to = ?next, "unwrap stage complete");
        self.state = next;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EnvelopeError;
    use crate::seal::seal;

    const T: u64 = 1_700_000_000_000;
    const DKEY: &[u8; 16] = b"ABCDEFGHIJKLMNOP";

    #[test]
    fn test_end_to_end_fixture() {
        let sealed = seal(T, DKEY, br#"{"ok":true}"#).unwrap();
        let text = unwrap(T, &sealed.key_envelope, &sealed.payload_envelope).unwrap();
        assert_eq!(text, r#"{"ok":true}"#);
    }

    #[test]
    fn test_state_reaches_payload_decoded() {
        let sealed = seal(T, DKEY, b"[]").unwrap();
        let mut unwrapper = Unwrapper::new();
        unwrapper
            .run(T, Some(&sealed.key_envelope), &sealed.payload_envelope)
            .unwrap();
        assert_eq!(unwrapper.state(), PipelineState::PayloadDecoded);
    }

    #[test]
    fn test_missing_key_envelope_fails_at_dynamic_key() {
        let exchange = Exchange {
            timestamp_millis: T,
            key_envelope: None,
            payload_envelope: "garbage that is never read".into(),
        };
        let err = unwrap_exchange(&exchange).unwrap_err();
        assert!(err.is_missing_key_header());
        assert_eq!(err.stage(), Stage::DynamicKey);
    }

    #[test]
    fn test_short_timestamp_fails_at_first_stage() {
        let mut unwrapper = Unwrapper::new();
        let err = unwrapper.run(12345, Some("AAAA"), "AAAA").unwrap_err();
        assert_eq!(err.stage(), Stage::TimestampKey);
        assert!(matches!(err.kind(), EnvelopeError::Format(_)));
        assert_eq!(unwrapper.state(), PipelineState::Failed(Stage::TimestampKey));
    }

    #[test]
    fn test_wrong_timestamp_fails_at_dynamic_key() {
        let sealed = seal(T, DKEY, br#"{"ok":true}"#).unwrap();
        let err = unwrap(T + 10, &sealed.key_envelope, &sealed.payload_envelope).unwrap_err();
        assert_eq!(err.stage(), Stage::DynamicKey);
    }

    #[test]
    fn test_corrupt_payload_fails_at_payload() {
        let sealed = seal(T, DKEY, br#"{"ok":true}"#).unwrap();
        let mut unwrapper = Unwrapper::new();
        let err = unwrapper
            .run(T, Some(&sealed.key_envelope), "@@@")
            .unwrap_err();
        assert_eq!(err.stage(), Stage::Payload);
        assert!(matches!(err.kind(), EnvelopeError::Base64Decode(_)));
        assert_eq!(unwrapper.state(), PipelineState::Failed(Stage::Payload));
    }

    #[test]
    fn test_concurrent_unwraps_are_independent() {
        let handles: Vec<_> = (0..8u64)
            .map(|i| {
                std::thread::spawn(move || {
                    let ts = T + i * 1_000;
                    let body = format!("{{\"n\":{i}}}");
                    let sealed = seal(ts, DKEY, body.as_bytes()).unwrap();
                    let text = unwrap(ts, &sealed.key_envelope, &sealed.payload_envelope).unwrap();
                    assert_eq!(text, body);
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }
    }
}
