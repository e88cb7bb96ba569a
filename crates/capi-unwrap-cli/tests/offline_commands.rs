//! Integration tests for the offline subcommands: seal, decode, derive-key.

use serde_json::{json, Value};

use capi_unwrap::{EnvelopeError, UnwrapError};
use capi_unwrap_cli::commands::{self, PayloadSource};

// ─────────────────────── helpers ───────────────────────

const T: u64 = 1_700_000_000_000;

/// Run `seal` and parse its JSON output.
fn sealed(text: &str) -> Value {
    let out = commands::seal(Some(T), "ABCDEFGHIJKLMNOP", text).unwrap();
    serde_json::from_str(&out).unwrap()
}

fn field<'a>(v: &'a Value, name: &str) -> &'a str {
    v[name].as_str().expect("string field")
}

// ─────────────────────── tests ───────────────────────

#[test]
fn seal_output_decodes_inline() {
    let s = sealed(r#"{"ok":true}"#);
    assert_eq!(s["timestamp_millis"], json!(T));

    let out = commands::decode(
        T,
        Some(field(&s, "key_envelope")),
        PayloadSource::Inline(field(&s, "payload_envelope")),
        false,
    )
    .unwrap();
    assert_eq!(out, r#"{"ok":true}"#);
}

#[test]
fn seal_output_decodes_from_body_file() {
    let s = sealed(r#"{"list":[1,2]}"#);
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("body.json");
    let body = json!({
        "code": "0",
        "msg": "success",
        "data": field(&s, "payload_envelope"),
        "success": true,
    });
    std::fs::write(&path, body.to_string()).unwrap();

    let out = commands::decode(
        T,
        Some(field(&s, "key_envelope")),
        PayloadSource::BodyFile(&path),
        true,
    )
    .unwrap();
    assert_eq!(out, "{\n  \"list\": [\n    1,\n    2\n  ]\n}");
}

#[test]
fn decode_without_key_envelope_is_missing_header() {
    let s = sealed("{}");
    let err = commands::decode(T, None, PayloadSource::Inline(field(&s, "payload_envelope")), false)
        .unwrap_err();
    let unwrap_err = err.downcast_ref::<UnwrapError>().expect("engine error");
    assert!(matches!(unwrap_err.kind(), EnvelopeError::MissingKeyHeader));
}

#[test]
fn decode_missing_body_file_reports_path() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("absent.json");
    let err = commands::decode(T, Some("AAAA"), PayloadSource::BodyFile(&path), false).unwrap_err();
    assert!(err.to_string().contains("absent.json"));
}

#[test]
fn seal_rejects_short_dynamic_key() {
    assert!(commands::seal(Some(T), "short", "{}").is_err());
}

#[test]
fn derive_key_prints_timestamp_and_key() {
    assert_eq!(
        commands::derive_key(Some(T)).unwrap(),
        "1700000000000 MTcwMDAwMDAwMDAw"
    );
    assert!(commands::derive_key(Some(12345)).is_err());
}
