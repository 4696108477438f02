use crate::domain::{LogBatchEnvelope, ShipperError};

pub const JSON_CONTENT_TYPE: &str = "application/json";

/// Encodes the envelope as the UTF-8 JSON request body.
pub fn serialize_envelope(envelope: &LogBatchEnvelope) -> Result<Vec<u8>, ShipperError> {
    serde_json::to_vec(envelope).map_err(ShipperError::Serialization)
}

/// Decodes a request body, re-applying the envelope invariants.
pub fn parse_envelope(body: &[u8]) -> Result<LogBatchEnvelope, ShipperError> {
    serde_json::from_slice(body).map_err(ShipperError::Serialization)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{LogEntry, Severity};
    use proptest::prelude::*;

    fn severity() -> impl Strategy<Value = Severity> {
        prop::sample::select(Severity::ALL.to_vec())
    }

    fn entry() -> impl Strategy<Value = LogEntry> {
        (severity(), ".{0,64}").prop_map(|(severity, text)| LogEntry::new(severity, text))
    }

    proptest! {
        #[test]
        fn round_trip_preserves_fields_and_order(
            key in "[a-zA-Z0-9-]{1,40}",
            app in "[a-z][a-z0-9-]{0,20}",
            sub in "[a-z][a-z0-9-]{0,20}",
            entries in prop::collection::vec(entry(), 1..20),
        ) {
            let envelope = LogBatchEnvelope::new(&key, &app, &sub, entries.clone()).unwrap();
            let body = serialize_envelope(&envelope).unwrap();
            let parsed = parse_envelope(&body).unwrap();

            prop_assert_eq!(parsed.private_key(), key.as_str());
            prop_assert_eq!(parsed.application_name(), app.as_str());
            prop_assert_eq!(parsed.subsystem_name(), sub.as_str());
            prop_assert_eq!(parsed.log_entries(), entries.as_slice());
        }
    }

    #[test]
    fn body_is_utf8_json() {
        let envelope = LogBatchEnvelope::new(
            "key",
            "app",
            "sub",
            vec![LogEntry::info("größe: 1 MB ✓")],
        )
        .unwrap();

        let body = serialize_envelope(&envelope).unwrap();
        let text = String::from_utf8(body).unwrap();
        assert!(text.contains("größe: 1 MB ✓"));
    }

    #[test]
    fn parse_rejects_malformed_body() {
        assert!(matches!(
            parse_envelope(b"{not json"),
            Err(ShipperError::Serialization(_))
        ));
    }
}
