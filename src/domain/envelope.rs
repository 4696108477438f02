use super::error::ShipperError;
use super::log_entry::LogEntry;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The top-level JSON object posted to the logs endpoint.
///
/// Field names are part of the remote contract. Construction through
/// [`LogBatchEnvelope::new`] (and deserialization, which routes through it)
/// guarantees a non-empty entry list and non-blank identity fields.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "RawEnvelope")]
pub struct LogBatchEnvelope {
    private_key: String,
    application_name: String,
    subsystem_name: String,
    log_entries: Vec<LogEntry>,
}

impl LogBatchEnvelope {
    pub fn new(
        private_key: impl Into<String>,
        application_name: impl Into<String>,
        subsystem_name: impl Into<String>,
        log_entries: Vec<LogEntry>,
    ) -> Result<Self, ShipperError> {
        let private_key = require_non_blank("privateKey", private_key.into())?;
        let application_name = require_non_blank("applicationName", application_name.into())?;
        let subsystem_name = require_non_blank("subsystemName", subsystem_name.into())?;

        if log_entries.is_empty() {
            return Err(ShipperError::configuration(
                "logEntries must contain at least one entry",
            ));
        }

        Ok(Self {
            private_key,
            application_name,
            subsystem_name,
            log_entries,
        })
    }

    pub fn private_key(&self) -> &str {
        &self.private_key
    }

    pub fn application_name(&self) -> &str {
        &self.application_name
    }

    pub fn subsystem_name(&self) -> &str {
        &self.subsystem_name
    }

    pub fn log_entries(&self) -> &[LogEntry] {
        &self.log_entries
    }

    pub fn len(&self) -> usize {
        self.log_entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.log_entries.is_empty()
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawEnvelope {
    private_key: String,
    application_name: String,
    subsystem_name: String,
    log_entries: Vec<LogEntry>,
}

impl TryFrom<RawEnvelope> for LogBatchEnvelope {
    type Error = ShipperError;

    fn try_from(raw: RawEnvelope) -> Result<Self, Self::Error> {
        Self::new(
            raw.private_key,
            raw.application_name,
            raw.subsystem_name,
            raw.log_entries,
        )
    }
}

// Identity fields are credentials and stay out of debug output.
impl fmt::Debug for LogBatchEnvelope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LogBatchEnvelope")
            .field("private_key", &"<redacted>")
            .field("application_name", &"<redacted>")
            .field("subsystem_name", &"<redacted>")
            .field("log_entries", &self.log_entries.len())
            .finish()
    }
}

pub(crate) fn require_non_blank(field: &str, value: String) -> Result<String, ShipperError> {
    if value.trim().is_empty() {
        Err(ShipperError::configuration(format!("{field} must not be empty")))
    } else {
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Severity;

    fn entries() -> Vec<LogEntry> {
        vec![
            LogEntry::new(Severity::Verbose, "first"),
            LogEntry::new(Severity::Error, "second"),
        ]
    }

    #[test]
    fn serializes_contract_field_names() {
        let envelope = LogBatchEnvelope::new("key", "app", "sub", entries()).unwrap();
        let value = serde_json::to_value(&envelope).unwrap();

        assert_eq!(value["privateKey"], "key");
        assert_eq!(value["applicationName"], "app");
        assert_eq!(value["subsystemName"], "sub");
        assert_eq!(value["logEntries"][0]["severity"], 5);
        assert_eq!(value["logEntries"][1]["text"], "second");
        assert_eq!(value.as_object().unwrap().len(), 4);
    }

    #[test]
    fn rejects_empty_entries() {
        let err = LogBatchEnvelope::new("key", "app", "sub", Vec::new()).unwrap_err();
        assert!(matches!(err, ShipperError::Configuration(_)));
    }

    #[test]
    fn rejects_blank_identity_fields() {
        for (key, app, sub) in [("", "app", "sub"), ("key", " ", "sub"), ("key", "app", "")] {
            let err = LogBatchEnvelope::new(key, app, sub, entries()).unwrap_err();
            assert!(matches!(err, ShipperError::Configuration(_)));
        }
    }

    #[test]
    fn deserialization_enforces_invariants() {
        let body = r#"{"privateKey":"k","applicationName":"a","subsystemName":"s","logEntries":[]}"#;
        assert!(serde_json::from_str::<LogBatchEnvelope>(body).is_err());
    }

    #[test]
    fn debug_output_hides_identity_fields() {
        let envelope = LogBatchEnvelope::new("super-secret", "checkout", "payments", entries()).unwrap();
        let rendered = format!("{envelope:?}");

        assert!(!rendered.contains("super-secret"));
        assert!(!rendered.contains("checkout"));
        assert!(!rendered.contains("payments"));
        assert!(rendered.contains("<redacted>"));
    }
}
