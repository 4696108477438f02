use super::severity::Severity;
use serde::{Deserialize, Serialize};

/// A single log line as the ingestion API receives it.
///
/// Entries are immutable once built; producers create a fresh one per sample
/// or per configured message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    severity: Severity,
    text: String,
}

impl LogEntry {
    pub fn new(severity: Severity, text: impl Into<String>) -> Self {
        Self {
            severity,
            text: text.into(),
        }
    }

    pub fn info(text: impl Into<String>) -> Self {
        Self::new(Severity::Info, text)
    }

    pub fn severity(&self) -> Severity {
        self.severity
    }

    pub fn text(&self) -> &str {
        &self.text
    }
}
