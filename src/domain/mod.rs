//! Domain layer for cx-log-shipper.
//!
//! Contains the canonical types shared across all modules:
//! - `LogEntry`: one (severity, text) pair
//! - `Severity`: the ingestion API's 1..=6 severity codes
//! - `LogBatchEnvelope`: the JSON body posted per send
//! - `ShipperError`: error type of a send

pub mod envelope;
pub mod error;
pub mod log_entry;
pub mod severity;

pub use envelope::LogBatchEnvelope;
pub use error::{ErrorKind, ShipperError};
pub use log_entry::LogEntry;
pub use severity::Severity;
