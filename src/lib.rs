// Specific pedantic lints enforced (not blanket allow):
#![deny(
    clippy::explicit_iter_loop,
    clippy::manual_let_else,
    clippy::semicolon_if_nothing_returned,
    clippy::inconsistent_struct_constructor
)]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
#![allow(
    clippy::cast_precision_loss,      // Acceptable for millisecond display
    clippy::missing_errors_doc,       // Internal API
    clippy::module_name_repetitions,  // e.g. ShipperError in domain module
    clippy::must_use_candidate,
    clippy::doc_markdown
)]

pub mod app;
pub mod domain;
pub mod sender;
pub mod telemetry;

// Re-export main types for easy access
pub use app::{App, Config};
pub use domain::{LogBatchEnvelope, LogEntry, Severity, ShipperError};
pub use sender::{DeliveryResult, LogShipper, ShipperCredentials};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
