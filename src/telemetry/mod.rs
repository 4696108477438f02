//! Point-in-time process telemetry rendered as log entries.

pub mod format;
pub mod sampler;

pub use format::{format_metrics_entry, format_operation_entry, format_uptime};
pub use sampler::{
    OperationSpan, TelemetrySampler, process_start, sample_memory, sample_uptime,
    time_operation, time_operation_async,
};
