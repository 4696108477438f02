use crate::domain::LogEntry;
use std::time::Duration;

/// `System metrics: Total Memory: <bytes> bytes, Uptime: <uptime>`
pub fn format_metrics_entry(memory: u64, uptime: Duration) -> LogEntry {
    LogEntry::info(format!(
        "System metrics: Total Memory: {memory} bytes, Uptime: {}",
        format_uptime(uptime)
    ))
}

/// `Operation <name> took <ms> ms`
pub fn format_operation_entry(name: &str, duration: Duration) -> LogEntry {
    LogEntry::info(format!(
        "Operation {name} took {} ms",
        format_millis(duration)
    ))
}

/// Renders `[d.]hh:mm:ss[.fffffff]`. The fraction is in 100ns ticks and only
/// appears when non-zero.
pub fn format_uptime(uptime: Duration) -> String {
    let total_secs = uptime.as_secs();
    let days = total_secs / 86_400;
    let hours = (total_secs % 86_400) / 3_600;
    let minutes = (total_secs % 3_600) / 60;
    let seconds = total_secs % 60;
    let ticks = uptime.subsec_nanos() / 100;

    let clock = format!("{hours:02}:{minutes:02}:{seconds:02}");
    let clock = if days > 0 {
        format!("{days}.{clock}")
    } else {
        clock
    };

    if ticks > 0 {
        format!("{clock}.{ticks:07}")
    } else {
        clock
    }
}

/// Total milliseconds at 100ns tick precision, without a trailing `.0` for
/// whole values.
pub fn format_millis(duration: Duration) -> String {
    let ticks = duration.as_nanos() / 100;
    let millis = ticks as f64 / 10_000.0;
    format!("{millis}")
}
