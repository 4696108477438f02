use super::format::{format_metrics_entry, format_operation_entry};
use crate::domain::LogEntry;
use std::convert::Infallible;
use std::future::Future;
use std::sync::OnceLock;
use std::time::{Duration, Instant};
use sysinfo::{ProcessesToUpdate, System};
use tracing::{Instrument, debug, info_span, warn};

static PROCESS_START: OnceLock<Instant> = OnceLock::new();

/// Monotonic anchor for uptime. The binary touches this first thing in `main`;
/// otherwise the first caller fixes it.
pub fn process_start() -> Instant {
    *PROCESS_START.get_or_init(Instant::now)
}

/// Resident memory of this process in bytes, or 0 if the platform won't say.
pub fn sample_memory() -> u64 {
    let Ok(pid) = sysinfo::get_current_pid() else {
        return 0;
    };

    let mut system = System::new();
    system.refresh_processes(ProcessesToUpdate::Some(&[pid]), true);
    system.process(pid).map_or(0, |process| process.memory())
}

pub fn sample_uptime() -> Duration {
    process_start().elapsed()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperationSpan {
    pub name: String,
    pub duration: Duration,
}

/// Closes the span on every exit path. A drop without `stop` means the body
/// unwound or the future was cancelled.
struct SpanTimer {
    name: String,
    start: Instant,
    stopped: bool,
}

impl SpanTimer {
    fn start(name: String) -> Self {
        Self {
            name,
            start: Instant::now(),
            stopped: false,
        }
    }

    fn stop(mut self) -> OperationSpan {
        self.stopped = true;
        let duration = self.start.elapsed();
        debug!(operation = %self.name, ?duration, "Operation span closed");
        OperationSpan {
            name: std::mem::take(&mut self.name),
            duration,
        }
    }
}

impl Drop for SpanTimer {
    fn drop(&mut self) {
        if !self.stopped {
            warn!(
                operation = %self.name,
                elapsed = ?self.start.elapsed(),
                "Operation span closed without completing"
            );
        }
    }
}

/// Times `body` under a named span. The span is closed before an error from
/// `body` is handed back.
pub fn time_operation<E>(
    name: impl Into<String>,
    body: impl FnOnce() -> Result<(), E>,
) -> Result<OperationSpan, E> {
    let timer = SpanTimer::start(name.into());
    let span = info_span!("operation", name = %timer.name);
    let outcome = span.in_scope(body);
    let recorded = timer.stop();
    outcome.map(|()| recorded)
}

pub async fn time_operation_async<F, E>(
    name: impl Into<String>,
    body: F,
) -> Result<OperationSpan, E>
where
    F: Future<Output = Result<(), E>>,
{
    let timer = SpanTimer::start(name.into());
    let span = info_span!("operation", name = %timer.name);
    let outcome = body.instrument(span).await;
    let recorded = timer.stop();
    outcome.map(|()| recorded)
}

/// Produces the metrics and operation entries shipped by the telemetry flow.
#[derive(Debug, Clone)]
pub struct TelemetrySampler {
    operation_name: String,
    operation_delay: Duration,
}

impl TelemetrySampler {
    pub fn new(operation_name: impl Into<String>, operation_delay: Duration) -> Self {
        Self {
            operation_name: operation_name.into(),
            operation_delay,
        }
    }

    /// Samples memory and uptime, then times the simulated operation.
    /// Entries come back as `[metrics, operation]`.
    pub async fn capture(&self) -> Vec<LogEntry> {
        let memory = sample_memory();
        let uptime = sample_uptime();

        let delay = self.operation_delay;
        let Ok(span) = time_operation_async(&self.operation_name, async move {
            tokio::time::sleep(delay).await;
            Ok::<(), Infallible>(())
        })
        .await;

        vec![
            format_metrics_entry(memory, uptime),
            format_operation_entry(&span.name, span.duration),
        ]
    }
}

impl Default for TelemetrySampler {
    fn default() -> Self {
        Self::new("SampleOperation", Duration::from_millis(1000))
    }
}
