use super::config::{LogFormat, LogLevel};
use crate::domain::Severity;
use std::io::Write;
use thiserror::Error;
use tracing::{debug, error, info, trace, warn};
use tracing_subscriber::filter::ParseError;
use tracing_subscriber::util::TryInitError;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Targets that are noisy at debug and below.
const QUIET_TARGETS: [&str; 4] = ["hyper", "reqwest", "h2", "rustls"];

#[derive(Error, Debug)]
pub enum LoggingError {
    #[error("Failed to create EnvFilter with '{filter}': {source}")]
    InvalidFilter {
        filter: String,
        #[source]
        source: ParseError,
    },
    #[error("Failed to set global tracing subscriber: {0}")]
    AlreadyInitialized(#[from] TryInitError),
}

/// Handle to the local structured-logging sink.
///
/// Built once at startup, passed to whoever writes local log lines, and
/// flushed once at exit. Remote delivery never goes through here.
#[derive(Debug)]
pub struct LoggingSystem {
    level: LogLevel,
    format: LogFormat,
    installed: bool,
}

impl LoggingSystem {
    pub fn new(level: LogLevel) -> Self {
        Self {
            level,
            format: LogFormat::Compact,
            installed: false,
        }
    }

    pub fn with_format(mut self, format: LogFormat) -> Self {
        self.format = format;
        self
    }

    /// Creates the handle and installs the global subscriber.
    pub fn init(level: LogLevel, format: LogFormat) -> Result<Self, LoggingError> {
        let mut system = Self::new(level).with_format(format);
        system.install()?;
        Ok(system)
    }

    pub fn install(&mut self) -> Result<(), LoggingError> {
        let filter = self.filter_string();
        let env_filter =
            EnvFilter::try_new(&filter).map_err(|source| LoggingError::InvalidFilter {
                filter: filter.clone(),
                source,
            })?;

        match self.format {
            LogFormat::Json => tracing_subscriber::registry()
                .with(env_filter)
                .with(
                    fmt::layer()
                        .json()
                        .flatten_event(true)
                        .with_current_span(true),
                )
                .try_init()?,
            LogFormat::Compact => tracing_subscriber::registry()
                .with(env_filter)
                .with(
                    fmt::layer()
                        .with_target(true)
                        .with_level(true)
                        .with_thread_ids(false)
                        .compact(),
                )
                .try_init()?,
        }

        self.installed = true;
        debug!("Logging subsystem enabled at {}", self.level.as_str());
        Ok(())
    }

    pub fn filter_string(&self) -> String {
        let mut parts = Vec::with_capacity(QUIET_TARGETS.len() + 1);
        parts.push(self.level.as_str().to_string());
        parts.extend(QUIET_TARGETS.iter().map(|target| format!("{target}=warn")));
        parts.join(",")
    }

    pub fn is_installed(&self) -> bool {
        self.installed
    }

    /// Writes one `(severity, message)` pair to the local sink.
    ///
    /// Critical and error share ERROR; verbose is TRACE, below debug.
    pub fn log(&self, severity: Severity, message: &str) {
        match severity {
            Severity::Critical | Severity::Error => error!(target: "cx_log_shipper::local", "{message}"),
            Severity::Warning => warn!(target: "cx_log_shipper::local", "{message}"),
            Severity::Info => info!(target: "cx_log_shipper::local", "{message}"),
            Severity::Debug => debug!(target: "cx_log_shipper::local", "{message}"),
            Severity::Verbose => trace!(target: "cx_log_shipper::local", "{message}"),
        }
    }

    /// Flushes what the fmt layer has written. Consumes the handle.
    pub fn flush(self) {
        debug!("Flushing local log output");
        if let Err(e) = std::io::stdout().flush() {
            eprintln!("Failed to flush log output: {e}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing_test::traced_test;

    #[test]
    fn filter_string_quiets_transport_crates() {
        let system = LoggingSystem::new(LogLevel::Debug);
        assert_eq!(
            system.filter_string(),
            "debug,hyper=warn,reqwest=warn,h2=warn,rustls=warn"
        );
    }

    #[test]
    fn filter_string_is_accepted_by_env_filter() {
        for level in [LogLevel::Error, LogLevel::Info, LogLevel::Trace] {
            assert!(EnvFilter::try_new(LoggingSystem::new(level).filter_string()).is_ok());
        }
    }

    #[test]
    #[traced_test]
    fn log_maps_severities_to_tracing_levels() {
        let system = LoggingSystem::new(LogLevel::Trace);
        let cases = [
            (Severity::Critical, "ERROR", "critical line"),
            (Severity::Error, "ERROR", "error line"),
            (Severity::Info, "INFO", "information line"),
            (Severity::Warning, "WARN", "warning line"),
            (Severity::Verbose, "TRACE", "verbose line"),
            (Severity::Debug, "DEBUG", "debug line"),
        ];
        for (severity, _, message) in cases {
            system.log(severity, message);
        }

        logs_assert(|lines: &[&str]| {
            for (severity, level, message) in cases {
                let matched = lines
                    .iter()
                    .any(|line| line.contains(level) && line.contains(message));
                if !matched {
                    return Err(format!("{severity} was not logged at {level}"));
                }
            }
            Ok(())
        });
    }

    #[test]
    #[traced_test]
    fn log_writes_to_local_sink() {
        let system = LoggingSystem::new(LogLevel::Trace);
        system.log(Severity::Warning, "disk nearly full");

        assert!(logs_contain("disk nearly full"));
        assert!(!system.is_installed());
    }
}
