use super::config::Settings;
use super::logging_system::LoggingSystem;
use crate::domain::{LogEntry, ShipperError};
use crate::sender::{DeliveryResult, LogShipper};
use crate::telemetry::TelemetrySampler;
use std::fmt;
use tracing::{error, info, warn};

/// The two producers that feed the shipper.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Telemetry,
    ConfiguredEntries,
}

impl fmt::Display for Flow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Flow::Telemetry => f.write_str("metrics and tracing data"),
            Flow::ConfiguredEntries => f.write_str("configured log entries"),
        }
    }
}

#[derive(Debug)]
pub struct FlowReport {
    pub flow: Flow,
    pub outcome: Result<DeliveryResult, ShipperError>,
}

impl FlowReport {
    pub fn delivered(&self) -> bool {
        matches!(&self.outcome, Ok(result) if result.success)
    }
}

/// Runs both flows through one shipper, one after the other.
#[derive(Debug, Clone)]
pub struct Pipeline {
    shipper: LogShipper,
    sampler: TelemetrySampler,
    settings: Settings,
}

impl Pipeline {
    pub fn new(shipper: LogShipper, sampler: TelemetrySampler, settings: Settings) -> Self {
        Self {
            shipper,
            sampler,
            settings,
        }
    }

    /// Writes the configured `LoggingMessages` to the local sink only.
    pub fn log_configured_messages(&self, logging: &LoggingSystem) {
        for (severity, message) in self.settings.logging_messages.messages() {
            logging.log(severity, message);
        }
    }

    pub async fn ship_telemetry(&self) -> Result<DeliveryResult, ShipperError> {
        let entries = self.sampler.capture().await;
        self.ship(entries).await
    }

    pub async fn ship_configured_entries(&self) -> Result<DeliveryResult, ShipperError> {
        let entries = self.settings.log_entries.entries()?;
        self.ship(entries).await
    }

    async fn ship(&self, entries: Vec<LogEntry>) -> Result<DeliveryResult, ShipperError> {
        let credentials = self.settings.credentials();
        self.shipper.send(&credentials, entries).await
    }

    /// Logs the configured messages, then ships telemetry, then the configured
    /// entries. A failed flow does not stop the next one.
    pub async fn run(&self, logging: &LoggingSystem) -> Vec<FlowReport> {
        self.log_configured_messages(logging);

        let telemetry = FlowReport {
            flow: Flow::Telemetry,
            outcome: self.ship_telemetry().await,
        };
        report(&telemetry);

        let configured = FlowReport {
            flow: Flow::ConfiguredEntries,
            outcome: self.ship_configured_entries().await,
        };
        report(&configured);

        vec![telemetry, configured]
    }
}

/// One line per flow: success, rejection with status, or the error kind.
pub fn report(report: &FlowReport) {
    match &report.outcome {
        Ok(result) if result.success => {
            info!("{} sent successfully: {}", capitalize(report.flow), result);
        }
        Ok(result) => {
            warn!("Failed to send {}: {}", report.flow, result);
        }
        Err(e) => {
            error!("Failed to send {} ({:?}): {}", report.flow, e.kind(), e);
        }
    }
}

fn capitalize(flow: Flow) -> String {
    let text = flow.to_string();
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::config::LogLevel;
    use crate::sender::ClientConfig;
    use std::time::Duration;
    use tracing_test::traced_test;

    fn pipeline(settings: Settings) -> Pipeline {
        Pipeline::new(
            LogShipper::new(ClientConfig::default()).unwrap(),
            TelemetrySampler::new("SampleOperation", Duration::from_millis(1)),
            settings,
        )
    }

    #[test]
    fn flow_names() {
        assert_eq!(capitalize(Flow::Telemetry), "Metrics and tracing data");
        assert_eq!(Flow::ConfiguredEntries.to_string(), "configured log entries");
    }

    #[tokio::test]
    async fn missing_credentials_fail_before_sending() {
        let reports = pipeline(Settings::default())
            .run(&LoggingSystem::new(LogLevel::Info))
            .await;

        assert_eq!(reports.len(), 2);
        assert!(reports.iter().all(|r| !r.delivered()));
        assert!(matches!(
            reports[0].outcome,
            Err(ShipperError::Configuration(_))
        ));
        assert!(matches!(
            reports[1].outcome,
            Err(ShipperError::Configuration(_))
        ));
    }

    #[test]
    #[traced_test]
    fn configured_messages_go_to_local_sink() {
        let settings = Settings::from_toml_str(
            "[LoggingMessages]\nErrorMessage = \"local error line\"\nInformationMessage = \"local info line\"",
        )
        .unwrap();

        pipeline(settings).log_configured_messages(&LoggingSystem::new(LogLevel::Trace));

        assert!(logs_contain("local error line"));
        assert!(logs_contain("local info line"));
    }
}
