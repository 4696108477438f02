pub mod config;
pub mod logging_system;
pub mod pipeline;

pub use config::{Config, ConfigError, LogFormat, LogLevel, Settings};
pub use logging_system::{LoggingError, LoggingSystem};
pub use pipeline::{Flow, FlowReport, Pipeline};

use crate::sender::LogShipper;
use crate::telemetry::TelemetrySampler;
use anyhow::Context;
use tracing::{debug, info};

pub struct App {
    config: Config,
    pipeline: Pipeline,
}

impl App {
    pub fn from_args<I, T>(args: I) -> anyhow::Result<Self>
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        let config = Config::from_args(args).context("Failed to load configuration")?;
        Self::from_config(config)
    }

    pub fn from_config(config: Config) -> anyhow::Result<Self> {
        config.validate()?;

        let shipper =
            LogShipper::new(config.client_config()).context("Failed to create log shipper")?;
        let sampler = TelemetrySampler::new(config.operation_name.clone(), config.operation_delay());
        let pipeline = Pipeline::new(shipper, sampler, config.settings.clone());

        Ok(Self { config, pipeline })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Runs both flows and returns their reports. Send failures are reported,
    /// not raised.
    pub async fn run(&self, logging: &LoggingSystem) -> Vec<FlowReport> {
        info!(
            "Starting cx-log-shipper v{} (environment: {})",
            get_version(),
            self.config.environment
        );
        debug!("Settings: {:?}", self.config.settings);

        let reports = self.pipeline.run(logging).await;

        let delivered = reports.iter().filter(|r| r.delivered()).count();
        info!("{delivered}/{} batches delivered", reports.len());
        reports
    }
}

pub fn get_version() -> String {
    crate::VERSION.to_string()
}

// Main entry point for the application
pub async fn main() -> anyhow::Result<()> {
    let args: Vec<String> = std::env::args().collect();

    let app = App::from_args(args)?;
    let logging = LoggingSystem::init(app.config().log_level, app.config().log_format)
        .context("Failed to initialize logging")?;

    app.run(&logging).await;

    logging.flush();
    Ok(())
}
