use crate::domain::ShipperError;
use reqwest::{Client, ClientBuilder};
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub timeout: Duration,
    pub connection_timeout: Duration,
    pub max_connections: usize,
    pub keep_alive_timeout: Duration,
    pub user_agent: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            connection_timeout: Duration::from_secs(10),
            max_connections: 4,
            keep_alive_timeout: Duration::from_secs(60),
            user_agent: format!("cx-log-shipper/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl ClientConfig {
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Builds the pooled HTTP client shared by every send of one shipper.
pub fn build_client(config: &ClientConfig) -> Result<Client, ShipperError> {
    ClientBuilder::new()
        .timeout(config.timeout)
        .connect_timeout(config.connection_timeout)
        .pool_max_idle_per_host(config.max_connections)
        .pool_idle_timeout(config.keep_alive_timeout)
        .user_agent(&config.user_agent)
        .build()
        .map_err(|e| ShipperError::configuration(format!("Failed to build HTTP client: {e}")))
}
