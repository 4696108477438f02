use crate::domain::ShipperError;
use crate::domain::envelope::require_non_blank;
use std::fmt;
use url::Url;

/// Everything a single send needs to authenticate and address the request.
///
/// Passed per call and never stored by the shipper.
#[derive(Clone)]
pub struct ShipperCredentials {
    pub api_key: String,
    pub bearer_token: String,
    pub application_name: String,
    pub subsystem_name: String,
    pub endpoint: String,
}

impl ShipperCredentials {
    pub fn new(
        api_key: impl Into<String>,
        bearer_token: impl Into<String>,
        application_name: impl Into<String>,
        subsystem_name: impl Into<String>,
        endpoint: impl Into<String>,
    ) -> Self {
        Self {
            api_key: api_key.into(),
            bearer_token: bearer_token.into(),
            application_name: application_name.into(),
            subsystem_name: subsystem_name.into(),
            endpoint: endpoint.into(),
        }
    }

    /// Checks every field and returns the parsed endpoint.
    pub fn validate(&self) -> Result<Url, ShipperError> {
        require_non_blank("ApiKey", self.api_key.clone())?;
        require_non_blank("BearerToken", self.bearer_token.clone())?;
        require_non_blank("ApplicationName", self.application_name.clone())?;
        require_non_blank("SubsystemName", self.subsystem_name.clone())?;
        let endpoint = require_non_blank("LogsV1APIEndpoint", self.endpoint.clone())?;

        let url = Url::parse(endpoint.trim()).map_err(|e| {
            ShipperError::configuration(format!("Invalid endpoint URL '{endpoint}': {e}"))
        })?;

        match url.scheme() {
            "http" | "https" => Ok(url),
            other => Err(ShipperError::configuration(format!(
                "Unsupported endpoint scheme '{other}', expected http or https"
            ))),
        }
    }
}

impl fmt::Debug for ShipperCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ShipperCredentials")
            .field("api_key", &"<redacted>")
            .field("bearer_token", &"<redacted>")
            .field("application_name", &"<redacted>")
            .field("subsystem_name", &"<redacted>")
            .field("endpoint", &self.endpoint)
            .finish()
    }
}
