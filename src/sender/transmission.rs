use super::client::{ClientConfig, build_client};
use super::credentials::ShipperCredentials;
use super::serialization::{JSON_CONTENT_TYPE, serialize_envelope};
use crate::domain::{LogBatchEnvelope, LogEntry, ShipperError};
use reqwest::Client;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue};
use std::fmt;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};
use uuid::Uuid;

pub const APPLICATION_NAME_HEADER: &str = "cx-application-name";
pub const SUBSYSTEM_NAME_HEADER: &str = "cx-subsystem-name";

/// How a non-2xx response should be read by the caller. Nothing here retries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    /// 4xx other than 408/429, e.g. bad credentials.
    Permanent,
    /// 5xx, 408 and 429.
    Transient,
    /// Informational or redirect status that reqwest did not follow.
    Unexpected,
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rejection::Permanent => f.write_str("permanent"),
            Rejection::Transient => f.write_str("transient"),
            Rejection::Unexpected => f.write_str("unexpected"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct DeliveryResult {
    pub success: bool,
    pub status_code: u16,
    pub latency: Duration,
    /// Local correlation id, only ever written to our own logs.
    pub batch_id: String,
}

impl DeliveryResult {
    pub fn rejection(&self) -> Option<Rejection> {
        if self.success {
            return None;
        }
        Some(match self.status_code {
            408 | 429 => Rejection::Transient,
            400..=499 => Rejection::Permanent,
            500..=599 => Rejection::Transient,
            _ => Rejection::Unexpected,
        })
    }
}

impl fmt::Display for DeliveryResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.rejection() {
            None => write!(f, "delivered (HTTP {})", self.status_code),
            Some(rejection) => write!(f, "rejected (HTTP {}, {rejection})", self.status_code),
        }
    }
}

/// Posts log batches to the ingestion endpoint.
///
/// Holds nothing but the immutable HTTP client, so one instance can serve any
/// number of concurrent sends with different credentials.
#[derive(Debug, Clone)]
pub struct LogShipper {
    client: Client,
}

impl LogShipper {
    pub fn new(config: ClientConfig) -> Result<Self, ShipperError> {
        let client = build_client(&config)?;
        Ok(Self { client })
    }

    /// Sends `entries` as one request.
    ///
    /// Validation happens before any I/O. Connection-level failures come back
    /// as [`ShipperError::Transport`]; any HTTP status is a `DeliveryResult`.
    pub async fn send(
        &self,
        credentials: &ShipperCredentials,
        entries: Vec<LogEntry>,
    ) -> Result<DeliveryResult, ShipperError> {
        let endpoint = credentials.validate()?;
        let envelope = LogBatchEnvelope::new(
            credentials.api_key.as_str(),
            credentials.application_name.as_str(),
            credentials.subsystem_name.as_str(),
            entries,
        )?;
        let headers = build_headers(credentials)?;
        let body = serialize_envelope(&envelope)?;

        let batch_id = Uuid::new_v4().to_string();
        let batch_size = envelope.len();
        let bytes_sent = body.len();

        debug!(
            batch_id = %batch_id,
            entries = batch_size,
            bytes = bytes_sent,
            "Sending log batch"
        );

        let start = Instant::now();
        let response = self
            .client
            .post(endpoint)
            .headers(headers)
            .body(body)
            .send()
            .await
            .map_err(ShipperError::Transport)?;
        let latency = start.elapsed();

        let status = response.status();
        let result = DeliveryResult {
            success: status.is_success(),
            status_code: status.as_u16(),
            latency,
            batch_id,
        };

        if result.success {
            info!(
                "Successfully sent batch {} ({} entries, {} bytes) in {:?}",
                result.batch_id, batch_size, bytes_sent, latency
            );
        } else {
            warn!(
                "Batch {} {} after {:?}",
                result.batch_id, result, latency
            );
            let body = response.text().await.unwrap_or_default();
            debug!(batch_id = %result.batch_id, response_body = %body, "Rejected batch response");
        }

        Ok(result)
    }
}

/// Builds the authentication and routing headers for one request.
pub fn build_headers(credentials: &ShipperCredentials) -> Result<HeaderMap, ShipperError> {
    let mut headers = HeaderMap::new();

    headers.insert(CONTENT_TYPE, HeaderValue::from_static(JSON_CONTENT_TYPE));

    let mut authorization = header_value("Authorization", &credentials.bearer_token)?;
    authorization.set_sensitive(true);
    headers.insert(AUTHORIZATION, authorization);

    headers.insert(
        HeaderName::from_static(APPLICATION_NAME_HEADER),
        header_value("CX-Application-Name", &credentials.application_name)?,
    );
    headers.insert(
        HeaderName::from_static(SUBSYSTEM_NAME_HEADER),
        header_value("CX-Subsystem-Name", &credentials.subsystem_name)?,
    );

    Ok(headers)
}

// The error deliberately omits the value: it may be a token.
fn header_value(name: &str, value: &str) -> Result<HeaderValue, ShipperError> {
    HeaderValue::from_str(value)
        .map_err(|_| ShipperError::configuration(format!("Invalid header value for {name}")))
}
