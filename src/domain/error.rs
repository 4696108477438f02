use thiserror::Error;

/// Errors raised by a single send.
///
/// Rejections by the remote service are not errors; they come back as a
/// `DeliveryResult` with `success == false`.
#[derive(Error, Debug)]
pub enum ShipperError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Transport error: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Configuration,
    Transport,
    Serialization,
}

impl ShipperError {
    pub fn configuration(message: impl Into<String>) -> Self {
        ShipperError::Configuration(message.into())
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            ShipperError::Configuration(_) => ErrorKind::Configuration,
            ShipperError::Transport(_) => ErrorKind::Transport,
            ShipperError::Serialization(_) => ErrorKind::Serialization,
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, ShipperError::Transport(e) if e.is_timeout())
    }
}
