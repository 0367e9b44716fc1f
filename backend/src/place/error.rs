//! Error types for place lookups

use reqwest::StatusCode;
use thiserror::Error;

/// Failure talking to the geo-search or summary service
#[derive(Debug, Error)]
pub enum PlaceError {
    /// The service could not be reached (connect, timeout, transport)
    #[error("Place service unreachable: {0}")]
    Network(String),

    /// The service answered with a non-success status
    #[error("Place service returned status {0}")]
    Status(StatusCode),

    /// The service answered with a body we could not understand
    #[error("Invalid place service response: {0}")]
    InvalidResponse(String),
}

impl PlaceError {
    /// Whether the failure happened before any response was received
    #[must_use]
    pub const fn is_network(&self) -> bool {
        matches!(self, Self::Network(_))
    }
}

impl From<reqwest::Error> for PlaceError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Self::InvalidResponse(err.to_string())
        } else if let Some(status) = err.status() {
            Self::Status(status)
        } else {
            Self::Network(err.to_string())
        }
    }
}

impl From<reqwest_middleware::Error> for PlaceError {
    fn from(err: reqwest_middleware::Error) -> Self {
        match err {
            reqwest_middleware::Error::Reqwest(e) => e.into(),
            reqwest_middleware::Error::Middleware(e) => Self::Network(e.to_string()),
        }
    }
}
