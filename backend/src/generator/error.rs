//! Error types for text generation

use reqwest::StatusCode;
use thiserror::Error;

/// Failure talking to the text-generation service
#[derive(Debug, Error)]
pub enum GenerationError {
    /// No API key is configured, so no request is attempted
    #[error("No API key configured for the text-generation service")]
    MissingApiKey,

    /// The service could not be reached
    #[error("Text-generation service unreachable: {0}")]
    Network(String),

    /// The service answered with a non-success status
    #[error("Text-generation service returned status {status}: {body}")]
    Status {
        /// Status code of the answer
        status: StatusCode,
        /// Response body, for the log
        body: String,
    },

    /// The answer could not be parsed or held no usable text
    #[error("Invalid text-generation response: {0}")]
    InvalidResponse(String),
}

impl From<reqwest::Error> for GenerationError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Self::InvalidResponse(err.to_string())
        } else {
            Self::Network(err.to_string())
        }
    }
}

impl From<reqwest_middleware::Error> for GenerationError {
    fn from(err: reqwest_middleware::Error) -> Self {
        match err {
            reqwest_middleware::Error::Reqwest(e) => e.into(),
            reqwest_middleware::Error::Middleware(e) => Self::Network(e.to_string()),
        }
    }
}
