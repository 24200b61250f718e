//! Error types for the client application.

use std::time::Duration;

use thiserror::Error;
use todo_core::ApiError;

/// Failure to complete an HTTP round-trip at all (no response to interpret).
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("connection failed: {0}")]
    Connect(String),

    #[error("request timed out")]
    Timeout,

    #[error("request failed: {0}")]
    Other(String),
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            TransportError::Timeout
        } else if err.is_connect() {
            TransportError::Connect(err.to_string())
        } else {
            TransportError::Other(err.to_string())
        }
    }
}

/// Error surfaced by every `TodoApi` operation.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Network failure: no response was received.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The request did not finish within its deadline.
    #[error("no response within {0:?}")]
    Timeout(Duration),

    /// A response arrived but was a non-2xx status or could not be decoded.
    #[error(transparent)]
    Api(#[from] ApiError),
}

/// Errors raised while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read environment: {0}")]
    Env(#[from] envy::Error),

    #[error("invalid configuration: {0}")]
    Invalid(String),
}
