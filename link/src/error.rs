//! Error types for ksql-link.
//!
//! Errors fall into the categories a push query can end with: the connection
//! could not be established, the server rejected the statement, or the
//! response stream could not be understood. Caller-initiated cancellation is
//! not an error and never shows up here.

use thiserror::Error;

use crate::models::ServerErrorBody;

/// Result alias used across the crate.
pub type Result<T> = std::result::Result<T, KsqlLinkError>;

/// Errors returned by [`crate::KsqlLinkClient`] operations.
#[derive(Debug, Error)]
pub enum KsqlLinkError {
    /// Invalid client configuration (base URL, TLS policy, HTTP client build).
    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    /// The transport could not be established or was lost.
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// Non-2xx response whose body was not a recognizable engine error.
    #[error("Server error ({status_code}): {message}")]
    ServerError { status_code: u16, message: String },

    /// The engine rejected the statement (invalid SQL, unknown source, ...).
    #[error("Query error ({error_code}): {message}")]
    QueryError { error_code: i64, message: String },

    /// The response stream did not follow the expected framing.
    #[error("Protocol error: {0}")]
    ProtocolError(String),

    /// JSON (de)serialization failure.
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// A request or stream read exceeded its configured timeout.
    #[error("Timeout: {0}")]
    TimeoutError(String),
}

impl KsqlLinkError {
    /// True for transport failures: the connection could not be
    /// established, was lost, or went silent past a configured timeout
    /// (including the push idle timeout, which can fire mid-stream).
    pub fn is_connection_error(&self) -> bool {
        matches!(self, Self::ConnectionError(_) | Self::TimeoutError(_))
    }

    /// True when the engine itself reported the failure.
    pub fn is_query_error(&self) -> bool {
        matches!(self, Self::QueryError { .. } | Self::ServerError { .. })
    }

    /// Error for a non-2xx response: the engine's error entity when the body
    /// carries one, the raw body otherwise.
    pub(crate) fn from_response_body(status_code: u16, body: &str) -> Self {
        let parsed = serde_json::from_str::<serde_json::Value>(body)
            .ok()
            .and_then(|v| ServerErrorBody::from_json(&v));
        match parsed {
            Some(err) => Self::QueryError {
                error_code: err.error_code,
                message: err.message,
            },
            None => Self::ServerError {
                status_code,
                message: body.to_string(),
            },
        }
    }
}

impl From<reqwest::Error> for KsqlLinkError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::TimeoutError(err.to_string())
        } else if err.is_decode() {
            Self::SerializationError(err.to_string())
        } else {
            Self::ConnectionError(err.to_string())
        }
    }
}

impl From<std::io::Error> for KsqlLinkError {
    fn from(err: std::io::Error) -> Self {
        if err.kind() == std::io::ErrorKind::TimedOut {
            Self::TimeoutError(err.to_string())
        } else {
            Self::ConnectionError(err.to_string())
        }
    }
}

impl From<serde_json::Error> for KsqlLinkError {
    fn from(err: serde_json::Error) -> Self {
        Self::SerializationError(err.to_string())
    }
}
