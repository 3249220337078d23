//! Transport error types.
//!
//! Failures of the HTTP collaborator. The SDK never retries these itself;
//! retry policy belongs to the caller or the HTTP client.

use thiserror::Error;

/// HTTP transport failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// Connection could not be established.
    #[error("connection failed: {0}")]
    ConnectionFailed(String),

    /// The request or a body read timed out.
    #[error("request timeout: {0}")]
    Timeout(String),

    /// The server answered with a non-2xx status.
    #[error("server error ({status}): {message}")]
    ServerError { status: u16, message: String },

    /// The request was cancelled by the caller.
    #[error("request cancelled")]
    Cancelled,

    /// Reading the response body failed.
    #[error("IO error: {0}")]
    Io(String),

    /// The request URL could not be built.
    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    /// Any other transport failure.
    #[error("HTTP error: {0}")]
    Other(String),
}

impl TransportError {
    /// Check if this error is likely transient.
    pub fn is_retryable(&self) -> bool {
        match self {
            TransportError::ConnectionFailed(_)
            | TransportError::Timeout(_)
            | TransportError::Io(_) => true,
            TransportError::ServerError { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }

    /// Short error code for logging.
    pub fn error_code(&self) -> &'static str {
        match self {
            TransportError::ConnectionFailed(_) => "E_NET_CONN",
            TransportError::Timeout(_) => "E_NET_TIMEOUT",
            TransportError::ServerError { .. } => "E_NET_STATUS",
            TransportError::Cancelled => "E_NET_CANCEL",
            TransportError::Io(_) => "E_NET_IO",
            TransportError::InvalidUrl(_) => "E_NET_URL",
            TransportError::Other(_) => "E_NET_OTHER",
        }
    }
}

/// Classify a reqwest error into a [`TransportError`].
pub fn classify_reqwest_error(err: &reqwest::Error) -> TransportError {
    if err.is_timeout() {
        TransportError::Timeout(err.to_string())
    } else if err.is_connect() {
        TransportError::ConnectionFailed(err.to_string())
    } else if err.is_builder() {
        TransportError::InvalidUrl(err.to_string())
    } else if err.is_body() || err.is_decode() {
        TransportError::Io(err.to_string())
    } else if let Some(status) = err.status() {
        TransportError::ServerError {
            status: status.as_u16(),
            message: err.to_string(),
        }
    } else {
        TransportError::Other(err.to_string())
    }
}
