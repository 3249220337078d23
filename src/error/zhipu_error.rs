//! Unified error type for the SDK.

use thiserror::Error;

use super::api::ApiError;
use super::category::ErrorCategory;
use super::credential::CredentialError;
use super::stream::{ProtocolError, StreamError};
use super::transport::TransportError;

/// Any error a client call can return.
#[derive(Debug, Error)]
pub enum ZhipuError {
    /// Bad API credential, raised before any request is sent.
    #[error(transparent)]
    Credential(#[from] CredentialError),

    /// HTTP transport failure.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// Error while decoding an event stream.
    #[error(transparent)]
    Stream(#[from] StreamError),

    /// Error reported by the service.
    #[error(transparent)]
    Api(#[from] ApiError),

    /// A response body did not match the expected JSON shape.
    #[error("invalid JSON response: {0}")]
    Json(#[from] serde_json::Error),
}

impl ZhipuError {
    /// Get the category of this error.
    pub fn category(&self) -> ErrorCategory {
        match self {
            ZhipuError::Credential(_) => ErrorCategory::Credential,
            ZhipuError::Transport(err) => transport_category(err),
            ZhipuError::Stream(err) => match err {
                StreamError::Exhausted => ErrorCategory::EndOfStream,
                StreamError::Transport(err) => transport_category(err),
                StreamError::Protocol(_) | StreamError::MalformedErrorEnvelope { .. } => {
                    ErrorCategory::Protocol
                }
                StreamError::Api(_) => ErrorCategory::Api,
            },
            ZhipuError::Api(_) => ErrorCategory::Api,
            ZhipuError::Json(_) => ErrorCategory::Protocol,
        }
    }

    /// Check if this error is retryable.
    pub fn is_retryable(&self) -> bool {
        match self {
            ZhipuError::Transport(err) => err.is_retryable(),
            ZhipuError::Stream(err) => err.is_retryable(),
            _ => false,
        }
    }

    /// Short error code for logging.
    pub fn error_code(&self) -> &'static str {
        match self {
            ZhipuError::Credential(err) => err.error_code(),
            ZhipuError::Transport(err) => err.error_code(),
            ZhipuError::Stream(err) => err.error_code(),
            ZhipuError::Api(_) => "E_API",
            ZhipuError::Json(_) => "E_JSON",
        }
    }
}

fn transport_category(err: &TransportError) -> ErrorCategory {
    match err {
        TransportError::ServerError { .. } => ErrorCategory::Server,
        _ => ErrorCategory::Network,
    }
}

impl From<ProtocolError> for ZhipuError {
    fn from(err: ProtocolError) -> Self {
        ZhipuError::Stream(StreamError::Protocol(err))
    }
}
