//! Errors reported by the service itself.

use serde::Deserialize;
use thiserror::Error;

/// An error the service reported inside an otherwise well-formed response.
///
/// Streaming calls receive it as an in-band envelope
/// (`data: {"error":{"code":..,"message":..,"type":..}}`); synchronous calls
/// receive it as an envelope whose `success` flag is false.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("API error{}: {message}", code_label(.code))]
pub struct ApiError {
    pub code: Option<String>,
    pub message: String,
    pub error_type: Option<String>,
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    #[serde(default)]
    code: Option<serde_json::Value>,
    #[serde(default)]
    message: String,
    #[serde(default, rename = "type")]
    error_type: Option<String>,
}

impl ApiError {
    /// Build an error from a code and message.
    pub fn new(code: Option<String>, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            error_type: None,
        }
    }

    /// Parse an `{"error": {...}}` envelope.
    ///
    /// The service sends `code` as either a string or a number; both are
    /// kept as text.
    pub fn from_envelope(body: &[u8]) -> Result<Self, serde_json::Error> {
        let envelope: ErrorEnvelope = serde_json::from_slice(body)?;
        let code = match envelope.error.code {
            None | Some(serde_json::Value::Null) => None,
            Some(serde_json::Value::String(s)) => Some(s),
            Some(other) => Some(other.to_string()),
        };
        Ok(Self {
            code,
            message: envelope.error.message,
            error_type: envelope.error.error_type,
        })
    }
}

fn code_label(code: &Option<String>) -> String {
    code.as_ref()
        .map(|code| format!(" [{code}]"))
        .unwrap_or_default()
}
