//! Error category classification.
//!
//! Categories group the SDK's error variants so callers can decide between
//! retrying, fixing their credentials, or treating the condition as a normal
//! end of a stream.

use std::fmt;

/// High-level classification of an SDK error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Malformed or missing API credential. Raised before any network activity.
    Credential,

    /// Connection, read or timeout failure of the HTTP transport.
    Network,

    /// Non-2xx HTTP status returned by the service.
    Server,

    /// The event stream violated the wire protocol.
    Protocol,

    /// The service reported an error inside a well-formed response.
    Api,

    /// The stream finished normally. Not a failure.
    EndOfStream,
}

impl ErrorCategory {
    /// Returns true if errors in this category are generally transient.
    pub fn is_retryable(&self) -> bool {
        matches!(self, ErrorCategory::Network | ErrorCategory::Server)
    }

    /// Short label suitable for structured logging.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCategory::Credential => "credential",
            ErrorCategory::Network => "network",
            ErrorCategory::Server => "server",
            ErrorCategory::Protocol => "protocol",
            ErrorCategory::Api => "api",
            ErrorCategory::EndOfStream => "end_of_stream",
        }
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
