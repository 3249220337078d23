//! Streaming error types.
//!
//! Everything [`StreamDecoder::receive`](crate::sse::StreamDecoder::receive)
//! can fail with, including the expected end-of-stream signal.

use thiserror::Error;

use super::api::ApiError;
use super::transport::TransportError;

/// Violation of the line protocol detected by the field parser.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProtocolError {
    /// A field line was empty. Blank lines are event boundaries and must
    /// be handled before field parsing.
    #[error("event line was empty")]
    EmptyLine,
}

/// Error returned from a stream receive call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StreamError {
    /// The stream is finished. Every later call returns this again without
    /// touching the transport.
    #[error("stream exhausted")]
    Exhausted,

    /// Reading from the connection failed.
    #[error("stream transport failed: {0}")]
    Transport(#[from] TransportError),

    /// The server sent something the field parser rejects.
    #[error("stream protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    /// The server sent an in-band error envelope.
    #[error("{0}")]
    Api(#[from] ApiError),

    /// An error envelope started but its body was not valid JSON.
    #[error("malformed error envelope: {body}")]
    MalformedErrorEnvelope { body: String },
}

impl StreamError {
    /// True for the normal end-of-stream signal.
    pub fn is_end_of_stream(&self) -> bool {
        matches!(self, StreamError::Exhausted)
    }

    /// Check if reopening the stream might succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            StreamError::Transport(err) => err.is_retryable(),
            _ => false,
        }
    }

    /// Short error code for logging.
    pub fn error_code(&self) -> &'static str {
        match self {
            StreamError::Exhausted => "E_STREAM_EOF",
            StreamError::Transport(err) => err.error_code(),
            StreamError::Protocol(_) => "E_STREAM_PROTOCOL",
            StreamError::Api(_) => "E_STREAM_API",
            StreamError::MalformedErrorEnvelope { .. } => "E_STREAM_ENVELOPE",
        }
    }
}
