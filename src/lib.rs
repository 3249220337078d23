//! Zhipu - a client SDK for the ChatGLM model API.
//!
//! The synchronous `invoke` endpoint returns one JSON envelope; the
//! `sse-invoke` endpoint streams chat deltas as server-sent events, which
//! [`sse::StreamDecoder`] turns back into [`ChatDelta`] values.

pub mod adapters;
pub mod auth;
pub mod cli;
pub mod client;
pub mod config;
pub mod error;
pub mod models;
pub mod prelude;
pub mod sse;
pub mod traits;

pub use auth::{mint_token, TokenClaims, DEFAULT_TOKEN_TTL};
pub use client::{collect_content, ChatCompletionStream, ZhipuClient};
pub use config::{ClientConfig, DEFAULT_BASE_URL};
pub use error::{
    ApiError, CredentialError, ErrorCategory, ProtocolError, StreamError, TransportError,
    ZhipuError, ZhipuResult,
};
pub use models::{
    ChatCompletionRequest, ChatCompletionResponse, ChatDelta, ChatMessage, StreamMeta, Usage,
    GLM_6B, GLM_LITE, GLM_PRO, GLM_STD,
};
pub use sse::{BoundaryPolicy, StreamDecoder};
