//! Common test utilities for integration tests.
//!
//! # Example
//!
//! ```ignore
//! mod common;
//! use common::{client_for, sse_body};
//!
//! let server = wiremock::MockServer::start().await;
//! let client = client_for(&server.uri());
//! ```

pub mod mocks;

#[allow(unused_imports)]
pub use mocks::*;

use zhipu::{ChatCompletionRequest, ChatMessage, ClientConfig, ZhipuClient};

/// API key used by every test. The secret half signs the bearer token.
pub const TEST_API_KEY: &str = "test-id.test-secret";

/// Secret half of [`TEST_API_KEY`].
#[allow(dead_code)]
pub const TEST_SECRET: &str = "test-secret";

/// Builds a reqwest-backed client pointed at `base_url`.
#[allow(dead_code)]
pub fn client_for(base_url: &str) -> ZhipuClient {
    let config = ClientConfig::new(TEST_API_KEY).with_base_url(base_url);
    ZhipuClient::new(config).expect("client should build")
}

/// A single-turn request for `model`.
#[allow(dead_code)]
pub fn chat_request(model: &str) -> ChatCompletionRequest {
    ChatCompletionRequest::new(model, vec![ChatMessage::user("你好")])
}

/// Renders `(event, id, data)` triples as a blank-line separated body.
#[allow(dead_code)]
pub fn sse_body(events: &[(&str, &str, &str)]) -> String {
    events
        .iter()
        .map(|(event, id, data)| format!("event: {}\nid: {}\ndata: {}\n\n", event, id, data))
        .collect()
}
