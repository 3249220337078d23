//! HTTP client trait abstraction.
//!
//! The SDK only needs two operations from its transport: a buffered POST
//! for synchronous invocations and a streaming POST for event streams.
//! Keeping them behind a trait lets tests substitute canned responses.

use async_trait::async_trait;
use bytes::Bytes;
use futures::Stream;
use std::collections::HashMap;
use std::pin::Pin;

use crate::error::TransportError;

/// HTTP headers represented as a key-value map.
pub type Headers = HashMap<String, String>;

/// Body of a streaming response, read chunk by chunk.
pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes, TransportError>> + Send>>;

/// Buffered HTTP response.
#[derive(Debug, Clone)]
pub struct Response {
    pub status: u16,
    pub headers: Headers,
    pub body: Bytes,
}

impl Response {
    pub fn new(status: u16, body: Bytes) -> Self {
        Self {
            status,
            headers: HashMap::new(),
            body,
        }
    }

    pub fn with_headers(status: u16, headers: Headers, body: Bytes) -> Self {
        Self {
            status,
            headers,
            body,
        }
    }

    /// Check if the response indicates success (2xx status).
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Body as text, with invalid UTF-8 replaced.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// Parse the response body as JSON.
    pub fn json<T: serde::de::DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_slice(&self.body)
    }
}

/// Transport used by [`ZhipuClient`](crate::client::ZhipuClient).
///
/// # Example
///
/// ```ignore
/// use zhipu::traits::{Headers, HttpClient};
///
/// async fn ping<C: HttpClient>(client: &C) -> bool {
///     client
///         .post("https://example.com/ping", "{}", &Headers::new())
///         .await
///         .map(|r| r.is_success())
///         .unwrap_or(false)
/// }
/// ```
#[async_trait]
pub trait HttpClient: Send + Sync {
    /// POST `body` and buffer the whole response. Non-2xx statuses are
    /// returned as a [`Response`], not as an error.
    async fn post(&self, url: &str, body: &str, headers: &Headers)
        -> Result<Response, TransportError>;

    /// POST `body` and return the response body as a stream.
    ///
    /// A non-2xx status fails with [`TransportError::ServerError`] carrying
    /// the response text.
    async fn post_stream(
        &self,
        url: &str,
        body: &str,
        headers: &Headers,
    ) -> Result<ByteStream, TransportError>;
}
