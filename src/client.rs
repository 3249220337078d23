//! Chat completion client.
//!
//! [`ZhipuClient`] builds requests, attaches a freshly minted bearer token,
//! and hands the response to either the JSON envelope parser or the
//! [`StreamDecoder`].

use std::fmt;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use futures::future::BoxFuture;
use futures::Stream;
use std::future::Future;

use crate::adapters::ReqwestHttpClient;
use crate::auth::mint_token;
use crate::config::ClientConfig;
use crate::error::{ApiError, StreamError, TransportError, ZhipuError, ZhipuResult};
use crate::models::{
    ChatCompletionRequest, ChatCompletionResponse, ChatDelta, INVOKE_SUFFIX, SSE_INVOKE_SUFFIX,
};
use crate::sse::{BoundaryPolicy, StreamDecoder};
use crate::traits::{Headers, HttpClient};

/// Client for the chat completion endpoints.
///
/// Cloning is cheap; clones share the HTTP transport.
///
/// # Example
///
/// ```ignore
/// use zhipu::{ChatCompletionRequest, ChatMessage, ClientConfig, ZhipuClient, GLM_LITE};
///
/// let client = ZhipuClient::new(ClientConfig::from_env()?)?;
/// let request = ChatCompletionRequest::new(GLM_LITE, vec![ChatMessage::user("hello")]);
/// let mut stream = client.create_chat_completion_stream(&request).await?;
/// while let Ok(delta) = stream.recv().await {
///     print!("{}", delta.content());
/// }
/// ```
#[derive(Clone)]
pub struct ZhipuClient {
    config: ClientConfig,
    http: Arc<dyn HttpClient>,
}

impl ZhipuClient {
    /// Create a client backed by reqwest, honouring `config.timeout`.
    pub fn new(config: ClientConfig) -> ZhipuResult<Self> {
        let http = match config.timeout {
            Some(timeout) => ReqwestHttpClient::with_timeout(timeout)?,
            None => ReqwestHttpClient::new(),
        };
        Ok(Self::with_http_client(config, Arc::new(http)))
    }

    /// Create a client with a caller-supplied transport.
    pub fn with_http_client(config: ClientConfig, http: Arc<dyn HttpClient>) -> Self {
        Self { config, http }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    fn request_headers(&self, stream: bool) -> ZhipuResult<Headers> {
        let token = mint_token(&self.config.api_key, self.config.token_ttl)?;

        let mut headers = Headers::new();
        headers.insert("Authorization".to_string(), token);
        headers.insert("Content-Type".to_string(), "application/json".to_string());
        if stream {
            headers.insert("Accept".to_string(), "text/event-stream".to_string());
        }
        Ok(headers)
    }

    /// Invoke the model synchronously.
    ///
    /// An envelope with `success: false` becomes [`ZhipuError::Api`].
    pub async fn create_chat_completion(
        &self,
        request: &ChatCompletionRequest,
    ) -> ZhipuResult<ChatCompletionResponse> {
        let headers = self.request_headers(false)?;
        let url = self.config.full_url(&request.model, INVOKE_SUFFIX);
        let body = serde_json::to_string(request)?;

        tracing::debug!(model = %request.model, url = %url, "invoking model");
        let response = self.http.post(&url, &body, &headers).await?;

        if !response.is_success() {
            if let Ok(api_error) = ApiError::from_envelope(&response.body) {
                return Err(api_error.into());
            }
            return Err(TransportError::ServerError {
                status: response.status,
                message: response.text(),
            }
            .into());
        }

        let parsed: ChatCompletionResponse = response.json()?;
        if !parsed.success {
            tracing::debug!(code = parsed.code, "model invocation rejected");
            return Err(ApiError::new(Some(parsed.code.to_string()), parsed.msg).into());
        }
        Ok(parsed)
    }

    /// Invoke the model and stream the answer as events.
    pub async fn create_chat_completion_stream(
        &self,
        request: &ChatCompletionRequest,
    ) -> ZhipuResult<ChatCompletionStream> {
        let headers = self.request_headers(true)?;
        let url = self.config.full_url(&request.model, SSE_INVOKE_SUFFIX);
        let body = serde_json::to_string(request)?;

        tracing::debug!(model = %request.model, url = %url, "opening event stream");
        let stream = match self.http.post_stream(&url, &body, &headers).await {
            Ok(stream) => stream,
            Err(TransportError::ServerError { status, message }) => {
                if let Ok(api_error) = ApiError::from_envelope(message.as_bytes()) {
                    return Err(api_error.into());
                }
                return Err(TransportError::ServerError { status, message }.into());
            }
            Err(err) => return Err(err.into()),
        };

        Ok(ChatCompletionStream::new(StreamDecoder::new(
            stream,
            self.config.stream_boundary,
        )))
    }
}

impl fmt::Debug for ZhipuClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ZhipuClient")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

type PendingReceive = BoxFuture<'static, (StreamDecoder, Result<ChatDelta, StreamError>)>;

/// An open chat completion stream.
///
/// Read it with [`recv`](Self::recv) or as a [`futures::Stream`]; the
/// `Stream` impl ends where `recv` would return [`StreamError::Exhausted`].
/// Dropping the stream releases the connection.
pub struct ChatCompletionStream {
    decoder: Option<StreamDecoder>,
    pending: Option<PendingReceive>,
}

impl ChatCompletionStream {
    pub fn new(decoder: StreamDecoder) -> Self {
        Self {
            decoder: Some(decoder),
            pending: None,
        }
    }

    /// Receive the next delta. See [`StreamDecoder::receive`].
    pub async fn recv(&mut self) -> Result<ChatDelta, StreamError> {
        if let Some(pending) = self.pending.take() {
            let (decoder, result) = pending.await;
            self.decoder = Some(decoder);
            return result;
        }
        match self.decoder.as_mut() {
            Some(decoder) => decoder.receive().await,
            None => Err(StreamError::Exhausted),
        }
    }

    /// Release the connection. Later reads return `Exhausted`.
    pub fn close(&mut self) {
        self.pending = None;
        if let Some(decoder) = self.decoder.as_mut() {
            decoder.close();
        }
    }

    pub fn is_finished(&self) -> bool {
        self.pending.is_none()
            && self
                .decoder
                .as_ref()
                .map_or(true, StreamDecoder::is_finished)
    }

    pub fn boundary(&self) -> Option<BoundaryPolicy> {
        self.decoder.as_ref().map(StreamDecoder::boundary)
    }
}

impl fmt::Debug for ChatCompletionStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChatCompletionStream")
            .field("decoder", &self.decoder)
            .field("pending", &self.pending.is_some())
            .finish()
    }
}

impl Stream for ChatCompletionStream {
    type Item = Result<ChatDelta, StreamError>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();

        if this.pending.is_none() {
            let Some(mut decoder) = this.decoder.take() else {
                return Poll::Ready(None);
            };
            this.pending = Some(Box::pin(async move {
                let result = decoder.receive().await;
                (decoder, result)
            }));
        }
        let Some(pending) = this.pending.as_mut() else {
            return Poll::Ready(None);
        };

        match pending.as_mut().poll(cx) {
            Poll::Pending => Poll::Pending,
            Poll::Ready((decoder, result)) => {
                this.pending = None;
                this.decoder = Some(decoder);
                match result {
                    Err(StreamError::Exhausted) => Poll::Ready(None),
                    other => Poll::Ready(Some(other)),
                }
            }
        }
    }
}

/// Convenience for callers that only care about the final text.
///
/// Drains `stream` and concatenates the content of every delta.
pub async fn collect_content(stream: &mut ChatCompletionStream) -> Result<String, ZhipuError> {
    let mut content = String::new();
    loop {
        match stream.recv().await {
            Ok(delta) => content.push_str(&delta.content()),
            Err(StreamError::Exhausted) => return Ok(content),
            Err(err) => return Err(err.into()),
        }
    }
}
