use serde::{Deserialize, Serialize};

/// Role of the system prompt author.
pub const ROLE_SYSTEM: &str = "system";
/// Role of the human participant.
pub const ROLE_USER: &str = "user";
/// Role of the model.
pub const ROLE_ASSISTANT: &str = "assistant";

/// ChatGLM Pro.
pub const GLM_PRO: &str = "chatglm_pro";
/// ChatGLM Standard.
pub const GLM_STD: &str = "chatglm_std";
/// ChatGLM Lite.
pub const GLM_LITE: &str = "chatglm_lite";
/// ChatGLM 6B.
pub const GLM_6B: &str = "chatglm_6b";

/// Endpoint suffix for a synchronous invocation.
pub const INVOKE_SUFFIX: &str = "/invoke";
/// Endpoint suffix for a streaming (SSE) invocation.
pub const SSE_INVOKE_SUFFIX: &str = "/sse-invoke";

/// One turn of a conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn new(role: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            role: role.into(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(ROLE_USER, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(ROLE_ASSISTANT, content)
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::new(ROLE_SYSTEM, content)
    }
}

/// Request body for both the synchronous and the streaming endpoint.
///
/// The model code is not part of the body; it selects the endpoint URL.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatCompletionRequest {
    #[serde(skip)]
    pub model: String,
    /// Conversation so far, oldest first.
    pub prompt: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f32>,
    /// Caller-chosen id echoed back by the service.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
    /// Streaming only: `true` sends each delta, `false` resends the full
    /// text so far on every event.
    pub incremental: bool,
}

impl ChatCompletionRequest {
    /// Create an incremental request for `model`.
    pub fn new(model: impl Into<String>, prompt: Vec<ChatMessage>) -> Self {
        Self {
            model: model.into(),
            prompt,
            temperature: None,
            top_p: None,
            request_id: None,
            incremental: true,
        }
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn with_top_p(mut self, top_p: f32) -> Self {
        self.top_p = Some(top_p);
        self
    }

    pub fn with_request_id(mut self, request_id: impl Into<String>) -> Self {
        self.request_id = Some(request_id.into());
        self
    }

    pub fn with_incremental(mut self, incremental: bool) -> Self {
        self.incremental = incremental;
        self
    }
}
