use serde::{Deserialize, Serialize};

use super::request::ChatMessage;

/// Token accounting for one call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Usage {
    #[serde(default)]
    pub prompt_tokens: u32,
    #[serde(default)]
    pub completion_tokens: u32,
    #[serde(default)]
    pub total_tokens: u32,
}

/// Envelope of a synchronous invocation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChatCompletionResponse {
    pub code: i64,
    #[serde(default)]
    pub msg: String,
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub data: ResponseData,
}

/// Payload of [`ChatCompletionResponse`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResponseData {
    #[serde(default)]
    pub request_id: String,
    #[serde(default)]
    pub task_id: String,
    #[serde(default)]
    pub task_status: String,
    #[serde(default)]
    pub choices: Vec<ChatMessage>,
    #[serde(default)]
    pub usage: Usage,
}

impl ChatCompletionResponse {
    /// Concatenated content of every returned choice.
    pub fn content(&self) -> String {
        self.data
            .choices
            .iter()
            .map(|choice| choice.content.as_str())
            .collect()
    }
}
