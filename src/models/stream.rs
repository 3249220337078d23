use serde::{Deserialize, Serialize};

use super::response::Usage;

/// Event name that marks the last event of a stream.
pub const FINISH_EVENT: &str = "finish";

/// Metadata carried by the `meta:` field, normally only on the last event.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamMeta {
    #[serde(default)]
    pub task_status: Option<String>,
    #[serde(default)]
    pub usage: Usage,
    #[serde(default)]
    pub task_id: Option<String>,
    #[serde(default)]
    pub request_id: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamDelta {
    pub content: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamChoice {
    pub delta: StreamDelta,
}

/// One decoded event of a chat completion stream.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatDelta {
    pub id: String,
    /// Event name, e.g. `add`, `error`, `interrupted` or `finish`.
    pub event: String,
    /// The raw data payload of the event.
    pub data: String,
    pub choices: Vec<StreamChoice>,
    pub meta: StreamMeta,
}

impl ChatDelta {
    /// Map the decoded event fields onto the chat shape.
    pub fn from_parts(id: String, event: String, data: String, meta: StreamMeta) -> Self {
        let choices = vec![StreamChoice {
            delta: StreamDelta {
                content: data.clone(),
            },
        }];
        Self {
            id,
            event,
            data,
            choices,
            meta,
        }
    }

    /// Concatenated content of every choice.
    pub fn content(&self) -> String {
        self.choices
            .iter()
            .map(|choice| choice.delta.content.as_str())
            .collect()
    }

    /// True if this is the last event of the stream.
    pub fn is_finish(&self) -> bool {
        self.event == FINISH_EVENT
    }
}
