//! Prelude module for convenient imports.
//!
//! ```ignore
//! use zhipu::prelude::*;
//! ```

// Client
pub use crate::client::{ChatCompletionStream, ZhipuClient};
pub use crate::config::ClientConfig;

// Model types
pub use crate::models::{
    ChatCompletionRequest, ChatCompletionResponse, ChatDelta, ChatMessage, GLM_LITE, GLM_PRO,
    GLM_STD,
};

// Errors
pub use crate::error::{StreamError, ZhipuError, ZhipuResult};

// Transport seam
pub use crate::traits::HttpClient;
