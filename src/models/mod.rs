//! Request and response shapes of the chat API.

mod request;
mod response;
mod stream;

pub use request::{
    ChatCompletionRequest, ChatMessage, GLM_6B, GLM_LITE, GLM_PRO, GLM_STD, INVOKE_SUFFIX,
    ROLE_ASSISTANT, ROLE_SYSTEM, ROLE_USER, SSE_INVOKE_SUFFIX,
};
pub use response::{ChatCompletionResponse, ResponseData, Usage};
pub use stream::{ChatDelta, StreamChoice, StreamDelta, StreamMeta, FINISH_EVENT};
