//! Error handling for the SDK.
//!
//! Each concern has its own error enum; [`ZhipuError`] unifies them for the
//! client API.
//!
//! | Type | Raised by | Retryable |
//! |------|-----------|-----------|
//! | [`CredentialError`] | token minting, before any request | No |
//! | [`TransportError`] | the HTTP client | Connection, timeout, 429/5xx |
//! | [`ProtocolError`] | the event field parser | No |
//! | [`ApiError`] | the service, in-band or in the response envelope | No |
//! | [`StreamError`] | `receive()` on an open stream | Only transport failures |
//!
//! Metadata that fails to decode is not an error: the event is still
//! delivered with empty metadata and a warning is logged.

mod api;
mod category;
mod credential;
mod result;
mod stream;
mod transport;
mod zhipu_error;

pub use api::ApiError;
pub use category::ErrorCategory;
pub use credential::CredentialError;
pub use result::ZhipuResult;
pub use stream::{ProtocolError, StreamError};
pub use transport::{classify_reqwest_error, TransportError};
pub use zhipu_error::ZhipuError;
