//! Client configuration.
//!
//! Use the builder pattern to customize a [`ClientConfig`], or load one from
//! the environment with [`ClientConfig::from_env`].

use std::fmt;
use std::time::Duration;

use crate::auth::DEFAULT_TOKEN_TTL;
use crate::error::CredentialError;
use crate::sse::BoundaryPolicy;

/// Base URL of the model API. Model codes are appended to it.
pub const DEFAULT_BASE_URL: &str = "https://open.bigmodel.cn/api/paas/v3/model-api/";

/// Environment variable holding the `id.secret` API key.
pub const ENV_API_KEY: &str = "ZHIPU_API_KEY";
/// Environment variable overriding the base URL.
pub const ENV_BASE_URL: &str = "ZHIPU_BASE_URL";
/// Environment variable holding a request timeout in whole seconds.
pub const ENV_TIMEOUT_SECS: &str = "ZHIPU_TIMEOUT_SECS";

/// Configuration for [`ZhipuClient`](crate::client::ZhipuClient).
///
/// # Example
///
/// ```ignore
/// use zhipu::config::ClientConfig;
///
/// let config = ClientConfig::new("id.secret")
///     .with_base_url("http://localhost:8080/")
///     .with_timeout(Duration::from_secs(60));
/// ```
#[derive(Clone)]
pub struct ClientConfig {
    /// Composite `id.secret` API key
    pub api_key: String,
    /// Base URL, model code and suffix are appended
    pub base_url: String,
    /// Validity of each minted bearer token
    pub token_ttl: Duration,
    /// Overall request timeout; `None` waits indefinitely
    pub timeout: Option<Duration>,
    /// How streamed events are delimited
    pub stream_boundary: BoundaryPolicy,
}

impl ClientConfig {
    /// Create a config with default values for everything but the key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            token_ttl: DEFAULT_TOKEN_TTL,
            timeout: None,
            stream_boundary: BoundaryPolicy::default(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_token_ttl(mut self, ttl: Duration) -> Self {
        self.token_ttl = ttl;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn with_stream_boundary(mut self, boundary: BoundaryPolicy) -> Self {
        self.stream_boundary = boundary;
        self
    }

    /// Load config from `ZHIPU_API_KEY`, `ZHIPU_BASE_URL` and
    /// `ZHIPU_TIMEOUT_SECS`.
    ///
    /// Only the API key is required. An unparsable timeout is ignored with a
    /// warning.
    pub fn from_env() -> Result<Self, CredentialError> {
        let api_key = std::env::var(ENV_API_KEY).unwrap_or_default();
        if api_key.trim().is_empty() {
            return Err(CredentialError::Empty);
        }

        let mut config = Self::new(api_key.trim());

        if let Ok(base_url) = std::env::var(ENV_BASE_URL) {
            if !base_url.trim().is_empty() {
                config = config.with_base_url(base_url.trim());
            }
        }

        if let Ok(raw) = std::env::var(ENV_TIMEOUT_SECS) {
            match raw.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => config = config.with_timeout(Duration::from_secs(secs)),
                _ => tracing::warn!(value = %raw, "ignoring invalid {}", ENV_TIMEOUT_SECS),
            }
        }

        Ok(config)
    }

    /// Build the endpoint URL for `model` with the given suffix.
    ///
    /// Exactly one `/` separates the base URL from the model code.
    pub fn full_url(&self, model: &str, suffix: &str) -> String {
        format!(
            "{}/{}{}",
            self.base_url.trim_end_matches('/'),
            model.trim_start_matches('/'),
            suffix
        )
    }
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("token_ttl", &self.token_ttl)
            .field("timeout", &self.timeout)
            .field("stream_boundary", &self.stream_boundary)
            .finish()
    }
}
