//! Result type alias for SDK operations.

use super::zhipu_error::ZhipuError;

/// Type alias for Results using [`ZhipuError`].
pub type ZhipuResult<T> = Result<T, ZhipuError>;
