//! Credential errors.
//!
//! These are raised while minting a bearer token, before any request is
//! sent.

use thiserror::Error;

/// A malformed, empty or unusable API credential.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CredentialError {
    /// No API key was provided.
    #[error("API key is empty")]
    Empty,

    /// The key is not of the form `<id>.<secret>`.
    #[error("API key is missing the '.' separator between id and secret")]
    MissingSeparator,

    /// One side of the `<id>.<secret>` pair is empty.
    #[error("API key has an empty {part}")]
    EmptyPart { part: &'static str },

    /// The token could not be signed.
    #[error("failed to sign token: {message}")]
    Signing { message: String },
}

impl CredentialError {
    /// Short error code for logging.
    pub fn error_code(&self) -> &'static str {
        match self {
            CredentialError::Empty => "E_CRED_EMPTY",
            CredentialError::MissingSeparator => "E_CRED_FORMAT",
            CredentialError::EmptyPart { .. } => "E_CRED_PART",
            CredentialError::Signing { .. } => "E_CRED_SIGN",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        assert_eq!(CredentialError::Empty.to_string(), "API key is empty");
        assert_eq!(
            CredentialError::EmptyPart { part: "secret" }.to_string(),
            "API key has an empty secret"
        );
    }

    #[test]
    fn test_error_codes_are_distinct() {
        let codes = [
            CredentialError::Empty.error_code(),
            CredentialError::MissingSeparator.error_code(),
            CredentialError::EmptyPart { part: "id" }.error_code(),
            CredentialError::Signing {
                message: "x".to_string(),
            }
            .error_code(),
        ];
        let unique: std::collections::HashSet<_> = codes.iter().collect();
        assert_eq!(unique.len(), codes.len());
    }
}
