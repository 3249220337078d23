//! Bearer token minting.
//!
//! The provider expects an HS256 JWT whose header carries an extra
//! `sign_type` marker. `jsonwebtoken::Header` has no slot for it, so the
//! header and claims are encoded here and only the signature is delegated
//! to `jsonwebtoken::crypto::sign`.

use std::time::Duration;

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use jsonwebtoken::{Algorithm, EncodingKey};
use serde::{Deserialize, Serialize};

use crate::error::CredentialError;

/// Validity window applied when the caller passes a zero duration.
pub const DEFAULT_TOKEN_TTL: Duration = Duration::from_secs(60 * 60);

const TOKEN_HEADER: &str = r#"{"alg":"HS256","sign_type":"SIGN","typ":"JWT"}"#;

/// Claims carried by a minted token. Times are Unix seconds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaims {
    pub api_key: String,
    pub exp: i64,
    pub timestamp: i64,
}

/// Split a composite `id.secret` credential.
///
/// Only the first `.` separates; the secret may itself contain dots.
fn split_api_key(api_key: &str) -> Result<(&str, &str), CredentialError> {
    if api_key.is_empty() {
        return Err(CredentialError::Empty);
    }
    let (id, secret) = api_key
        .split_once('.')
        .ok_or(CredentialError::MissingSeparator)?;
    if id.is_empty() {
        return Err(CredentialError::EmptyPart { part: "id" });
    }
    if secret.is_empty() {
        return Err(CredentialError::EmptyPart { part: "secret" });
    }
    Ok((id, secret))
}

/// Mint a signed bearer token valid for `ttl` from now.
///
/// A zero `ttl` uses [`DEFAULT_TOKEN_TTL`].
pub fn mint_token(api_key: &str, ttl: Duration) -> Result<String, CredentialError> {
    let (id, secret) = split_api_key(api_key)?;
    let ttl = if ttl.is_zero() { DEFAULT_TOKEN_TTL } else { ttl };

    let now = chrono::Utc::now().timestamp();
    let ttl_secs = i64::try_from(ttl.as_secs()).unwrap_or(i64::MAX);
    let claims = TokenClaims {
        api_key: id.to_string(),
        exp: now.saturating_add(ttl_secs),
        timestamp: now,
    };

    let payload = serde_json::to_vec(&claims).map_err(|e| CredentialError::Signing {
        message: e.to_string(),
    })?;

    let signing_input = format!(
        "{}.{}",
        URL_SAFE_NO_PAD.encode(TOKEN_HEADER),
        URL_SAFE_NO_PAD.encode(payload)
    );
    let signature = jsonwebtoken::crypto::sign(
        signing_input.as_bytes(),
        &EncodingKey::from_secret(secret.as_bytes()),
        Algorithm::HS256,
    )
    .map_err(|e| CredentialError::Signing {
        message: e.to_string(),
    })?;

    tracing::debug!(exp = claims.exp, "minted bearer token");
    Ok(format!("{}.{}", signing_input, signature))
}
