//! Decode-only inspection of backend-issued access tokens
//!
//! The client never holds the signing secret, so tokens are decoded without
//! signature verification and only inspected for their subject and validity
//! window (e.g. when judging whether a persisted session is still usable).
//! Verification is the backend's job on every request that carries the
//! token.

use chrono::Utc;
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use common::error::{BackendError, BackendResult};

/// Claims carried by a backend access token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject id of the authenticated user
    pub sub: Uuid,
    /// Expiration time (unix seconds)
    pub exp: i64,
    /// Issued at time
    #[serde(default)]
    pub iat: Option<i64>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
}

impl Claims {
    /// Whether the token expires within `leeway_secs` from now
    pub fn is_expired(&self, leeway_secs: i64) -> bool {
        self.exp <= Utc::now().timestamp() + leeway_secs
    }
}

/// Decode the claims of an access token without verifying its signature
pub fn decode_claims(token: &str) -> BackendResult<Claims> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.insecure_disable_signature_validation();
    validation.validate_exp = false;
    validation.validate_aud = false;

    let data = decode::<Claims>(token, &DecodingKey::from_secret(&[]), &validation)
        .map_err(|err| BackendError::Token(err.to_string()))?;
    Ok(data.claims)
}
