/// JWT Claims structure
///
/// Access tokens carry only the registered claims `iss`, `sub`, `iat` and
/// `exp`. `iss` and `sub` are optional on decode so that their absence is
/// reported as an issuer or subject failure rather than a parse failure.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AuthError;

/// Issuer stamped into every access token
pub const ISSUER: &str = "chirpy-access";

/// JWT Claims for access tokens
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Claims {
    /// Issuer
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iss: Option<String>,
    /// Subject (user ID as UUID string)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub: Option<String>,
    /// Issued at (Unix timestamp)
    #[serde(default)]
    pub iat: i64,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
}

impl Claims {
    /// Create claims for `user_id`, issued at `now` and living for `ttl`
    pub fn new(user_id: Uuid, ttl: Duration, now: DateTime<Utc>) -> Self {
        let issued_at = now.timestamp();
        Self {
            iss: Some(ISSUER.to_string()),
            sub: Some(user_id.to_string()),
            iat: issued_at,
            exp: issued_at + ttl.num_seconds(),
        }
    }

    /// Extract user ID from claims
    ///
    /// # Errors
    /// Returns `InvalidSubject` if the subject is missing or not a UUID
    pub fn user_id(&self) -> Result<Uuid, AuthError> {
        self.sub
            .as_deref()
            .and_then(|sub| Uuid::parse_str(sub).ok())
            .ok_or(AuthError::InvalidSubject)
    }

    /// A token is expired from the `exp` second onwards, with no leeway
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now.timestamp() >= self.exp
    }

    pub fn has_expected_issuer(&self) -> bool {
        self.iss.as_deref() == Some(ISSUER)
    }
}
