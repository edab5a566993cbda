/// Password Hashing and Verification
///
/// Digests are bcrypt strings embedding their own salt and cost.

use bcrypt::{hash, verify, DEFAULT_COST};
use lazy_static::lazy_static;

use crate::error::AuthError;

lazy_static! {
    // Verified against when the account does not exist, so a miss costs the
    // same as a wrong password.
    static ref DECOY_DIGEST: Option<String> = hash("decoy-password", DEFAULT_COST).ok();
}

/// Hash a password using bcrypt
///
/// # Errors
/// Returns `HashingFailure` if the bcrypt primitive fails
pub fn hash_password(password: &str) -> Result<String, AuthError> {
    hash(password, DEFAULT_COST).map_err(|e| AuthError::HashingFailure(e.to_string()))
}

/// Verify a password against its digest
///
/// A mismatch is `Ok(false)`.
///
/// # Errors
/// Returns `HashingFailure` if the digest is not a valid bcrypt string
pub fn verify_password(password: &str, digest: &str) -> Result<bool, AuthError> {
    verify(password, digest).map_err(|e| AuthError::HashingFailure(e.to_string()))
}

/// Build the decoy digest now so no login request pays for it
///
/// Returns `false` if bcrypt could not produce one.
pub fn prepare_decoy_digest() -> bool {
    lazy_static::initialize(&DECOY_DIGEST);
    DECOY_DIGEST.is_some()
}

/// Spend one verification's worth of work without a real digest
pub fn verify_against_decoy(password: &str) {
    if let Some(digest) = DECOY_DIGEST.as_deref() {
        let _ = verify(password, digest);
    }
}
