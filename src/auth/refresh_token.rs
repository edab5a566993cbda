/// Refresh Token Management
///
/// Refresh tokens are:
/// - 256 bits from the operating system's secure random source, hex-encoded
/// - Stored as-is and used as the record's primary key
/// - Valid for 60 days unless revoked
/// - Reused across refreshes (no rotation on use)
/// - Soft-deleted: revocation stamps `revoked_at` and keeps the row
///
/// A duplicate token string on insert is surfaced as a storage integrity
/// failure and never retried; with 256 bits of entropy it does not happen
/// in practice.

use chrono::{DateTime, Duration, Utc};
use rand::rngs::OsRng;
use rand::RngCore;
use uuid::Uuid;

use crate::error::{AppError, AuthError, DatabaseError};
use crate::store::{CredentialStore, RefreshTokenRecord};

/// Lifetime of a refresh token
pub const REFRESH_TOKEN_LIFETIME_DAYS: i64 = 60;

const REFRESH_TOKEN_BYTES: usize = 32;

/// Generate a new refresh token string
///
/// # Errors
/// Returns `EntropyFailure` if the OS random source fails. There is no
/// fallback to a weaker source.
pub fn generate_refresh_token() -> Result<String, AuthError> {
    let mut bytes = [0u8; REFRESH_TOKEN_BYTES];
    OsRng
        .try_fill_bytes(&mut bytes)
        .map_err(|e| AuthError::EntropyFailure(e.to_string()))?;
    Ok(hex::encode(bytes))
}

/// Generate a refresh token for `user_id` and persist it
///
/// # Errors
/// - `EntropyFailure` if no token could be generated
/// - `UniqueConstraintViolation` if the token string already exists
pub async fn issue_refresh_token(
    store: &dyn CredentialStore,
    user_id: Uuid,
) -> Result<RefreshTokenRecord, AppError> {
    let token = generate_refresh_token()?;
    let now = Utc::now();

    let record = RefreshTokenRecord {
        token,
        user_id,
        created_at: now,
        updated_at: now,
        expires_at: now + Duration::days(REFRESH_TOKEN_LIFETIME_DAYS),
        revoked_at: None,
    };

    let record = store.insert_refresh_token(record).await?;
    tracing::info!(user_id = %user_id, "Refresh token issued");
    Ok(record)
}

/// Check a refresh token and return its owner
///
/// # Errors
/// - `UnknownToken` if no such token exists
/// - `ExpiredToken` if the current time is at or past `expires_at`
/// - `RevokedToken` if the token has been revoked
pub async fn redeem_refresh_token(
    store: &dyn CredentialStore,
    token: &str,
) -> Result<Uuid, AppError> {
    redeem_refresh_token_at(store, token, Utc::now()).await
}

/// Check a refresh token against the clock reading `now`
pub async fn redeem_refresh_token_at(
    store: &dyn CredentialStore,
    token: &str,
    now: DateTime<Utc>,
) -> Result<Uuid, AppError> {
    let record = match store.find_refresh_token(token).await? {
        Some(record) => record,
        None => {
            tracing::warn!("Refresh token not found");
            return Err(AuthError::UnknownToken.into());
        }
    };

    if record.is_expired_at(now) {
        tracing::info!(user_id = %record.user_id, "Refresh token expired");
        return Err(AuthError::ExpiredToken.into());
    }

    if record.is_revoked() {
        tracing::warn!(user_id = %record.user_id, "Attempt to use revoked refresh token");
        return Err(AuthError::RevokedToken.into());
    }

    Ok(record.user_id)
}

/// Revoke a refresh token
///
/// Revoking an already revoked token succeeds without changing it.
///
/// # Errors
/// Returns `UnknownToken` if no such token exists
pub async fn revoke_refresh_token(store: &dyn CredentialStore, token: &str) -> Result<(), AppError> {
    let record = store
        .find_refresh_token(token)
        .await?
        .ok_or(AuthError::UnknownToken)?;

    if record.is_revoked() {
        return Ok(());
    }

    match store.mark_refresh_token_revoked(token, Utc::now()).await {
        Ok(()) => {
            tracing::info!(user_id = %record.user_id, "Refresh token revoked");
            Ok(())
        }
        Err(AppError::Database(DatabaseError::NotFound(_))) => Err(AuthError::UnknownToken.into()),
        Err(e) => Err(e),
    }
}
