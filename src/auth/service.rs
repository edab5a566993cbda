/// Auth Facade
///
/// The entry points handlers call. Composition only; every operation is a
/// function of its inputs and the store.

use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::auth::credential::{extract_credential, Scheme};
use crate::auth::jwt::{access_token_ttl, generate_access_token, validate_access_token};
use crate::auth::password::{hash_password, verify_against_decoy, verify_password};
use crate::auth::refresh_token::{issue_refresh_token, redeem_refresh_token, revoke_refresh_token};
use crate::configuration::JwtSettings;
use crate::error::{AppError, AuthError};
use crate::store::{CredentialStore, RefreshTokenRecord, UserRecord};

/// Result of a successful login
#[derive(Debug, Clone)]
pub struct LoginOutcome {
    pub user: UserRecord,
    pub access_token: String,
    pub refresh_token: RefreshTokenRecord,
}

/// Authenticate a request from its `Authorization` header
///
/// Errors from extraction and validation propagate unchanged.
pub fn authenticate(header: Option<&str>, secret: &str) -> Result<Uuid, AuthError> {
    let credential = extract_credential(header, Scheme::Bearer)?;
    validate_access_token(&credential.token, secret)
}

/// Authenticate the webhook caller's `ApiKey` credential
///
/// Both keys are compared by SHA-256 digest so the comparison does not
/// depend on where the first differing byte is.
///
/// # Errors
/// `InvalidToken` if the key does not match or no key is configured
pub fn authenticate_api_key(header: Option<&str>, expected_key: &str) -> Result<(), AuthError> {
    let credential = extract_credential(header, Scheme::ApiKey)?;

    if expected_key.is_empty() {
        return Err(AuthError::InvalidToken);
    }

    let presented = Sha256::digest(credential.token.as_bytes());
    let expected = Sha256::digest(expected_key.as_bytes());
    if presented != expected {
        return Err(AuthError::InvalidToken);
    }
    Ok(())
}

/// Log a user in with email and password
///
/// An unknown email, a wrong password and an unreadable stored digest all
/// fail with the same `InvalidCredentials`.
///
/// `requested_ttl_seconds` is resolved by [`access_token_ttl`]; it can
/// lengthen the access token up to the configured ceiling but never
/// shorten it.
pub async fn login(
    store: &dyn CredentialStore,
    email: &str,
    password: &str,
    requested_ttl_seconds: Option<i64>,
    config: &JwtSettings,
) -> Result<LoginOutcome, AppError> {
    let user = match store.find_user_by_email(email).await? {
        Some(user) => user,
        None => {
            verify_against_decoy(password);
            return Err(AuthError::InvalidCredentials.into());
        }
    };

    match verify_password(password, &user.hashed_password) {
        Ok(true) => {}
        Ok(false) => return Err(AuthError::InvalidCredentials.into()),
        Err(e) => {
            tracing::error!(user_id = %user.id, error = %e, "Stored password digest is unreadable");
            return Err(AuthError::InvalidCredentials.into());
        }
    }

    let ttl = access_token_ttl(requested_ttl_seconds, config);
    let access_token = generate_access_token(user.id, &config.secret, ttl)?;
    let refresh_token = issue_refresh_token(store, user.id).await?;

    tracing::info!(user_id = %user.id, "User logged in");

    Ok(LoginOutcome {
        user,
        access_token,
        refresh_token,
    })
}

/// Mint a new access token from a refresh token in the `Authorization` header
///
/// The refresh token itself is left untouched.
pub async fn refresh(
    header: Option<&str>,
    store: &dyn CredentialStore,
    config: &JwtSettings,
) -> Result<String, AppError> {
    let credential = extract_credential(header, Scheme::Bearer)?;
    let user_id = redeem_refresh_token(store, &credential.token).await?;

    let ttl = access_token_ttl(None, config);
    let access_token = generate_access_token(user_id, &config.secret, ttl)?;

    tracing::info!(user_id = %user_id, "Access token refreshed");
    Ok(access_token)
}

/// Revoke the refresh token in the `Authorization` header
pub async fn logout(header: Option<&str>, store: &dyn CredentialStore) -> Result<(), AppError> {
    let credential = extract_credential(header, Scheme::Bearer)?;
    revoke_refresh_token(store, &credential.token).await
}

/// Create a user with a freshly hashed password
pub async fn register(
    store: &dyn CredentialStore,
    email: &str,
    password: &str,
) -> Result<UserRecord, AppError> {
    let digest = hash_password(password)?;
    let user = store.insert_user(email, &digest).await?;

    tracing::info!(user_id = %user.id, "User registered");
    Ok(user)
}

/// Replace a user's email and password
pub async fn update_credentials(
    store: &dyn CredentialStore,
    user_id: Uuid,
    email: &str,
    password: &str,
) -> Result<UserRecord, AppError> {
    let digest = hash_password(password)?;
    let user = store.update_user(user_id, email, &digest).await?;

    tracing::info!(user_id = %user.id, "User credentials updated");
    Ok(user)
}
