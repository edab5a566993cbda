/// Authentication Routes
///
/// Login, access token refresh and refresh token revocation.

use actix_web::{web, HttpRequest, HttpResponse};
use serde::{Deserialize, Serialize};

use crate::auth::{self, authorization_header};
use crate::configuration::JwtSettings;
use crate::error::AppError;
use crate::routes::UserResponse;
use crate::store::CredentialStore;

/// User login request
#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
    /// Requested access token lifetime; see `auth::access_token_ttl`
    #[serde(default)]
    pub expires_in_seconds: Option<i64>,
}

/// Login response: the user plus both tokens
#[derive(Serialize, Deserialize, Debug)]
pub struct LoginResponse {
    #[serde(flatten)]
    pub user: UserResponse,
    pub token: String,
    pub refresh_token: String,
}

/// Refresh response with a new access token
#[derive(Serialize, Deserialize, Debug)]
pub struct RefreshResponse {
    pub token: String,
}

/// POST /api/login
///
/// # Errors
/// - 401: Unknown email or wrong password (same response for both)
/// - 500: Token signing or entropy failure
pub async fn login(
    form: web::Json<LoginRequest>,
    store: web::Data<dyn CredentialStore>,
    jwt_config: web::Data<JwtSettings>,
) -> Result<HttpResponse, AppError> {
    let outcome = auth::login(
        store.get_ref(),
        &form.email,
        &form.password,
        form.expires_in_seconds,
        jwt_config.get_ref(),
    )
    .await?;

    Ok(HttpResponse::Ok().json(LoginResponse {
        user: UserResponse::from(&outcome.user),
        token: outcome.access_token,
        refresh_token: outcome.refresh_token.token,
    }))
}

/// POST /api/refresh
///
/// Requires `Authorization: Bearer <refresh_token>`. The refresh token is
/// not rotated.
///
/// # Errors
/// - 401: Missing, malformed, unknown, expired or revoked refresh token
pub async fn refresh(
    req: HttpRequest,
    store: web::Data<dyn CredentialStore>,
    jwt_config: web::Data<JwtSettings>,
) -> Result<HttpResponse, AppError> {
    let header = authorization_header(req.headers())?;
    let token = auth::refresh(header, store.get_ref(), jwt_config.get_ref()).await?;

    Ok(HttpResponse::Ok().json(RefreshResponse { token }))
}

/// POST /api/revoke
///
/// Requires `Authorization: Bearer <refresh_token>`. Revoking twice is not
/// an error.
///
/// # Errors
/// - 401: Missing, malformed or unknown refresh token
pub async fn revoke(
    req: HttpRequest,
    store: web::Data<dyn CredentialStore>,
) -> Result<HttpResponse, AppError> {
    let header = authorization_header(req.headers())?;
    auth::logout(header, store.get_ref()).await?;

    Ok(HttpResponse::NoContent().finish())
}
