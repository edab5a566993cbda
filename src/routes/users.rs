/// User Routes
///
/// Registration, credential updates and the current user's record.

use actix_web::{web, HttpRequest, HttpResponse};
use serde::{Deserialize, Serialize};

use crate::auth::{self, authorization_header};
use crate::configuration::JwtSettings;
use crate::error::{AppError, DatabaseError};
use crate::middleware::AuthenticatedUser;
use crate::store::{CredentialStore, UserRecord};
use crate::validators::{is_valid_email, is_valid_password};

/// Email and password pair for registration and updates
#[derive(Deserialize)]
pub struct CredentialsRequest {
    pub email: String,
    pub password: String,
}

/// User information response. Never includes the password digest.
#[derive(Serialize, Deserialize, Debug)]
pub struct UserResponse {
    pub id: String,
    pub email: String,
    pub created_at: String,
    pub updated_at: String,
    pub is_chirpy_red: bool,
}

impl From<&UserRecord> for UserResponse {
    fn from(user: &UserRecord) -> Self {
        Self {
            id: user.id.to_string(),
            email: user.email.clone(),
            created_at: user.created_at.to_rfc3339(),
            updated_at: user.updated_at.to_rfc3339(),
            is_chirpy_red: user.is_chirpy_red,
        }
    }
}

/// POST /api/users
///
/// # Errors
/// - 400: Invalid email or password
/// - 409: Email already registered
pub async fn create_user(
    form: web::Json<CredentialsRequest>,
    store: web::Data<dyn CredentialStore>,
) -> Result<HttpResponse, AppError> {
    let email = is_valid_email(&form.email)?;
    is_valid_password(&form.password)?;

    let user = auth::register(store.get_ref(), &email, &form.password).await?;

    Ok(HttpResponse::Created().json(UserResponse::from(&user)))
}

/// PUT /api/users
///
/// Requires `Authorization: Bearer <access_token>`.
///
/// # Errors
/// - 401: Missing, malformed, invalid or expired access token
/// - 400: Invalid email or password
/// - 409: Email belongs to another user
pub async fn update_user(
    req: HttpRequest,
    form: web::Json<CredentialsRequest>,
    store: web::Data<dyn CredentialStore>,
    jwt_config: web::Data<JwtSettings>,
) -> Result<HttpResponse, AppError> {
    let user_id = auth::authenticate(authorization_header(req.headers())?, &jwt_config.secret)?;

    let email = is_valid_email(&form.email)?;
    is_valid_password(&form.password)?;

    let user = auth::update_credentials(store.get_ref(), user_id, &email, &form.password).await?;

    Ok(HttpResponse::Ok().json(UserResponse::from(&user)))
}

/// GET /api/me
///
/// The caller's identity is injected by the bearer-token middleware.
pub async fn get_current_user(
    user: web::ReqData<AuthenticatedUser>,
    store: web::Data<dyn CredentialStore>,
) -> Result<HttpResponse, AppError> {
    let user = store
        .find_user_by_id(user.user_id)
        .await?
        .ok_or_else(|| AppError::Database(DatabaseError::NotFound("User not found".to_string())))?;

    Ok(HttpResponse::Ok().json(UserResponse::from(&user)))
}
