use actix_web::{web, HttpResponse};

use crate::configuration::ApplicationSettings;
use crate::error::AppError;
use crate::store::CredentialStore;

/// POST /admin/reset
///
/// Wipes all users and refresh tokens. Only available when the platform is
/// `dev`.
pub async fn reset(
    store: web::Data<dyn CredentialStore>,
    settings: web::Data<ApplicationSettings>,
) -> Result<HttpResponse, AppError> {
    if !settings.is_dev() {
        return Err(AppError::Forbidden(
            "Reset is only allowed in dev environment".to_string(),
        ));
    }

    store.reset().await?;
    tracing::warn!(platform = %settings.platform, "Store reset to initial state");

    Ok(HttpResponse::Ok()
        .content_type("text/plain; charset=utf-8")
        .body("Database reset to initial state"))
}
