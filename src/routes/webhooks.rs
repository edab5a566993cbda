use actix_web::{web, HttpRequest, HttpResponse};
use serde::Deserialize;
use uuid::Uuid;

use crate::auth::{authenticate_api_key, authorization_header};
use crate::configuration::ApplicationSettings;
use crate::error::{AppError, ValidationError};
use crate::store::CredentialStore;

#[derive(Deserialize)]
pub struct WebhookData {
    pub user_id: Uuid,
}

#[derive(Deserialize)]
pub struct WebhookEvent {
    pub event: String,
    pub data: WebhookData,
}

/// POST /api/polka/webhooks
///
/// Requires `Authorization: ApiKey <key>`. Events other than
/// `user.upgraded` are acknowledged and ignored.
///
/// The body is only parsed once the key checks out.
pub async fn polka_webhook(
    req: HttpRequest,
    body: web::Bytes,
    store: web::Data<dyn CredentialStore>,
    settings: web::Data<ApplicationSettings>,
) -> Result<HttpResponse, AppError> {
    authenticate_api_key(authorization_header(req.headers())?, &settings.polka_key)?;

    let body: WebhookEvent = serde_json::from_slice(&body).map_err(|e| {
        tracing::debug!("Webhook body rejected: {}", e);
        AppError::Validation(ValidationError::InvalidFormat("webhook body".to_string()))
    })?;

    if body.event != "user.upgraded" {
        return Ok(HttpResponse::NoContent().finish());
    }

    let user = store.upgrade_user(body.data.user_id).await?;
    tracing::info!(user_id = %user.id, "User upgraded");

    Ok(HttpResponse::NoContent().finish())
}
