/// Credential Extraction
///
/// Parses an `Authorization` header value into a scheme and an opaque token.

use actix_web::http::header::{HeaderMap, AUTHORIZATION};

use crate::error::AuthError;

/// Authorization schemes understood by the service
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scheme {
    /// Access tokens and refresh tokens
    Bearer,
    /// Machine credential used by the webhook caller
    ApiKey,
}

impl Scheme {
    pub fn as_str(&self) -> &'static str {
        match self {
            Scheme::Bearer => "Bearer",
            Scheme::ApiKey => "ApiKey",
        }
    }
}

/// A parsed `<scheme> <token>` pair. Never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credential {
    pub scheme: Scheme,
    pub token: String,
}

/// Extract a credential for `scheme` from a raw header value
///
/// The header must split on whitespace into exactly two fields, the first
/// matching the scheme tag case-sensitively. The second field is returned
/// verbatim.
///
/// # Errors
/// - `MissingCredential` if the header is absent or empty
/// - `MalformedCredential` for any other shape
pub fn extract_credential(header: Option<&str>, scheme: Scheme) -> Result<Credential, AuthError> {
    let header = match header {
        Some(h) if !h.is_empty() => h,
        _ => return Err(AuthError::MissingCredential),
    };

    let mut fields = header.split_whitespace();
    match (fields.next(), fields.next(), fields.next()) {
        (Some(tag), Some(token), None) if tag == scheme.as_str() => Ok(Credential {
            scheme,
            token: token.to_string(),
        }),
        _ => Err(AuthError::MalformedCredential),
    }
}

/// Read the `Authorization` header from a request
///
/// A header carrying bytes that are not visible ASCII cannot hold a valid
/// credential and is reported as malformed.
pub fn authorization_header(headers: &HeaderMap) -> Result<Option<&str>, AuthError> {
    match headers.get(AUTHORIZATION) {
        None => Ok(None),
        Some(value) => value
            .to_str()
            .map(Some)
            .map_err(|_| AuthError::MalformedCredential),
    }
}
