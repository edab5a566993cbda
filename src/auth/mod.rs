/// Authentication module
///
/// Credential extraction, password hashing, access token signing and
/// validation, refresh token lifecycle, and the facade that composes them.

mod claims;
mod credential;
mod jwt;
mod password;
mod refresh_token;
mod service;

pub use claims::{Claims, ISSUER};
pub use credential::{authorization_header, extract_credential, Credential, Scheme};
pub use jwt::{
    access_token_ttl, generate_access_token, generate_access_token_at, validate_access_token,
    validate_access_token_at,
};
pub use password::{hash_password, prepare_decoy_digest, verify_password};
pub use refresh_token::{
    generate_refresh_token, issue_refresh_token, redeem_refresh_token, redeem_refresh_token_at,
    revoke_refresh_token, REFRESH_TOKEN_LIFETIME_DAYS,
};
pub use service::{
    authenticate, authenticate_api_key, login, logout, refresh, register, update_credentials,
    LoginOutcome,
};
