/// Access Token Generation and Validation
///
/// Access tokens are HS256-signed JWTs. They are never stored and cannot be
/// revoked; they simply expire.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use uuid::Uuid;

use crate::auth::claims::Claims;
use crate::configuration::{JwtSettings, MAX_ACCESS_TOKEN_EXPIRY_SECONDS};
use crate::error::AuthError;

/// Generate a new access token for a user
///
/// # Errors
/// Returns `SigningFailure` if the token cannot be signed
pub fn generate_access_token(user_id: Uuid, secret: &str, ttl: Duration) -> Result<String, AuthError> {
    generate_access_token_at(user_id, secret, ttl, Utc::now())
}

/// Generate an access token as if issued at `now`
pub fn generate_access_token_at(
    user_id: Uuid,
    secret: &str,
    ttl: Duration,
    now: DateTime<Utc>,
) -> Result<String, AuthError> {
    let claims = Claims::new(user_id, ttl, now);

    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AuthError::SigningFailure(e.to_string()))
}

/// Validate an access token and return the user it was issued to
///
/// # Errors
/// - `InvalidToken` if the token is unparseable, not HS256, or wrongly signed
/// - `ExpiredToken` if the current time is at or past `exp`
/// - `InvalidIssuer` if `iss` is not ours
/// - `InvalidSubject` if `sub` is missing or not a user id
pub fn validate_access_token(token: &str, secret: &str) -> Result<Uuid, AuthError> {
    validate_access_token_at(token, secret, Utc::now())
}

/// Validate an access token against the clock reading `now`
pub fn validate_access_token_at(
    token: &str,
    secret: &str,
    now: DateTime<Utc>,
) -> Result<Uuid, AuthError> {
    // Only the signature and algorithm are checked by the library. Expiry is
    // compared below without leeway.
    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_exp = false;
    validation.leeway = 0;

    let claims = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )
    .map(|data| data.claims)
    .map_err(|e| {
        tracing::debug!("JWT rejected: {}", e);
        AuthError::InvalidToken
    })?;

    if claims.is_expired_at(now) {
        return Err(AuthError::ExpiredToken);
    }
    if !claims.has_expected_issuer() {
        return Err(AuthError::InvalidIssuer);
    }
    claims.user_id()
}

/// Resolve the lifetime of a new access token
///
/// A caller-requested lifetime is honored only between the configured
/// default (floor) and the configured maximum (ceiling). Absent or
/// non-positive requests get the default. Both bounds are held within
/// `MAX_ACCESS_TOKEN_EXPIRY_SECONDS` even for unvalidated settings.
pub fn access_token_ttl(requested_seconds: Option<i64>, config: &JwtSettings) -> Duration {
    let floor = config.access_token_expiry.clamp(1, MAX_ACCESS_TOKEN_EXPIRY_SECONDS);
    let ceiling = config
        .access_token_max_expiry
        .clamp(floor, MAX_ACCESS_TOKEN_EXPIRY_SECONDS);
    let seconds = requested_seconds.unwrap_or(floor).clamp(floor, ceiling);
    Duration::seconds(seconds)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::claims::ISSUER;

    const SECRET: &str = "test-secret-key-at-least-32-characters-long";

    fn get_test_config() -> JwtSettings {
        JwtSettings {
            secret: SECRET.to_string(),
            access_token_expiry: 3600,
            access_token_max_expiry: 86400,
        }
    }

    fn sign_with(claims: &Claims, algorithm: Algorithm) -> String {
        encode(
            &Header::new(algorithm),
            claims,
            &EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .expect("Failed to sign claims")
    }

    #[test]
    fn test_generate_and_validate_token() {
        let user_id = Uuid::new_v4();

        let token = generate_access_token(user_id, SECRET, Duration::hours(1))
            .expect("Failed to generate token");
        let subject = validate_access_token(&token, SECRET).expect("Failed to validate token");

        assert_eq!(subject, user_id);
        assert_eq!(token.split('.').count(), 3);
    }

    #[test]
    fn test_wrong_secret() {
        let token = generate_access_token(Uuid::new_v4(), SECRET, Duration::hours(1))
            .expect("Failed to generate token");

        let result = validate_access_token(&token, "another-secret-entirely");
        assert_eq!(result, Err(AuthError::InvalidToken));
    }

    #[test]
    fn test_invalid_token() {
        let result = validate_access_token("invalid.token.here", SECRET);
        assert_eq!(result, Err(AuthError::InvalidToken));

        let result = validate_access_token("", SECRET);
        assert_eq!(result, Err(AuthError::InvalidToken));
    }

    #[test]
    fn test_tampered_token() {
        let token = generate_access_token(Uuid::new_v4(), SECRET, Duration::hours(1))
            .expect("Failed to generate token");

        let tampered = format!("{}X", token);
        assert_eq!(
            validate_access_token(&tampered, SECRET),
            Err(AuthError::InvalidToken)
        );
    }

    #[test]
    fn test_expiry_boundary() {
        let user_id = Uuid::new_v4();
        let issued_at = Utc::now();
        let token = generate_access_token_at(user_id, SECRET, Duration::hours(1), issued_at)
            .expect("Failed to generate token");

        let just_before = issued_at + Duration::seconds(3599);
        assert_eq!(
            validate_access_token_at(&token, SECRET, just_before),
            Ok(user_id)
        );

        let at_expiry = issued_at + Duration::seconds(3600);
        assert_eq!(
            validate_access_token_at(&token, SECRET, at_expiry),
            Err(AuthError::ExpiredToken)
        );

        let after = issued_at + Duration::days(1);
        assert_eq!(
            validate_access_token_at(&token, SECRET, after),
            Err(AuthError::ExpiredToken)
        );
    }

    #[test]
    fn test_other_hmac_algorithm_rejected() {
        let claims = Claims::new(Uuid::new_v4(), Duration::hours(1), Utc::now());
        let token = sign_with(&claims, Algorithm::HS512);

        assert_eq!(
            validate_access_token(&token, SECRET),
            Err(AuthError::InvalidToken)
        );
    }

    #[test]
    fn test_unsigned_token_rejected() {
        let token = generate_access_token(Uuid::new_v4(), SECRET, Duration::hours(1))
            .expect("Failed to generate token");
        let payload = token.split('.').nth(1).expect("Token should have a payload");

        // {"alg":"none","typ":"JWT"}
        let unsigned = format!("eyJhbGciOiJub25lIiwidHlwIjoiSldUIn0.{}.", payload);
        assert_eq!(
            validate_access_token(&unsigned, SECRET),
            Err(AuthError::InvalidToken)
        );
    }

    #[test]
    fn test_wrong_issuer() {
        let mut claims = Claims::new(Uuid::new_v4(), Duration::hours(1), Utc::now());
        claims.iss = Some("someone-else".to_string());
        let token = sign_with(&claims, Algorithm::HS256);

        assert_eq!(
            validate_access_token(&token, SECRET),
            Err(AuthError::InvalidIssuer)
        );

        claims.iss = None;
        let token = sign_with(&claims, Algorithm::HS256);
        assert_eq!(
            validate_access_token(&token, SECRET),
            Err(AuthError::InvalidIssuer)
        );
    }

    #[test]
    fn test_expiry_checked_before_issuer() {
        let issued_at = Utc::now() - Duration::hours(2);
        let mut claims = Claims::new(Uuid::new_v4(), Duration::hours(1), issued_at);
        claims.iss = Some("someone-else".to_string());
        let token = sign_with(&claims, Algorithm::HS256);

        assert_eq!(
            validate_access_token(&token, SECRET),
            Err(AuthError::ExpiredToken)
        );
    }

    #[test]
    fn test_bad_subject() {
        let mut claims = Claims::new(Uuid::new_v4(), Duration::hours(1), Utc::now());
        claims.sub = Some("not-a-uuid".to_string());
        let token = sign_with(&claims, Algorithm::HS256);
        assert_eq!(
            validate_access_token(&token, SECRET),
            Err(AuthError::InvalidSubject)
        );

        claims.sub = None;
        let token = sign_with(&claims, Algorithm::HS256);
        assert_eq!(
            validate_access_token(&token, SECRET),
            Err(AuthError::InvalidSubject)
        );
    }

    #[test]
    fn test_issuer_constant_is_stamped() {
        let token = generate_access_token(Uuid::new_v4(), SECRET, Duration::hours(1))
            .expect("Failed to generate token");

        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[ISSUER]);
        let decoded = decode::<Claims>(
            &token,
            &DecodingKey::from_secret(SECRET.as_bytes()),
            &validation,
        );
        assert!(decoded.is_ok());
    }

    #[test]
    fn test_access_token_ttl_policy() {
        let config = get_test_config();

        assert_eq!(access_token_ttl(None, &config), Duration::seconds(3600));
        assert_eq!(access_token_ttl(Some(0), &config), Duration::seconds(3600));
        assert_eq!(access_token_ttl(Some(60), &config), Duration::seconds(3600));
        assert_eq!(access_token_ttl(Some(7200), &config), Duration::seconds(7200));
        assert_eq!(
            access_token_ttl(Some(i64::MAX), &config),
            Duration::seconds(86400)
        );
    }

    #[test]
    fn test_access_token_ttl_stays_within_cap_for_unvalidated_settings() {
        let mut config = get_test_config();
        config.access_token_max_expiry = i64::MAX;

        assert_eq!(
            access_token_ttl(Some(i64::MAX), &config),
            Duration::seconds(MAX_ACCESS_TOKEN_EXPIRY_SECONDS)
        );

        config.access_token_expiry = 0;
        assert_eq!(access_token_ttl(None, &config), Duration::seconds(1));
    }

    #[test]
    fn test_access_token_ttl_fixed_when_ceiling_equals_floor() {
        let mut config = get_test_config();
        config.access_token_max_expiry = config.access_token_expiry;

        assert_eq!(
            access_token_ttl(Some(7200), &config),
            Duration::seconds(3600)
        );
    }
}
