/// Storage collaborator
///
/// The auth core reaches persistence only through `CredentialStore`.
/// `PgStore` backs the running service; `InMemoryStore` backs tests and
/// local development.

mod memory;
mod postgres;

pub use memory::InMemoryStore;
pub use postgres::PgStore;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::AppError;

/// A persisted refresh token. Records are never deleted in normal flow;
/// revocation only sets `revoked_at`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefreshTokenRecord {
    pub token: String,
    pub user_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub revoked_at: Option<DateTime<Utc>>,
}

impl RefreshTokenRecord {
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }

    pub fn is_revoked(&self) -> bool {
        self.revoked_at.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserRecord {
    pub id: Uuid,
    pub email: String,
    pub hashed_password: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub is_chirpy_red: bool,
}

/// Narrow accessor interface over users and refresh tokens
///
/// Implementations own their concurrency control. Revocation must be
/// atomic and must never overwrite an existing `revoked_at`.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    async fn find_refresh_token(&self, token: &str) -> Result<Option<RefreshTokenRecord>, AppError>;

    /// Fails with `UniqueConstraintViolation` if the token string exists
    async fn insert_refresh_token(
        &self,
        record: RefreshTokenRecord,
    ) -> Result<RefreshTokenRecord, AppError>;

    /// Fails with `NotFound` if no such token exists
    async fn mark_refresh_token_revoked(
        &self,
        token: &str,
        when: DateTime<Utc>,
    ) -> Result<(), AppError>;

    async fn find_user_by_email(&self, email: &str) -> Result<Option<UserRecord>, AppError>;

    async fn find_user_by_id(&self, id: Uuid) -> Result<Option<UserRecord>, AppError>;

    /// Fails with `UniqueConstraintViolation` if the email is taken
    async fn insert_user(&self, email: &str, hashed_password: &str) -> Result<UserRecord, AppError>;

    /// Fails with `NotFound` if no such user exists
    async fn update_user(
        &self,
        id: Uuid,
        email: &str,
        hashed_password: &str,
    ) -> Result<UserRecord, AppError>;

    /// Fails with `NotFound` if no such user exists
    async fn upgrade_user(&self, id: Uuid) -> Result<UserRecord, AppError>;

    /// Delete every user and refresh token. Admin only.
    async fn reset(&self) -> Result<(), AppError>;
}
