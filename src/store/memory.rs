use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{CredentialStore, RefreshTokenRecord, UserRecord};
use crate::error::{AppError, DatabaseError};

#[derive(Default)]
struct Tables {
    users: HashMap<Uuid, UserRecord>,
    refresh_tokens: HashMap<String, RefreshTokenRecord>,
}

/// Process-local store with the same integrity rules as the SQL schema
#[derive(Default)]
pub struct InMemoryStore {
    tables: RwLock<Tables>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn user_not_found() -> AppError {
    AppError::Database(DatabaseError::NotFound("User not found".to_string()))
}

#[async_trait]
impl CredentialStore for InMemoryStore {
    async fn find_refresh_token(&self, token: &str) -> Result<Option<RefreshTokenRecord>, AppError> {
        Ok(self.tables.read().await.refresh_tokens.get(token).cloned())
    }

    async fn insert_refresh_token(
        &self,
        record: RefreshTokenRecord,
    ) -> Result<RefreshTokenRecord, AppError> {
        let mut tables = self.tables.write().await;

        if !tables.users.contains_key(&record.user_id) {
            return Err(AppError::Database(DatabaseError::UnexpectedError(
                "refresh token owner does not exist".to_string(),
            )));
        }
        if tables.refresh_tokens.contains_key(&record.token) {
            return Err(AppError::Database(DatabaseError::UniqueConstraintViolation(
                "refresh token already exists".to_string(),
            )));
        }

        tables
            .refresh_tokens
            .insert(record.token.clone(), record.clone());
        Ok(record)
    }

    async fn mark_refresh_token_revoked(
        &self,
        token: &str,
        when: DateTime<Utc>,
    ) -> Result<(), AppError> {
        let mut tables = self.tables.write().await;
        let record = tables.refresh_tokens.get_mut(token).ok_or_else(|| {
            AppError::Database(DatabaseError::NotFound("Refresh token not found".to_string()))
        })?;

        if record.revoked_at.is_none() {
            record.revoked_at = Some(when);
            record.updated_at = when;
        }
        Ok(())
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<UserRecord>, AppError> {
        let tables = self.tables.read().await;
        Ok(tables.users.values().find(|u| u.email == email).cloned())
    }

    async fn find_user_by_id(&self, id: Uuid) -> Result<Option<UserRecord>, AppError> {
        Ok(self.tables.read().await.users.get(&id).cloned())
    }

    async fn insert_user(&self, email: &str, hashed_password: &str) -> Result<UserRecord, AppError> {
        let mut tables = self.tables.write().await;

        if tables.users.values().any(|u| u.email == email) {
            return Err(AppError::Database(DatabaseError::UniqueConstraintViolation(
                "Email already registered".to_string(),
            )));
        }

        let now = Utc::now();
        let user = UserRecord {
            id: Uuid::new_v4(),
            email: email.to_string(),
            hashed_password: hashed_password.to_string(),
            created_at: now,
            updated_at: now,
            is_chirpy_red: false,
        };
        tables.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn update_user(
        &self,
        id: Uuid,
        email: &str,
        hashed_password: &str,
    ) -> Result<UserRecord, AppError> {
        let mut tables = self.tables.write().await;

        if tables.users.values().any(|u| u.email == email && u.id != id) {
            return Err(AppError::Database(DatabaseError::UniqueConstraintViolation(
                "Email already registered".to_string(),
            )));
        }

        let user = tables.users.get_mut(&id).ok_or_else(user_not_found)?;
        user.email = email.to_string();
        user.hashed_password = hashed_password.to_string();
        user.updated_at = Utc::now();
        Ok(user.clone())
    }

    async fn upgrade_user(&self, id: Uuid) -> Result<UserRecord, AppError> {
        let mut tables = self.tables.write().await;
        let user = tables.users.get_mut(&id).ok_or_else(user_not_found)?;
        user.is_chirpy_red = true;
        user.updated_at = Utc::now();
        Ok(user.clone())
    }

    async fn reset(&self) -> Result<(), AppError> {
        let mut tables = self.tables.write().await;
        tables.refresh_tokens.clear();
        tables.users.clear();
        Ok(())
    }
}
