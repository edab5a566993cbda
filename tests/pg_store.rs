//! Run with `cargo test -- --ignored` against a local Postgres configured in
//! `configuration.yaml` (or `APP__DATABASE__*`).

use chirpy::auth::{issue_refresh_token, redeem_refresh_token, revoke_refresh_token};
use chirpy::configuration::{get_configuration, DatabaseSettings};
use chirpy::error::{AppError, AuthError, DatabaseError};
use chirpy::store::{CredentialStore, PgStore, RefreshTokenRecord, UserRecord};
use chrono::{Duration, Utc};
use sqlx::{Connection, Executor, PgConnection, PgPool};
use uuid::Uuid;

async fn spawn_store() -> PgStore {
    let mut configuration = get_configuration().expect("Failed to read configuration.");
    configuration.database.database_name = Uuid::new_v4().to_string();
    let connection_pool = configure_database(&configuration.database).await;

    PgStore::new(connection_pool)
}

pub async fn configure_database(config: &DatabaseSettings) -> PgPool {
    // Create database
    let mut connection = PgConnection::connect(&config.connection_string_without_db())
        .await
        .expect("Failed to connect to Postgres");
    connection
        .execute(&*format!(r#"CREATE DATABASE "{}";"#, config.database_name))
        .await
        .expect("Failed to create database.");
    // Migrate database
    let connection_pool = PgPool::connect(&config.connection_string())
        .await
        .expect("Failed to connect to Postgres.");
    sqlx::migrate!("./migrations")
        .run(&connection_pool)
        .await
        .expect("Failed to migrate the database.");
    connection_pool
}

async fn insert_test_user(store: &PgStore) -> UserRecord {
    store
        .insert_user("u@x.com", "$2b$12$notarealdigestnotarealdigestnotarealdigestnotareal")
        .await
        .expect("Failed to insert user")
}

fn token_record(user_id: Uuid) -> RefreshTokenRecord {
    let now = Utc::now();
    RefreshTokenRecord {
        token: "ab".repeat(32),
        user_id,
        created_at: now,
        updated_at: now,
        expires_at: now + Duration::days(60),
        revoked_at: None,
    }
}

// --- Refresh Token Storage ---

#[tokio::test]
#[ignore = "requires a running Postgres"]
async fn inserted_refresh_token_can_be_found() {
    let store = spawn_store().await;
    let user = insert_test_user(&store).await;

    let inserted = store
        .insert_refresh_token(token_record(user.id))
        .await
        .expect("Failed to insert refresh token");

    let found = store
        .find_refresh_token(&inserted.token)
        .await
        .expect("Failed to query refresh token")
        .expect("Refresh token should be stored");
    assert_eq!(found, inserted);
    assert_eq!(found.user_id, user.id);
    assert!(found.revoked_at.is_none());

    let missing = store
        .find_refresh_token(&"cd".repeat(32))
        .await
        .expect("Failed to query refresh token");
    assert!(missing.is_none());
}

#[tokio::test]
#[ignore = "requires a running Postgres"]
async fn duplicate_refresh_token_is_a_unique_violation() {
    let store = spawn_store().await;
    let user = insert_test_user(&store).await;

    store
        .insert_refresh_token(token_record(user.id))
        .await
        .expect("Failed to insert refresh token");
    let result = store.insert_refresh_token(token_record(user.id)).await;

    assert!(matches!(
        result,
        Err(AppError::Database(DatabaseError::UniqueConstraintViolation(_)))
    ));
}

#[tokio::test]
#[ignore = "requires a running Postgres"]
async fn second_revocation_keeps_first_timestamp() {
    let store = spawn_store().await;
    let user = insert_test_user(&store).await;
    let record = store
        .insert_refresh_token(token_record(user.id))
        .await
        .expect("Failed to insert refresh token");

    store
        .mark_refresh_token_revoked(&record.token, Utc::now())
        .await
        .expect("Failed to revoke refresh token");
    let first = store
        .find_refresh_token(&record.token)
        .await
        .expect("Failed to query refresh token")
        .expect("Refresh token should be stored");
    assert!(first.revoked_at.is_some());

    store
        .mark_refresh_token_revoked(&record.token, Utc::now() + Duration::hours(1))
        .await
        .expect("Failed to revoke refresh token again");
    let second = store
        .find_refresh_token(&record.token)
        .await
        .expect("Failed to query refresh token")
        .expect("Refresh token should be stored");

    assert_eq!(second.revoked_at, first.revoked_at);
    assert_eq!(second.updated_at, first.updated_at);
}

#[tokio::test]
#[ignore = "requires a running Postgres"]
async fn revoking_unknown_token_is_not_found() {
    let store = spawn_store().await;

    let result = store
        .mark_refresh_token_revoked(&"ef".repeat(32), Utc::now())
        .await;

    assert!(matches!(
        result,
        Err(AppError::Database(DatabaseError::NotFound(_)))
    ));
}

// --- Users ---

#[tokio::test]
#[ignore = "requires a running Postgres"]
async fn duplicate_email_is_a_unique_violation() {
    let store = spawn_store().await;
    insert_test_user(&store).await;

    let result = store.insert_user("u@x.com", "other-digest").await;

    assert!(matches!(
        result,
        Err(AppError::Database(DatabaseError::UniqueConstraintViolation(_)))
    ));
}

#[tokio::test]
#[ignore = "requires a running Postgres"]
async fn reset_removes_users_and_tokens() {
    let store = spawn_store().await;
    let user = insert_test_user(&store).await;
    let record = store
        .insert_refresh_token(token_record(user.id))
        .await
        .expect("Failed to insert refresh token");

    store.reset().await.expect("Failed to reset store");

    assert!(store
        .find_user_by_id(user.id)
        .await
        .expect("Failed to query user")
        .is_none());
    assert!(store
        .find_refresh_token(&record.token)
        .await
        .expect("Failed to query refresh token")
        .is_none());
}

// --- Token Lifecycle ---

#[tokio::test]
#[ignore = "requires a running Postgres"]
async fn refresh_token_lifecycle_on_postgres() {
    let store = spawn_store().await;
    let user = insert_test_user(&store).await;

    let record = issue_refresh_token(&store, user.id)
        .await
        .expect("Failed to issue refresh token");
    assert_eq!(
        redeem_refresh_token(&store, &record.token).await,
        Ok(user.id)
    );

    revoke_refresh_token(&store, &record.token)
        .await
        .expect("Failed to revoke refresh token");
    revoke_refresh_token(&store, &record.token)
        .await
        .expect("Second revocation should succeed");

    assert_eq!(
        redeem_refresh_token(&store, &record.token).await,
        Err(AppError::Auth(AuthError::RevokedToken))
    );
    assert_eq!(
        revoke_refresh_token(&store, &"01".repeat(32)).await,
        Err(AppError::Auth(AuthError::UnknownToken))
    );
}
