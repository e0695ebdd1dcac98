//! `SQLite` database adapters for the campaign orchestration core.

pub mod campaign_store;
pub mod connection;
pub mod migrations;
pub mod session_repository;

pub use campaign_store::SqliteCampaignStore;
pub use connection::{create_pool, create_test_pool, verify_connection, ConnectionError, PoolConfig};
pub use migrations::{all_embedded_migrations, Migration, MigrationError, Migrator};
pub use session_repository::SqliteSessionRepository;

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::domain::errors::{OrchestratorError, OrchestratorResult};

/// Parse a UUID string from a `SQLite` row field.
pub fn parse_uuid(s: &str) -> OrchestratorResult<Uuid> {
    Uuid::parse_str(s).map_err(|e| OrchestratorError::Internal(e.into()))
}

/// Parse an optional UUID string from a `SQLite` row field.
pub fn parse_optional_uuid(s: Option<String>) -> OrchestratorResult<Option<Uuid>> {
    s.map(|s| Uuid::parse_str(&s))
        .transpose()
        .map_err(|e| OrchestratorError::Internal(e.into()))
}

/// Parse an RFC3339 datetime string from a `SQLite` row field.
pub fn parse_datetime(s: &str) -> OrchestratorResult<DateTime<Utc>> {
    chrono::DateTime::parse_from_rfc3339(s)
        .map_err(|e| OrchestratorError::Internal(e.into()))
        .map(|dt| dt.with_timezone(&Utc))
}

/// Parse an optional RFC3339 datetime string from a `SQLite` row field.
pub fn parse_optional_datetime(s: Option<String>) -> OrchestratorResult<Option<DateTime<Utc>>> {
    s.map(|s| chrono::DateTime::parse_from_rfc3339(&s).map(|d| d.with_timezone(&Utc)))
        .transpose()
        .map_err(|e| OrchestratorError::Internal(e.into()))
}

/// Parse a JSON string from a `SQLite` row field, falling back to the type's default.
pub fn parse_json_or_default<T: serde::de::DeserializeOwned + Default>(
    s: Option<String>,
) -> OrchestratorResult<T> {
    s.map(|s| serde_json::from_str(&s))
        .transpose()
        .map_err(|e| OrchestratorError::Internal(e.into()))
        .map(|opt| opt.unwrap_or_default())
}

#[derive(Debug, thiserror::Error)]
pub enum DatabaseError {
    #[error("Connection error: {0}")]
    Connection(#[from] ConnectionError),
    #[error("Migration error: {0}")]
    Migration(#[from] MigrationError),
    #[error("Query error: {0}")]
    Query(#[from] sqlx::Error),
}

pub async fn initialize_database(database_url: &str) -> Result<SqlitePool, DatabaseError> {
    let pool = create_pool(database_url, None).await?;
    let migrator = Migrator::new(pool.clone());
    migrator.run_embedded_migrations(all_embedded_migrations()).await?;
    Ok(pool)
}

pub async fn initialize_default_database() -> Result<SqlitePool, DatabaseError> {
    initialize_database("sqlite:.orchestrator/orchestrator.db").await
}

/// Create an in-memory test pool with all migrations applied.
pub async fn create_migrated_test_pool() -> Result<SqlitePool, DatabaseError> {
    let pool = create_test_pool().await?;
    let migrator = Migrator::new(pool.clone());
    migrator.run_embedded_migrations(all_embedded_migrations()).await?;
    Ok(pool)
}
