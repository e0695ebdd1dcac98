//! Session repository port (trait) for dependency injection.
//!
//! Defines the contract for auth-session storage that infrastructure
//! adapters must implement. Services depend on this trait, not concrete
//! implementations.

use anyhow::Result;
use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::models::Session;

/// Repository trait for session persistence.
#[async_trait]
pub trait SessionRepository: Send + Sync {
    /// Creates a new session.
    ///
    /// # Errors
    /// Returns an error if the session id already exists or the store fails.
    async fn create(&self, session: Session) -> Result<()>;

    /// Retrieves a session by its opaque token.
    ///
    /// # Errors
    /// Returns an error if the store fails.
    async fn get(&self, session_id: &str) -> Result<Option<Session>>;

    /// Persists a session's current field values (used for sliding renewal
    /// and invalidation).
    ///
    /// # Errors
    /// Returns an error if the session does not exist or the store fails.
    async fn update(&self, session: Session) -> Result<()>;

    /// Marks every session owned by `user_id` as invalidated. Best-effort:
    /// a failure here must not roll back the caller's password change.
    ///
    /// # Errors
    /// Returns an error if the store fails.
    async fn invalidate_all_for_user(&self, user_id: Uuid) -> Result<()>;

    /// Deletes a session outright.
    ///
    /// # Errors
    /// Returns an error if the store fails.
    async fn delete(&self, session_id: &str) -> Result<()>;
}
