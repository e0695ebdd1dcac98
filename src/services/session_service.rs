//! Session management service: creation, IP-bound validation with sliding
//! renewal, and bulk invalidation on password change.
//!
//! Coordinates session lifecycle through the [`SessionRepository`] port,
//! enabling dependency injection and testability.

use std::sync::Arc;

use chrono::{Duration, Utc};
use tracing::{instrument, warn};
use uuid::Uuid;

use crate::domain::errors::{OrchestratorError, OrchestratorResult};
use crate::domain::models::Session;
use crate::domain::ports::SessionRepository;

/// How long a freshly-created or freshly-renewed session lives, and how
/// close to expiry a validated session gets renewed.
#[derive(Debug, Clone, Copy)]
pub struct SessionPolicy {
    pub session_duration: Duration,
    pub renewal_threshold: Duration,
    /// When false, `validate` skips the `client_ip` comparison.
    pub enforce_ip_binding: bool,
}

impl Default for SessionPolicy {
    fn default() -> Self {
        Self {
            session_duration: Duration::hours(24),
            renewal_threshold: Duration::hours(6),
            enforce_ip_binding: true,
        }
    }
}

impl From<crate::domain::models::SessionConfig> for SessionPolicy {
    fn from(config: crate::domain::models::SessionConfig) -> Self {
        Self {
            session_duration: Duration::seconds(config.session_duration_secs),
            renewal_threshold: Duration::seconds(config.renewal_threshold_secs),
            enforce_ip_binding: config.enforce_ip_binding,
        }
    }
}

/// Service for managing authentication sessions.
pub struct SessionService {
    repo: Arc<dyn SessionRepository>,
    policy: SessionPolicy,
}

impl SessionService {
    pub fn new(repo: Arc<dyn SessionRepository>, policy: SessionPolicy) -> Self {
        Self { repo, policy }
    }

    /// Issue a new session for `user_id` bound to `client_ip`.
    #[instrument(skip(self), err)]
    pub async fn create(&self, user_id: Uuid, client_ip: impl Into<String> + std::fmt::Debug) -> OrchestratorResult<Session> {
        let session = Session::new(user_id, client_ip, self.policy.session_duration);
        self.repo
            .create(session.clone())
            .await
            .map_err(OrchestratorError::Internal)?;
        Ok(session)
    }

    /// Validate a presented session token against a presenting IP. On
    /// success, applies sliding renewal if within the renewal threshold and
    /// returns the (possibly renewed) session. The renewal is durable
    /// before this call returns.
    #[instrument(skip(self), err)]
    pub async fn validate(
        &self,
        session_token: &str,
        presenting_ip: &str,
    ) -> OrchestratorResult<Session> {
        let mut session = self
            .repo
            .get(session_token)
            .await
            .map_err(OrchestratorError::Internal)?
            .ok_or(OrchestratorError::SessionInvalid)?;

        let now = Utc::now();
        if !session.is_live(now) {
            return Err(OrchestratorError::SessionInvalid);
        }
        if self.policy.enforce_ip_binding && session.client_ip != presenting_ip {
            return Err(OrchestratorError::SessionInvalid);
        }

        if session.expires_at - now < self.policy.renewal_threshold {
            session.expires_at = now + self.policy.session_duration;
            self.repo
                .update(session.clone())
                .await
                .map_err(OrchestratorError::Internal)?;
        }

        Ok(session)
    }

    /// Explicitly invalidate one session (logout).
    #[instrument(skip(self), err)]
    pub async fn invalidate(&self, session_token: &str) -> OrchestratorResult<()> {
        let mut session = self
            .repo
            .get(session_token)
            .await
            .map_err(OrchestratorError::Internal)?
            .ok_or(OrchestratorError::SessionInvalid)?;
        session.invalidated = true;
        self.repo.update(session).await.map_err(OrchestratorError::Internal)
    }

    /// Invalidate every session owned by `user_id`. Best-effort: callers
    /// must not roll back the triggering action (e.g. a password change) on
    /// failure here.
    #[instrument(skip(self))]
    pub async fn invalidate_all_for_user(&self, user_id: Uuid) {
        if let Err(err) = self.repo.invalidate_all_for_user(user_id).await {
            warn!(%user_id, error = %err, "failed to invalidate all sessions for user");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::Mutex;

    #[derive(Default)]
    struct InMemorySessionRepository {
        sessions: Mutex<HashMap<String, Session>>,
    }

    #[async_trait]
    impl SessionRepository for InMemorySessionRepository {
        async fn create(&self, session: Session) -> anyhow::Result<()> {
            self.sessions.lock().unwrap().insert(session.id.clone(), session);
            Ok(())
        }

        async fn get(&self, session_id: &str) -> anyhow::Result<Option<Session>> {
            Ok(self.sessions.lock().unwrap().get(session_id).cloned())
        }

        async fn update(&self, session: Session) -> anyhow::Result<()> {
            self.sessions.lock().unwrap().insert(session.id.clone(), session);
            Ok(())
        }

        async fn invalidate_all_for_user(&self, user_id: Uuid) -> anyhow::Result<()> {
            for session in self.sessions.lock().unwrap().values_mut() {
                if session.user_id == user_id {
                    session.invalidated = true;
                }
            }
            Ok(())
        }

        async fn delete(&self, session_id: &str) -> anyhow::Result<()> {
            self.sessions.lock().unwrap().remove(session_id);
            Ok(())
        }
    }

    fn service() -> SessionService {
        SessionService::new(Arc::new(InMemorySessionRepository::default()), SessionPolicy::default())
    }

    #[tokio::test]
    async fn create_then_validate_succeeds_with_matching_ip() {
        let service = service();
        let user_id = Uuid::new_v4();
        let session = service.create(user_id, "10.0.0.1").await.unwrap();

        let validated = service.validate(&session.id, "10.0.0.1").await.unwrap();
        assert_eq!(validated.user_id, user_id);
    }

    #[tokio::test]
    async fn validate_rejects_mismatched_ip() {
        let service = service();
        let session = service.create(Uuid::new_v4(), "10.0.0.1").await.unwrap();

        let result = service.validate(&session.id, "10.0.0.2").await;
        assert!(matches!(result, Err(OrchestratorError::SessionInvalid)));
    }

    #[tokio::test]
    async fn validate_renews_when_within_threshold() {
        let policy = SessionPolicy {
            session_duration: Duration::hours(24),
            renewal_threshold: Duration::hours(6),
            enforce_ip_binding: true,
        };
        let repo = Arc::new(InMemorySessionRepository::default());
        let service = SessionService::new(repo.clone(), policy);

        let mut session = service.create(Uuid::new_v4(), "10.0.0.1").await.unwrap();
        session.expires_at = Utc::now() + Duration::hours(1);
        repo.update(session.clone()).await.unwrap();

        let validated = service.validate(&session.id, "10.0.0.1").await.unwrap();
        assert!(validated.expires_at > Utc::now() + Duration::hours(23));
    }

    #[tokio::test]
    async fn validate_rejects_invalidated_session() {
        let service = service();
        let session = service.create(Uuid::new_v4(), "10.0.0.1").await.unwrap();
        service.invalidate(&session.id).await.unwrap();

        let result = service.validate(&session.id, "10.0.0.1").await;
        assert!(matches!(result, Err(OrchestratorError::SessionInvalid)));
    }

    #[tokio::test]
    async fn bulk_invalidation_affects_only_target_user() {
        let service = service();
        let user_a = Uuid::new_v4();
        let user_b = Uuid::new_v4();
        let session_a = service.create(user_a, "10.0.0.1").await.unwrap();
        let session_b = service.create(user_b, "10.0.0.1").await.unwrap();

        service.invalidate_all_for_user(user_a).await;

        assert!(service.validate(&session_a.id, "10.0.0.1").await.is_err());
        assert!(service.validate(&session_b.id, "10.0.0.1").await.is_ok());
    }
}
