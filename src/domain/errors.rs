//! Domain errors for the campaign orchestration core.

use thiserror::Error;
use uuid::Uuid;

use crate::domain::models::PhaseType;

/// The closed set of error kinds the orchestrator surfaces to callers.
///
/// Every variant maps to exactly one of the error kinds named in the
/// external error envelope; callers switch on kind, not on message text.
#[derive(Debug, Error)]
pub enum OrchestratorError {
    #[error("invalid phase configuration: {reason}")]
    InvalidConfig { reason: String },

    #[error("phase {phase:?} gated: requires {required_state}, current state {current_state}")]
    PhaseGating {
        phase: PhaseType,
        current_state: String,
        required_state: String,
    },

    #[error("phase {phase:?} is not running")]
    PhaseNotRunning { phase: PhaseType },

    #[error("phase {phase:?} already running: {current_state}")]
    PhaseRunning {
        phase: PhaseType,
        current_state: String,
        required_state: String,
    },

    #[error("campaign not found: {0}")]
    CampaignNotFound(Uuid),

    #[error("domain not found: {domain}")]
    DomainNotFound { campaign_id: Uuid, domain: String },

    #[error("session invalid")]
    SessionInvalid,

    #[error("conflicting duplicate: {0}")]
    ConflictDuplicate(String),

    /// Not a failure: the caller's idempotency key matched a prior
    /// recorded outcome, which is carried in this variant so callers can
    /// still pattern-match it alongside real errors where convenient.
    #[error("idempotent replay")]
    IdempotentReplay,

    #[error("internal error: {0}")]
    Internal(#[source] anyhow::Error),
}

pub type OrchestratorResult<T> = Result<T, OrchestratorError>;

impl OrchestratorError {
    /// True for errors that are routine control-flow outcomes rather than
    /// infrastructure failures (HTTP 4xx-class, never 5xx).
    pub const fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidConfig { .. }
                | Self::PhaseGating { .. }
                | Self::PhaseNotRunning { .. }
                | Self::PhaseRunning { .. }
                | Self::CampaignNotFound(_)
                | Self::DomainNotFound { .. }
                | Self::SessionInvalid
                | Self::ConflictDuplicate(_)
        )
    }
}

impl From<sqlx::Error> for OrchestratorError {
    fn from(err: sqlx::Error) -> Self {
        Self::Internal(anyhow::anyhow!(err))
    }
}

impl From<serde_json::Error> for OrchestratorError {
    fn from(err: serde_json::Error) -> Self {
        Self::Internal(anyhow::anyhow!(err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn phase_gating_display_carries_states() {
        let err = OrchestratorError::PhaseGating {
            phase: PhaseType::Analysis,
            current_state: "in_progress".to_string(),
            required_state: "http_keyword_validation must be completed".to_string(),
        };
        assert!(err.to_string().contains("http_keyword_validation"));
    }

    #[test]
    fn client_error_classification() {
        assert!(OrchestratorError::CampaignNotFound(Uuid::nil()).is_client_error());
        assert!(!OrchestratorError::Internal(anyhow::anyhow!("boom")).is_client_error());
    }
}
