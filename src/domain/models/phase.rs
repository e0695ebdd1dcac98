//! Phase and phase-execution models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// The four phase kinds, in the fixed order a campaign runs them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PhaseType {
    DomainGeneration,
    DnsValidation,
    HttpKeywordValidation,
    Analysis,
}

/// The fixed pipeline order. `start_phase` gating walks this list.
pub const PHASE_ORDER: [PhaseType; 4] = [
    PhaseType::DomainGeneration,
    PhaseType::DnsValidation,
    PhaseType::HttpKeywordValidation,
    PhaseType::Analysis,
];

impl PhaseType {
    /// Phases that must be `Completed` before this phase may start.
    pub fn upstream(self) -> &'static [PhaseType] {
        let idx = PHASE_ORDER.iter().position(|p| *p == self).expect("phase in PHASE_ORDER");
        &PHASE_ORDER[..idx]
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::DomainGeneration => "domain_generation",
            Self::DnsValidation => "dns_validation",
            Self::HttpKeywordValidation => "http_keyword_validation",
            Self::Analysis => "analysis",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PhaseStatus {
    NotStarted,
    Ready,
    Configured,
    InProgress,
    Paused,
    Completed,
    Failed,
}

impl PhaseStatus {
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }
}

/// A campaign phase row: one per (campaign, phase_type).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Phase {
    pub campaign_id: Uuid,
    pub phase_type: PhaseType,
    pub status: PhaseStatus,
    pub configuration: Option<Value>,
    pub items_total: u64,
    pub items_processed: u64,
    pub progress_pct: f64,
    pub last_error: Option<String>,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl Phase {
    pub fn not_started(campaign_id: Uuid, phase_type: PhaseType) -> Self {
        Self {
            campaign_id,
            phase_type,
            status: PhaseStatus::NotStarted,
            configuration: None,
            items_total: 0,
            items_processed: 0,
            progress_pct: 0.0,
            last_error: None,
            started_at: None,
            completed_at: None,
        }
    }

    /// `items_processed` never exceeds `items_total`, `progress_pct` stays
    /// within `0..=100`, and a completed phase always reports 100%.
    pub fn satisfies_progress_invariant(&self) -> bool {
        if self.items_processed > self.items_total && self.items_total > 0 {
            return false;
        }
        if !(0.0..=100.0).contains(&self.progress_pct) {
            return false;
        }
        if self.status == PhaseStatus::Completed && (self.progress_pct - 100.0).abs() > f64::EPSILON {
            return false;
        }
        true
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionStatus {
    Queued,
    Running,
    Succeeded,
    Failed,
    Cancelled,
}

/// Structured detail for a failed phase execution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorDetails {
    pub code: String,
    pub message: String,
    pub context: Value,
}

/// An audit row for one attempt to run a phase.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PhaseExecution {
    pub id: Uuid,
    pub campaign_id: Uuid,
    pub phase_type: PhaseType,
    pub status: ExecutionStatus,
    pub error_details: Option<ErrorDetails>,
    pub created_at: DateTime<Utc>,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl PhaseExecution {
    pub fn new(campaign_id: Uuid, phase_type: PhaseType) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            campaign_id,
            phase_type,
            status: ExecutionStatus::Queued,
            error_details: None,
            created_at: now,
            started_at: None,
            completed_at: None,
        }
    }
}

/// A single progress update emitted by a running Phase.execute().
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgressItem {
    pub items_total: u64,
    pub items_processed: u64,
    pub last_error: Option<String>,
    pub transient_status: PhaseStatus,
}
