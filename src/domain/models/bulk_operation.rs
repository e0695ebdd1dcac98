//! Bulk operation records: an in-process, non-durable aggregate view over
//! the same phase kind across many campaigns.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BulkOperationType {
    DomainGeneration,
    DnsValidation,
    HttpValidation,
    Analysis,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BulkOperationStatus {
    Pending,
    Running,
    Completed,
    Failed,
    Cancelled,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BulkOperation {
    pub id: Uuid,
    pub op_type: BulkOperationType,
    pub campaign_ids: Vec<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub status: BulkOperationStatus,
    pub cancel_requested: bool,
}

impl BulkOperation {
    pub fn new(op_type: BulkOperationType, campaign_ids: Vec<Uuid>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            op_type,
            campaign_ids,
            created_at: now,
            updated_at: now,
            status: BulkOperationStatus::Pending,
            cancel_requested: false,
        }
    }
}

/// Per-campaign phase status fed into `aggregate()`; not persisted, just
/// the slice of state the bulk tracker needs from the campaign store.
#[derive(Debug, Clone, Copy)]
pub struct CampaignPhaseSnapshot {
    pub status: super::PhaseStatus,
    pub items_total: u64,
    pub items_processed: u64,
}

/// Aggregate progress/status over a bulk op's campaigns, per §4.4.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BulkAggregate {
    pub status: BulkOperationStatus,
    pub progress_pct: f64,
}

pub fn aggregate(cancel_requested: bool, snapshots: &[CampaignPhaseSnapshot]) -> BulkAggregate {
    use super::PhaseStatus;

    if cancel_requested {
        return BulkAggregate { status: BulkOperationStatus::Cancelled, progress_pct: 0.0 };
    }

    let status = if snapshots.iter().any(|s| s.status == PhaseStatus::Failed) {
        BulkOperationStatus::Failed
    } else if !snapshots.is_empty() && snapshots.iter().all(|s| s.status == PhaseStatus::Completed) {
        BulkOperationStatus::Completed
    } else if snapshots.iter().any(|s| s.status == PhaseStatus::InProgress) {
        BulkOperationStatus::Running
    } else {
        BulkOperationStatus::Pending
    };

    let sum_total: u64 = snapshots.iter().map(|s| s.items_total).sum();
    let sum_processed: u64 = snapshots.iter().map(|s| s.items_processed).sum();

    let progress_pct = if status == BulkOperationStatus::Completed {
        100.0
    } else if sum_total > 0 {
        100.0 * sum_processed as f64 / sum_total as f64
    } else {
        0.0
    };

    BulkAggregate { status, progress_pct }
}
