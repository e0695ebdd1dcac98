//! Bulk Operations Tracker: an in-process, non-durable progress view over
//! a bulk op's campaigns (§4.4, §9). Not source-of-truth — the underlying
//! per-phase statuses are durable; this registry rebuilds on demand.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::{instrument, warn};
use uuid::Uuid;

use crate::domain::errors::{OrchestratorError, OrchestratorResult};
use crate::domain::models::{
    aggregate_bulk_operation, BulkAggregate, BulkOperation, BulkOperationType, CampaignPhaseSnapshot,
    Phase, PhaseType,
};
use crate::domain::ports::CampaignStore;
use crate::services::campaign_orchestrator::CampaignOrchestrator;

fn phase_type_for(op_type: BulkOperationType) -> PhaseType {
    match op_type {
        BulkOperationType::DomainGeneration => PhaseType::DomainGeneration,
        BulkOperationType::DnsValidation => PhaseType::DnsValidation,
        BulkOperationType::HttpValidation => PhaseType::HttpKeywordValidation,
        BulkOperationType::Analysis => PhaseType::Analysis,
    }
}

pub struct BulkOperationsTracker {
    store: Arc<dyn CampaignStore>,
    operations: RwLock<HashMap<Uuid, BulkOperation>>,
}

impl BulkOperationsTracker {
    pub fn new(store: Arc<dyn CampaignStore>) -> Self {
        Self { store, operations: RwLock::new(HashMap::new()) }
    }

    #[instrument(skip(self, campaign_ids))]
    pub async fn new_operation(&self, op_type: BulkOperationType, campaign_ids: Vec<Uuid>) -> Uuid {
        let op = BulkOperation::new(op_type, campaign_ids);
        let id = op.id;
        self.operations.write().await.insert(id, op);
        id
    }

    /// Sums `items_processed`/`items_total` over the op's campaigns for its
    /// phase kind and derives the aggregate status/progress per §4.4.
    #[instrument(skip(self), err)]
    pub async fn aggregate(&self, id: Uuid) -> OrchestratorResult<BulkAggregate> {
        let op = self.operations.read().await.get(&id).cloned().ok_or_else(|| {
            OrchestratorError::Internal(anyhow::anyhow!("unknown bulk operation {id}"))
        })?;

        let phase_type = phase_type_for(op.op_type);
        let mut snapshots = Vec::with_capacity(op.campaign_ids.len());
        for campaign_id in &op.campaign_ids {
            // A campaign whose phase row doesn't exist yet is `not_started`,
            // not absent from the aggregate: dropping it would let a bulk op
            // with one never-configured campaign read as `completed` once
            // the rest finish.
            let phase = self
                .store
                .get_campaign_phase(*campaign_id, phase_type)
                .await
                .map_err(OrchestratorError::Internal)?
                .unwrap_or_else(|| Phase::not_started(*campaign_id, phase_type));
            snapshots.push(CampaignPhaseSnapshot {
                status: phase.status,
                items_total: phase.items_total,
                items_processed: phase.items_processed,
            });
        }

        Ok(aggregate_bulk_operation(op.cancel_requested, &snapshots))
    }

    /// Marks the op cancelled and best-effort cancels each child campaign's
    /// phase; individual failures are logged, not fatal.
    #[instrument(skip(self, orchestrator), err)]
    pub async fn cancel(
        &self,
        id: Uuid,
        orchestrator: &CampaignOrchestrator,
    ) -> OrchestratorResult<()> {
        let op = {
            let mut operations = self.operations.write().await;
            let op = operations.get_mut(&id).ok_or_else(|| {
                OrchestratorError::Internal(anyhow::anyhow!("unknown bulk operation {id}"))
            })?;
            op.cancel_requested = true;
            op.status = crate::domain::models::BulkOperationStatus::Cancelled;
            op.updated_at = chrono::Utc::now();
            op.clone()
        };

        let phase_type = phase_type_for(op.op_type);
        for campaign_id in &op.campaign_ids {
            if let Err(err) = orchestrator.cancel_phase(*campaign_id, phase_type).await {
                warn!(%campaign_id, error = %err, "best-effort cancel of child campaign phase failed");
            }
        }
        Ok(())
    }
}
