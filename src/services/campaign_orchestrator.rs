//! Campaign Orchestrator: phase gating, campaign-state derivation, restart
//! idempotency, and scoring dispatch (§4.2).

use std::collections::BTreeMap;
use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Duration as ChronoDuration, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::{Mutex, RwLock};
use tracing::instrument;
use uuid::Uuid;

use crate::domain::errors::{OrchestratorError, OrchestratorResult};
use crate::domain::models::{
    Campaign, CampaignDomainCounters, GeneratedDomain, Phase, PhaseExecution, PhaseStatus,
    PhaseType, ScoreBreakdown, PHASE_ORDER,
};
use crate::domain::ports::{CampaignStore, PhaseFieldUpdate};
use crate::services::event_bus::{EventBus, EventEnvelope};
use crate::services::phase_service::PhaseConfiguration;

/// Result of `restart_analysis`, per §6's `/analysis/restart` response
/// shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RestartOutcome {
    pub previous_state: PhaseStatus,
    pub current_state: PhaseStatus,
    pub idempotent: bool,
}

struct IdempotencyEntry {
    outcome: Value,
    recorded_at: DateTime<Utc>,
}

/// `(campaign_id, operation_kind, key)` → prior outcome, with TTL and
/// per-key serialization (§4.2, §9). Single-node, in-process.
struct IdempotencyStore {
    entries: RwLock<HashMap<(Uuid, String, String), IdempotencyEntry>>,
    locks: RwLock<HashMap<(Uuid, String, String), Arc<Mutex<()>>>>,
    ttl: ChronoDuration,
}

impl IdempotencyStore {
    fn new(ttl: ChronoDuration) -> Self {
        Self { entries: RwLock::new(HashMap::new()), locks: RwLock::new(HashMap::new()), ttl }
    }

    async fn lock_for(&self, key: (Uuid, String, String)) -> Arc<Mutex<()>> {
        if let Some(lock) = self.locks.read().await.get(&key) {
            return lock.clone();
        }
        let mut locks = self.locks.write().await;
        locks.entry(key).or_insert_with(|| Arc::new(Mutex::new(()))).clone()
    }

    /// Run `compute` unless a live (within TTL) outcome already exists for
    /// `key`, in which case that outcome is replayed. Concurrent callers
    /// with the same key serialize on the key's mutex; the first writer
    /// records the outcome.
    async fn replay_or_compute<F, Fut>(
        &self,
        campaign_id: Uuid,
        operation_kind: &str,
        key: &str,
        compute: F,
    ) -> OrchestratorResult<(Value, bool)>
    where
        F: FnOnce() -> Fut,
        Fut: std::future::Future<Output = OrchestratorResult<Value>>,
    {
        let cache_key = (campaign_id, operation_kind.to_string(), key.to_string());
        let per_key_lock = self.lock_for(cache_key.clone()).await;
        let _guard = per_key_lock.lock().await;

        let now = Utc::now();
        if let Some(entry) = self.entries.read().await.get(&cache_key) {
            if now - entry.recorded_at < self.ttl {
                return Ok((entry.outcome.clone(), true));
            }
        }

        let outcome = compute().await?;
        self.entries.write().await.insert(
            cache_key,
            IdempotencyEntry { outcome: outcome.clone(), recorded_at: now },
        );
        Ok((outcome, false))
    }
}

/// Serializes configure/start/cancel for a given `(campaign_id, phase_type)`
/// per §5; reads never block on it.
struct PhaseLocks {
    locks: RwLock<HashMap<(Uuid, PhaseType), Arc<Mutex<()>>>>,
}

impl PhaseLocks {
    fn new() -> Self {
        Self { locks: RwLock::new(HashMap::new()) }
    }

    async fn acquire(&self, campaign_id: Uuid, phase_type: PhaseType) -> Arc<Mutex<()>> {
        let key = (campaign_id, phase_type);
        if let Some(lock) = self.locks.read().await.get(&key) {
            return lock.clone();
        }
        let mut locks = self.locks.write().await;
        locks.entry(key).or_insert_with(|| Arc::new(Mutex::new(()))).clone()
    }
}

pub struct CampaignOrchestrator {
    store: Arc<dyn CampaignStore>,
    events: EventBus,
    idempotency: IdempotencyStore,
    phase_locks: PhaseLocks,
}

impl CampaignOrchestrator {
    pub fn new(store: Arc<dyn CampaignStore>, events: EventBus, idempotency_ttl: ChronoDuration) -> Self {
        Self { store, events, idempotency: IdempotencyStore::new(idempotency_ttl), phase_locks: PhaseLocks::new() }
    }

    async fn load_campaign(&self, campaign_id: Uuid) -> OrchestratorResult<Campaign> {
        self.store
            .get_campaign(campaign_id)
            .await
            .map_err(OrchestratorError::Internal)?
            .ok_or(OrchestratorError::CampaignNotFound(campaign_id))
    }

    async fn load_phase(&self, campaign_id: Uuid, phase_type: PhaseType) -> OrchestratorResult<Phase> {
        self.store
            .get_campaign_phase(campaign_id, phase_type)
            .await
            .map_err(OrchestratorError::Internal)?
            .map_or_else(|| Ok(Phase::not_started(campaign_id, phase_type)), Ok)
    }

    /// Recompute and persist campaign-level derived state from its phases.
    async fn recompute_campaign_state(&self, campaign_id: Uuid) -> OrchestratorResult<()> {
        let phases = self.store.list_campaign_phases(campaign_id).await.map_err(OrchestratorError::Internal)?;
        let mut campaign = self.load_campaign(campaign_id).await?;
        let pairs: Vec<(PhaseType, PhaseStatus)> = phases.iter().map(|p| (p.phase_type, p.status)).collect();
        campaign.recompute_from_phases(&pairs);
        self.store.update_campaign(&campaign).await.map_err(OrchestratorError::Internal)
    }

    fn publish(&self, event_type: &str, campaign_id: Uuid, data: Value) {
        self.events.publish(EventEnvelope::new(event_type, Some(campaign_id), data));
    }

    /// Pure: checks a configuration map against the schema for `phase_type`
    /// without touching the store.
    pub fn validate_phase_configuration(&self, phase_type: PhaseType, cfg: &Value) -> OrchestratorResult<()> {
        PhaseConfiguration::parse(phase_type, cfg).map(|_| ())
    }

    #[instrument(skip(self, cfg), err)]
    pub async fn configure_phase(
        &self,
        campaign_id: Uuid,
        phase_type: PhaseType,
        cfg: Value,
    ) -> OrchestratorResult<Phase> {
        self.load_campaign(campaign_id).await?;
        PhaseConfiguration::parse(phase_type, &cfg)?;

        let lock = self.phase_locks.acquire(campaign_id, phase_type).await;
        let _guard = lock.lock().await;

        let mut phase = self.load_phase(campaign_id, phase_type).await?;
        phase.configuration = Some(cfg);
        phase.status = PhaseStatus::Configured;
        self.store.upsert_campaign_phase(&phase).await.map_err(OrchestratorError::Internal)?;
        self.recompute_campaign_state(campaign_id).await?;
        Ok(phase)
    }

    /// Requires every strictly-upstream phase `completed` and this phase
    /// `configured|ready|paused`; otherwise `PHASE_GATING` names the first
    /// non-completed upstream (or this phase itself) as `requiredState`.
    #[instrument(skip(self), err)]
    pub async fn start_phase(&self, campaign_id: Uuid, phase_type: PhaseType) -> OrchestratorResult<Phase> {
        self.load_campaign(campaign_id).await?;

        for upstream in phase_type.upstream() {
            let upstream_phase = self.load_phase(campaign_id, *upstream).await?;
            if upstream_phase.status != PhaseStatus::Completed {
                return Err(OrchestratorError::PhaseGating {
                    phase: phase_type,
                    current_state: format!("{:?}", upstream_phase.status),
                    required_state: format!("{} must be completed", upstream.as_str()),
                });
            }
        }

        let lock = self.phase_locks.acquire(campaign_id, phase_type).await;
        let _guard = lock.lock().await;

        let mut phase = self.load_phase(campaign_id, phase_type).await?;
        if !matches!(phase.status, PhaseStatus::Configured | PhaseStatus::Ready | PhaseStatus::Paused) {
            return Err(OrchestratorError::PhaseGating {
                phase: phase_type,
                current_state: format!("{:?}", phase.status),
                required_state: "configured, ready, or paused".to_string(),
            });
        }

        phase.status = PhaseStatus::InProgress;
        phase.started_at = Some(Utc::now());
        self.store
            .update_campaign_phase_fields(
                campaign_id,
                phase_type,
                PhaseFieldUpdate {
                    status: Some(PhaseStatus::InProgress),
                    started_at_now: true,
                    ..Default::default()
                },
            )
            .await
            .map_err(OrchestratorError::Internal)?;

        let execution = PhaseExecution::new(campaign_id, phase_type);
        self.store.create_phase_execution(&execution).await.map_err(OrchestratorError::Internal)?;

        self.recompute_campaign_state(campaign_id).await?;
        self.publish("phase_started", campaign_id, serde_json::json!({ "phase": phase_type.as_str() }));

        Ok(phase)
    }

    #[instrument(skip(self), err)]
    pub async fn get_phase_status(&self, campaign_id: Uuid, phase_type: PhaseType) -> OrchestratorResult<Phase> {
        self.load_campaign(campaign_id).await?;
        self.load_phase(campaign_id, phase_type).await
    }

    /// Fails with `PHASE_NOT_RUNNING` when the phase isn't `in_progress`;
    /// on success the phase returns to `paused` so it can be restarted.
    #[instrument(skip(self), err)]
    pub async fn cancel_phase(&self, campaign_id: Uuid, phase_type: PhaseType) -> OrchestratorResult<Phase> {
        self.load_campaign(campaign_id).await?;

        let lock = self.phase_locks.acquire(campaign_id, phase_type).await;
        let _guard = lock.lock().await;

        let mut phase = self.load_phase(campaign_id, phase_type).await?;
        if phase.status != PhaseStatus::InProgress {
            return Err(OrchestratorError::PhaseNotRunning { phase: phase_type });
        }

        phase.status = PhaseStatus::Paused;
        self.store
            .update_campaign_phase_fields(
                campaign_id,
                phase_type,
                PhaseFieldUpdate { status: Some(PhaseStatus::Paused), ..Default::default() },
            )
            .await
            .map_err(OrchestratorError::Internal)?;

        if let Some(mut execution) = self
            .store
            .list_phase_executions(campaign_id, phase_type)
            .await
            .map_err(OrchestratorError::Internal)?
            .into_iter()
            .filter(|e| e.status == crate::domain::models::ExecutionStatus::Running)
            .max_by_key(|e| e.created_at)
        {
            execution.status = crate::domain::models::ExecutionStatus::Cancelled;
            execution.completed_at = Some(Utc::now());
            self.store.update_phase_execution(&execution).await.map_err(OrchestratorError::Internal)?;
        }

        self.recompute_campaign_state(campaign_id).await?;
        self.publish("phase_cancelled", campaign_id, serde_json::json!({ "phase": phase_type.as_str() }));
        Ok(phase)
    }

    /// The hardest control operation (§4.2). Idempotent within the TTL
    /// window when `idempotency_key` is supplied: a replayed call returns
    /// the first call's `{previous_state, current_state}` with
    /// `idempotent=true`.
    #[instrument(skip(self), err)]
    pub async fn restart_analysis(
        &self,
        campaign_id: Uuid,
        idempotency_key: Option<String>,
    ) -> OrchestratorResult<RestartOutcome> {
        self.load_campaign(campaign_id).await?;

        if let Some(key) = idempotency_key {
            let (value, replayed) = self
                .idempotency
                .replay_or_compute(campaign_id, "restart_analysis", &key, || {
                    self.perform_analysis_restart(campaign_id)
                })
                .await?;
            let stored: RestartOutcome =
                serde_json::from_value(value).map_err(|e| OrchestratorError::Internal(e.into()))?;
            return Ok(RestartOutcome { idempotent: replayed, ..stored });
        }

        let outcome_value = self.perform_analysis_restart(campaign_id).await?;
        let stored: RestartOutcome =
            serde_json::from_value(outcome_value).map_err(|e| OrchestratorError::Internal(e.into()))?;
        Ok(RestartOutcome { idempotent: false, ..stored })
    }

    async fn perform_analysis_restart(&self, campaign_id: Uuid) -> OrchestratorResult<Value> {
        let lock = self.phase_locks.acquire(campaign_id, PhaseType::Analysis).await;
        let _guard = lock.lock().await;

        let http_phase = self.load_phase(campaign_id, PhaseType::HttpKeywordValidation).await?;
        if http_phase.status != PhaseStatus::Completed {
            return Err(OrchestratorError::PhaseGating {
                phase: PhaseType::Analysis,
                current_state: format!("{:?}", http_phase.status),
                required_state: "http_keyword_validation must be completed".to_string(),
            });
        }

        let mut analysis = self.load_phase(campaign_id, PhaseType::Analysis).await?;
        if analysis.status == PhaseStatus::InProgress {
            return Err(OrchestratorError::PhaseRunning {
                phase: PhaseType::Analysis,
                current_state: "in_progress".to_string(),
                required_state: "analysis must not be running".to_string(),
            });
        }

        let previous_state = analysis.status;
        analysis.status = PhaseStatus::InProgress;
        analysis.started_at = Some(Utc::now());
        self.store
            .update_campaign_phase_fields(
                campaign_id,
                PhaseType::Analysis,
                PhaseFieldUpdate {
                    status: Some(PhaseStatus::InProgress),
                    started_at_now: true,
                    ..Default::default()
                },
            )
            .await
            .map_err(OrchestratorError::Internal)?;

        let execution = PhaseExecution::new(campaign_id, PhaseType::Analysis);
        self.store.create_phase_execution(&execution).await.map_err(OrchestratorError::Internal)?;

        self.recompute_campaign_state(campaign_id).await?;
        self.publish("analysis_restarted", campaign_id, Value::Null);

        let outcome = RestartOutcome {
            previous_state,
            current_state: PhaseStatus::InProgress,
            idempotent: false,
        };
        serde_json::to_value(outcome).map_err(|e| OrchestratorError::Internal(e.into()))
    }

    /// Launches a fresh analysis run over all ready domains. Unlike
    /// `restart_analysis`, this does not gate on the phase's current
    /// status and carries no idempotency key; it is safe to call
    /// concurrently with reads. A domain is "ready" once it has passed HTTP
    /// keyword validation, since that is the feature data analysis scores
    /// against.
    #[instrument(skip(self), err)]
    pub async fn rescore_campaign(&self, campaign_id: Uuid) -> OrchestratorResult<PhaseExecution> {
        self.load_campaign(campaign_id).await?;

        let domains =
            self.store.list_all_generated_domains(campaign_id).await.map_err(OrchestratorError::Internal)?;
        let ready_count =
            domains.iter().filter(|d| d.http_status == crate::domain::models::FourWayStatus::Ok).count() as u64;

        // `upsert`, not `update_campaign_phase_fields`: a campaign rescored
        // before `analysis` was ever configured has no phase row yet, and a
        // bare `UPDATE ... WHERE` would silently touch zero rows.
        let mut analysis = self.load_phase(campaign_id, PhaseType::Analysis).await?;
        analysis.items_total = ready_count;
        analysis.items_processed = 0;
        self.store.upsert_campaign_phase(&analysis).await.map_err(OrchestratorError::Internal)?;

        let execution = PhaseExecution::new(campaign_id, PhaseType::Analysis);
        self.store.create_phase_execution(&execution).await.map_err(OrchestratorError::Internal)?;
        self.publish(
            "rescore_started",
            campaign_id,
            serde_json::json!({ "ready_domain_count": ready_count }),
        );
        Ok(execution)
    }

    /// Components, weights, final score, and the parked-penalty factor for
    /// one domain under the campaign's associated scoring profile.
    #[instrument(skip(self), err)]
    pub async fn score_breakdown_full(
        &self,
        campaign_id: Uuid,
        domain_name: &str,
    ) -> OrchestratorResult<ScoreBreakdown> {
        let domain = self
            .store
            .get_generated_domain(campaign_id, domain_name)
            .await
            .map_err(OrchestratorError::Internal)?
            .ok_or_else(|| OrchestratorError::DomainNotFound {
                campaign_id,
                domain: domain_name.to_string(),
            })?;

        let profile = self
            .store
            .get_campaign_scoring_profile(campaign_id)
            .await
            .map_err(OrchestratorError::Internal)?
            .ok_or_else(|| OrchestratorError::InvalidConfig {
                reason: "no scoring profile associated with campaign".to_string(),
            })?;

        let feature = |name: &str| -> f64 {
            match name {
                "richness_score" => domain.richness_score.unwrap_or(0.0),
                "microcrawl_gain" => domain.microcrawl_gain.unwrap_or(0.0),
                "keywords_unique" => domain.keywords_unique.unwrap_or(0.0),
                _ => 0.0,
            }
        };

        let mut components = BTreeMap::new();
        for (name, weight) in &profile.weights {
            components.insert(name.clone(), feature(name) * weight);
        }

        let raw_total: f64 = components.values().sum();
        let final_score =
            if domain.has_warning() { raw_total * profile.parked_penalty_factor } else { raw_total };

        Ok(ScoreBreakdown {
            domain_name: domain.domain_name,
            components,
            weights: profile.weights,
            final_score,
            parked_penalty_factor: profile.parked_penalty_factor,
        })
    }

    /// Aggregate over a campaign's generated domains and upsert the
    /// counters row (§4.6's counter-reconciliation invariant).
    #[instrument(skip(self), err)]
    pub async fn reconcile_counters(&self, campaign_id: Uuid) -> OrchestratorResult<CampaignDomainCounters> {
        let domains: Vec<GeneratedDomain> =
            self.store.list_all_generated_domains(campaign_id).await.map_err(OrchestratorError::Internal)?;
        let counters = CampaignDomainCounters::aggregate(&domains);
        self.store.upsert_campaign_counters(campaign_id, counters).await.map_err(OrchestratorError::Internal)?;
        Ok(counters)
    }

    /// For tests and callers that need the fixed pipeline order without
    /// importing `PHASE_ORDER` directly.
    pub const fn phase_order(&self) -> &'static [PhaseType] {
        &PHASE_ORDER
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::sqlite::{create_migrated_test_pool, SqliteCampaignStore};
    use crate::services::event_bus::EventBusConfig;

    async fn orchestrator() -> (CampaignOrchestrator, Arc<dyn CampaignStore>) {
        let pool = create_migrated_test_pool().await.unwrap();
        let store: Arc<dyn CampaignStore> = Arc::new(SqliteCampaignStore::new(pool));
        let events = EventBus::new(EventBusConfig::default());
        let orchestrator =
            CampaignOrchestrator::new(store.clone(), events, ChronoDuration::hours(24));
        (orchestrator, store)
    }

    async fn seed_campaign(store: &Arc<dyn CampaignStore>) -> Campaign {
        let campaign = Campaign::new("acme-q3");
        store.create_campaign(&campaign).await.unwrap();
        campaign
    }

    fn dns_cfg() -> Value {
        serde_json::json!({ "stealth_enabled": false, "batch_size": 10, "resolvers": ["1.1.1.1"] })
    }

    #[tokio::test]
    async fn start_phase_refuses_when_upstream_not_completed() {
        let (orchestrator, store) = orchestrator().await;
        let campaign = seed_campaign(&store).await;

        let result = orchestrator.start_phase(campaign.id, PhaseType::DnsValidation).await;
        assert!(matches!(result, Err(OrchestratorError::PhaseGating { .. })));
    }

    #[tokio::test]
    async fn configure_then_start_succeeds_once_upstream_completed() {
        let (orchestrator, store) = orchestrator().await;
        let campaign = seed_campaign(&store).await;

        let mut upstream = Phase::not_started(campaign.id, PhaseType::DomainGeneration);
        upstream.status = PhaseStatus::Completed;
        store.upsert_campaign_phase(&upstream).await.unwrap();

        orchestrator.configure_phase(campaign.id, PhaseType::DnsValidation, dns_cfg()).await.unwrap();
        let started = orchestrator.start_phase(campaign.id, PhaseType::DnsValidation).await.unwrap();
        assert_eq!(started.status, PhaseStatus::InProgress);
    }

    #[tokio::test]
    async fn cancel_phase_rejects_when_not_running() {
        let (orchestrator, store) = orchestrator().await;
        let campaign = seed_campaign(&store).await;

        let result = orchestrator.cancel_phase(campaign.id, PhaseType::DnsValidation).await;
        assert!(matches!(result, Err(OrchestratorError::PhaseNotRunning { .. })));
    }

    #[tokio::test]
    async fn restart_analysis_gated_when_http_not_completed() {
        let (orchestrator, store) = orchestrator().await;
        let campaign = seed_campaign(&store).await;

        let result = orchestrator.restart_analysis(campaign.id, None).await;
        assert!(matches!(result, Err(OrchestratorError::PhaseGating { .. })));
    }

    #[tokio::test]
    async fn restart_analysis_happy_path() {
        let (orchestrator, store) = orchestrator().await;
        let campaign = seed_campaign(&store).await;

        for phase_type in
            [PhaseType::DomainGeneration, PhaseType::DnsValidation, PhaseType::HttpKeywordValidation]
        {
            let mut phase = Phase::not_started(campaign.id, phase_type);
            phase.status = PhaseStatus::Completed;
            store.upsert_campaign_phase(&phase).await.unwrap();
        }
        let mut analysis = Phase::not_started(campaign.id, PhaseType::Analysis);
        analysis.status = PhaseStatus::Completed;
        store.upsert_campaign_phase(&analysis).await.unwrap();

        let outcome = orchestrator.restart_analysis(campaign.id, None).await.unwrap();
        assert_eq!(outcome.previous_state, PhaseStatus::Completed);
        assert_eq!(outcome.current_state, PhaseStatus::InProgress);
        assert!(!outcome.idempotent);
    }

    #[tokio::test]
    async fn restart_analysis_rejects_when_already_running() {
        let (orchestrator, store) = orchestrator().await;
        let campaign = seed_campaign(&store).await;

        let mut http_phase = Phase::not_started(campaign.id, PhaseType::HttpKeywordValidation);
        http_phase.status = PhaseStatus::Completed;
        store.upsert_campaign_phase(&http_phase).await.unwrap();

        let mut analysis = Phase::not_started(campaign.id, PhaseType::Analysis);
        analysis.status = PhaseStatus::InProgress;
        store.upsert_campaign_phase(&analysis).await.unwrap();

        let result = orchestrator.restart_analysis(campaign.id, None).await;
        assert!(matches!(result, Err(OrchestratorError::PhaseRunning { .. })));
    }

    #[tokio::test]
    async fn restart_analysis_is_idempotent_for_the_same_key() {
        let (orchestrator, store) = orchestrator().await;
        let campaign = seed_campaign(&store).await;

        let mut http_phase = Phase::not_started(campaign.id, PhaseType::HttpKeywordValidation);
        http_phase.status = PhaseStatus::Completed;
        store.upsert_campaign_phase(&http_phase).await.unwrap();

        let first = orchestrator
            .restart_analysis(campaign.id, Some("key-1".to_string()))
            .await
            .unwrap();
        assert!(!first.idempotent);

        let second = orchestrator
            .restart_analysis(campaign.id, Some("key-1".to_string()))
            .await
            .unwrap();
        assert!(second.idempotent);
        assert_eq!(first.previous_state, second.previous_state);
        assert_eq!(first.current_state, second.current_state);
    }

    #[tokio::test]
    async fn score_breakdown_reports_domain_not_found() {
        let (orchestrator, store) = orchestrator().await;
        let campaign = seed_campaign(&store).await;

        let result = orchestrator.score_breakdown_full(campaign.id, "missing.example").await;
        assert!(matches!(result, Err(OrchestratorError::DomainNotFound { .. })));
    }

    #[tokio::test]
    async fn rescore_campaign_counts_only_http_validated_domains() {
        let (orchestrator, store) = orchestrator().await;
        let campaign = seed_campaign(&store).await;

        let mut ready_one = GeneratedDomain::new(campaign.id, "ready-one.example", 0);
        ready_one.http_status = crate::domain::models::FourWayStatus::Ok;
        let mut ready_two = GeneratedDomain::new(campaign.id, "ready-two.example", 1);
        ready_two.http_status = crate::domain::models::FourWayStatus::Ok;
        let mut not_ready = GeneratedDomain::new(campaign.id, "not-ready.example", 2);
        not_ready.http_status = crate::domain::models::FourWayStatus::Pending;
        store.insert_generated_domains(&[ready_one, ready_two, not_ready]).await.unwrap();

        orchestrator.rescore_campaign(campaign.id).await.unwrap();

        let analysis = store.get_campaign_phase(campaign.id, PhaseType::Analysis).await.unwrap().unwrap();
        assert_eq!(analysis.items_total, 2);
        assert_eq!(analysis.items_processed, 0);
    }

    #[tokio::test]
    async fn reconcile_counters_matches_domain_aggregate() {
        let (orchestrator, store) = orchestrator().await;
        let campaign = seed_campaign(&store).await;
        let domains = vec![GeneratedDomain::new(campaign.id, "a.example", 0)];
        store.insert_generated_domains(&domains).await.unwrap();

        let counters = orchestrator.reconcile_counters(campaign.id).await.unwrap();
        assert_eq!(counters.total_domains, 1);
        assert!(counters.satisfies_sum_invariant());
    }
}
