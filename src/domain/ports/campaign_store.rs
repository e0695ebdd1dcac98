//! Campaign store port: the persistence contract the orchestrator, the
//! domain listing service, and the bulk ops tracker all read and write
//! through. The SQL dialect and schema are infrastructure concerns; this
//! trait only fixes the operation set (§6 "Persisted state layout").

use anyhow::Result;
use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::models::{
    Campaign, CampaignDomainCounters, GeneratedDomain, Phase, PhaseExecution, PhaseStatus,
    PhaseType, ScoringProfile,
};

/// Partial update for a phase row; `None` fields are left untouched. This
/// mirrors `UpdateCampaignPhaseFields` from §6's abstract store contract.
#[derive(Debug, Clone, Default)]
pub struct PhaseFieldUpdate {
    pub status: Option<PhaseStatus>,
    pub configuration: Option<serde_json::Value>,
    pub items_total: Option<u64>,
    pub items_processed: Option<u64>,
    pub progress_pct: Option<f64>,
    pub last_error: Option<Option<String>>,
    pub started_at_now: bool,
    pub completed_at_now: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortField {
    RichnessScore,
    MicrocrawlGain,
    KeywordsUnique,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

/// Pagination + optional sort/filter for `list_generated_domains` (§4.6).
#[derive(Debug, Clone, Default)]
pub struct DomainPage {
    pub limit: u32,
    pub offset: u64,
    pub sort: Option<(SortField, SortDirection)>,
    pub warnings_only: bool,
}

#[async_trait]
pub trait CampaignStore: Send + Sync {
    // --- Campaign CRUD ---
    async fn create_campaign(&self, campaign: &Campaign) -> Result<()>;
    async fn get_campaign(&self, id: Uuid) -> Result<Option<Campaign>>;
    async fn update_campaign(&self, campaign: &Campaign) -> Result<()>;
    async fn delete_campaign(&self, id: Uuid) -> Result<()>;
    async fn list_campaigns(&self, limit: i64, offset: i64) -> Result<Vec<Campaign>>;

    // --- Phase CRUD ---
    async fn get_campaign_phase(&self, campaign_id: Uuid, phase_type: PhaseType) -> Result<Option<Phase>>;
    async fn upsert_campaign_phase(&self, phase: &Phase) -> Result<()>;
    async fn update_campaign_phase_fields(
        &self,
        campaign_id: Uuid,
        phase_type: PhaseType,
        fields: PhaseFieldUpdate,
    ) -> Result<()>;
    async fn list_campaign_phases(&self, campaign_id: Uuid) -> Result<Vec<Phase>>;

    // --- Phase executions (audit rows) ---
    async fn create_phase_execution(&self, execution: &PhaseExecution) -> Result<()>;
    async fn update_phase_execution(&self, execution: &PhaseExecution) -> Result<()>;
    async fn list_phase_executions(
        &self,
        campaign_id: Uuid,
        phase_type: PhaseType,
    ) -> Result<Vec<PhaseExecution>>;

    // --- Generated domains ---
    async fn insert_generated_domains(&self, domains: &[GeneratedDomain]) -> Result<()>;
    async fn update_generated_domain(&self, domain: &GeneratedDomain) -> Result<()>;
    async fn get_generated_domain(
        &self,
        campaign_id: Uuid,
        domain_name: &str,
    ) -> Result<Option<GeneratedDomain>>;
    async fn list_generated_domains(&self, campaign_id: Uuid, page: DomainPage) -> Result<Vec<GeneratedDomain>>;
    /// Every generated domain for a campaign, unpaginated. Used by counter
    /// reconciliation, which needs the full set to aggregate over.
    async fn list_all_generated_domains(&self, campaign_id: Uuid) -> Result<Vec<GeneratedDomain>>;

    // --- Counters ---
    async fn get_campaign_counters(&self, campaign_id: Uuid) -> Result<Option<CampaignDomainCounters>>;
    /// Atomic per campaign: concurrent reconcilers converge to the same row.
    async fn upsert_campaign_counters(
        &self,
        campaign_id: Uuid,
        counters: CampaignDomainCounters,
    ) -> Result<()>;

    // --- Scoring profiles ---
    async fn create_scoring_profile(&self, profile: &ScoringProfile) -> Result<()>;
    async fn get_scoring_profile(&self, id: Uuid) -> Result<Option<ScoringProfile>>;
    async fn update_scoring_profile(&self, profile: &ScoringProfile) -> Result<()>;
    async fn get_campaign_scoring_profile(&self, campaign_id: Uuid) -> Result<Option<ScoringProfile>>;
    async fn set_campaign_scoring_profile(&self, campaign_id: Uuid, profile_id: Uuid) -> Result<()>;
}
