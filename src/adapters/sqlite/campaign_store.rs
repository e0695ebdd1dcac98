//! SQLite implementation of the CampaignStore port.

use async_trait::async_trait;
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::domain::errors::OrchestratorResult;
use crate::domain::models::{
    Campaign, CampaignDomainCounters, ErrorDetails, ExecutionStatus, GeneratedDomain, Phase,
    PhaseExecution, PhaseStatus, PhaseType, ScoringProfile,
};
use crate::domain::ports::{CampaignStore, DomainPage, PhaseFieldUpdate, SortDirection, SortField};

#[derive(Clone)]
pub struct SqliteCampaignStore {
    pool: SqlitePool,
}

impl SqliteCampaignStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CampaignStore for SqliteCampaignStore {
    async fn create_campaign(&self, campaign: &Campaign) -> anyhow::Result<()> {
        sqlx::query(
            r"INSERT INTO campaigns (id, name, created_at, updated_at, campaign_type,
               total_phases, completed_phases, is_full_sequence_mode, current_phase,
               phase_status, started_at, completed_at, estimated_completion_at)
               VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(campaign.id.to_string())
        .bind(&campaign.name)
        .bind(campaign.created_at.to_rfc3339())
        .bind(campaign.updated_at.to_rfc3339())
        .bind(&campaign.campaign_type)
        .bind(campaign.total_phases as i64)
        .bind(campaign.completed_phases as i64)
        .bind(campaign.is_full_sequence_mode)
        .bind(campaign.current_phase.map(PhaseType::as_str))
        .bind(campaign.phase_status.map(phase_status_str))
        .bind(campaign.started_at.map(|t| t.to_rfc3339()))
        .bind(campaign.completed_at.map(|t| t.to_rfc3339()))
        .bind(campaign.estimated_completion_at.map(|t| t.to_rfc3339()))
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn get_campaign(&self, id: Uuid) -> anyhow::Result<Option<Campaign>> {
        let row: Option<CampaignRow> = sqlx::query_as("SELECT * FROM campaigns WHERE id = ?")
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await?;
        row.map(TryInto::try_into).transpose().map_err(Into::into)
    }

    async fn update_campaign(&self, campaign: &Campaign) -> anyhow::Result<()> {
        sqlx::query(
            r"UPDATE campaigns SET name = ?, updated_at = ?, completed_phases = ?,
               is_full_sequence_mode = ?, current_phase = ?, phase_status = ?,
               started_at = ?, completed_at = ?, estimated_completion_at = ?
               WHERE id = ?",
        )
        .bind(&campaign.name)
        .bind(campaign.updated_at.to_rfc3339())
        .bind(campaign.completed_phases as i64)
        .bind(campaign.is_full_sequence_mode)
        .bind(campaign.current_phase.map(PhaseType::as_str))
        .bind(campaign.phase_status.map(phase_status_str))
        .bind(campaign.started_at.map(|t| t.to_rfc3339()))
        .bind(campaign.completed_at.map(|t| t.to_rfc3339()))
        .bind(campaign.estimated_completion_at.map(|t| t.to_rfc3339()))
        .bind(campaign.id.to_string())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn delete_campaign(&self, id: Uuid) -> anyhow::Result<()> {
        sqlx::query("DELETE FROM campaigns WHERE id = ?")
            .bind(id.to_string())
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn list_campaigns(&self, limit: i64, offset: i64) -> anyhow::Result<Vec<Campaign>> {
        let rows: Vec<CampaignRow> = sqlx::query_as(
            "SELECT * FROM campaigns ORDER BY created_at DESC LIMIT ? OFFSET ?",
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(TryInto::try_into).collect::<OrchestratorResult<_>>().map_err(Into::into)
    }

    async fn get_campaign_phase(
        &self,
        campaign_id: Uuid,
        phase_type: PhaseType,
    ) -> anyhow::Result<Option<Phase>> {
        let row: Option<PhaseRow> = sqlx::query_as(
            "SELECT * FROM campaign_phases WHERE campaign_id = ? AND phase_type = ?",
        )
        .bind(campaign_id.to_string())
        .bind(phase_type.as_str())
        .fetch_optional(&self.pool)
        .await?;
        row.map(TryInto::try_into).transpose().map_err(Into::into)
    }

    async fn upsert_campaign_phase(&self, phase: &Phase) -> anyhow::Result<()> {
        let configuration = phase.configuration.as_ref().map(serde_json::to_string).transpose()?;
        sqlx::query(
            r"INSERT INTO campaign_phases (campaign_id, phase_type, status, configuration,
               items_total, items_processed, progress_pct, last_error, started_at, completed_at)
               VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
               ON CONFLICT (campaign_id, phase_type) DO UPDATE SET
                 status = excluded.status,
                 configuration = excluded.configuration,
                 items_total = excluded.items_total,
                 items_processed = excluded.items_processed,
                 progress_pct = excluded.progress_pct,
                 last_error = excluded.last_error,
                 started_at = excluded.started_at,
                 completed_at = excluded.completed_at",
        )
        .bind(phase.campaign_id.to_string())
        .bind(phase.phase_type.as_str())
        .bind(phase_status_str(phase.status))
        .bind(configuration)
        .bind(phase.items_total as i64)
        .bind(phase.items_processed as i64)
        .bind(phase.progress_pct)
        .bind(&phase.last_error)
        .bind(phase.started_at.map(|t| t.to_rfc3339()))
        .bind(phase.completed_at.map(|t| t.to_rfc3339()))
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn update_campaign_phase_fields(
        &self,
        campaign_id: Uuid,
        phase_type: PhaseType,
        fields: PhaseFieldUpdate,
    ) -> anyhow::Result<()> {
        let mut set_clauses = Vec::new();
        if fields.status.is_some() {
            set_clauses.push("status = ?");
        }
        if fields.configuration.is_some() {
            set_clauses.push("configuration = ?");
        }
        if fields.items_total.is_some() {
            set_clauses.push("items_total = ?");
        }
        if fields.items_processed.is_some() {
            set_clauses.push("items_processed = ?");
        }
        if fields.progress_pct.is_some() {
            set_clauses.push("progress_pct = ?");
        }
        if fields.last_error.is_some() {
            set_clauses.push("last_error = ?");
        }
        if fields.started_at_now {
            set_clauses.push("started_at = ?");
        }
        if fields.completed_at_now {
            set_clauses.push("completed_at = ?");
        }

        if set_clauses.is_empty() {
            return Ok(());
        }

        let sql = format!(
            "UPDATE campaign_phases SET {} WHERE campaign_id = ? AND phase_type = ?",
            set_clauses.join(", ")
        );
        let mut query = sqlx::query(&sql);

        if let Some(status) = fields.status {
            query = query.bind(phase_status_str(status).to_string());
        }
        if let Some(configuration) = fields.configuration {
            query = query.bind(serde_json::to_string(&configuration)?);
        }
        if let Some(items_total) = fields.items_total {
            query = query.bind(items_total as i64);
        }
        if let Some(items_processed) = fields.items_processed {
            query = query.bind(items_processed as i64);
        }
        if let Some(progress_pct) = fields.progress_pct {
            query = query.bind(progress_pct);
        }
        if let Some(last_error) = fields.last_error {
            query = query.bind(last_error);
        }
        if fields.started_at_now {
            query = query.bind(chrono::Utc::now().to_rfc3339());
        }
        if fields.completed_at_now {
            query = query.bind(chrono::Utc::now().to_rfc3339());
        }

        query.bind(campaign_id.to_string()).bind(phase_type.as_str()).execute(&self.pool).await?;
        Ok(())
    }

    async fn list_campaign_phases(&self, campaign_id: Uuid) -> anyhow::Result<Vec<Phase>> {
        let rows: Vec<PhaseRow> =
            sqlx::query_as("SELECT * FROM campaign_phases WHERE campaign_id = ?")
                .bind(campaign_id.to_string())
                .fetch_all(&self.pool)
                .await?;
        rows.into_iter().map(TryInto::try_into).collect::<OrchestratorResult<_>>().map_err(Into::into)
    }

    async fn create_phase_execution(&self, execution: &PhaseExecution) -> anyhow::Result<()> {
        let error_details =
            execution.error_details.as_ref().map(serde_json::to_string).transpose()?;
        sqlx::query(
            r"INSERT INTO phase_executions (id, campaign_id, phase_type, status,
               error_details, created_at, started_at, completed_at)
               VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(execution.id.to_string())
        .bind(execution.campaign_id.to_string())
        .bind(execution.phase_type.as_str())
        .bind(execution_status_str(execution.status))
        .bind(error_details)
        .bind(execution.created_at.to_rfc3339())
        .bind(execution.started_at.map(|t| t.to_rfc3339()))
        .bind(execution.completed_at.map(|t| t.to_rfc3339()))
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn update_phase_execution(&self, execution: &PhaseExecution) -> anyhow::Result<()> {
        let error_details =
            execution.error_details.as_ref().map(serde_json::to_string).transpose()?;
        sqlx::query(
            r"UPDATE phase_executions SET status = ?, error_details = ?, started_at = ?,
               completed_at = ? WHERE id = ?",
        )
        .bind(execution_status_str(execution.status))
        .bind(error_details)
        .bind(execution.started_at.map(|t| t.to_rfc3339()))
        .bind(execution.completed_at.map(|t| t.to_rfc3339()))
        .bind(execution.id.to_string())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn list_phase_executions(
        &self,
        campaign_id: Uuid,
        phase_type: PhaseType,
    ) -> anyhow::Result<Vec<PhaseExecution>> {
        let rows: Vec<PhaseExecutionRow> = sqlx::query_as(
            "SELECT * FROM phase_executions WHERE campaign_id = ? AND phase_type = ? ORDER BY created_at DESC",
        )
        .bind(campaign_id.to_string())
        .bind(phase_type.as_str())
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(TryInto::try_into).collect::<OrchestratorResult<_>>().map_err(Into::into)
    }

    async fn insert_generated_domains(&self, domains: &[GeneratedDomain]) -> anyhow::Result<()> {
        for domain in domains {
            self.insert_one_domain(domain).await?;
        }
        Ok(())
    }

    async fn update_generated_domain(&self, domain: &GeneratedDomain) -> anyhow::Result<()> {
        sqlx::query(
            r"UPDATE generated_domains SET dns_status = ?, http_status = ?, lead_status = ?,
               score = ?, richness_score = ?, microcrawl_gain = ?, keywords_unique = ?,
               stuffing_penalty = ?, repetition_index = ?, anchor_share = ?
               WHERE id = ?",
        )
        .bind(four_way_str(domain.dns_status))
        .bind(four_way_str(domain.http_status))
        .bind(lead_status_str(domain.lead_status))
        .bind(domain.score)
        .bind(domain.richness_score)
        .bind(domain.microcrawl_gain)
        .bind(domain.keywords_unique)
        .bind(domain.stuffing_penalty)
        .bind(domain.repetition_index)
        .bind(domain.anchor_share)
        .bind(domain.id.to_string())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn get_generated_domain(
        &self,
        campaign_id: Uuid,
        domain_name: &str,
    ) -> anyhow::Result<Option<GeneratedDomain>> {
        let row: Option<GeneratedDomainRow> = sqlx::query_as(
            "SELECT * FROM generated_domains WHERE campaign_id = ? AND domain_name = ?",
        )
        .bind(campaign_id.to_string())
        .bind(domain_name)
        .fetch_optional(&self.pool)
        .await?;
        row.map(TryInto::try_into).transpose().map_err(Into::into)
    }

    async fn list_generated_domains(
        &self,
        campaign_id: Uuid,
        page: DomainPage,
    ) -> anyhow::Result<Vec<GeneratedDomain>> {
        let mut sql = String::from("SELECT * FROM generated_domains WHERE campaign_id = ?");
        if page.warnings_only {
            sql.push_str(
                " AND (COALESCE(stuffing_penalty, 0) > 0 OR COALESCE(repetition_index, 0) > 0.30 OR COALESCE(anchor_share, 0) > 0.40)",
            );
        }
        if let Some((field, dir)) = page.sort {
            let column = sort_field_column(field);
            let direction = match dir {
                SortDirection::Asc => "ASC",
                SortDirection::Desc => "DESC",
            };
            sql.push_str(&format!(
                " ORDER BY ({column} IS NULL) ASC, {column} {direction}, offset_index ASC"
            ));
        } else {
            sql.push_str(" ORDER BY offset_index ASC");
        }
        sql.push_str(" LIMIT ? OFFSET ?");

        let rows: Vec<GeneratedDomainRow> = sqlx::query_as(&sql)
            .bind(campaign_id.to_string())
            .bind(i64::from(page.limit))
            .bind(page.offset as i64)
            .fetch_all(&self.pool)
            .await?;
        rows.into_iter().map(TryInto::try_into).collect::<OrchestratorResult<_>>().map_err(Into::into)
    }

    async fn list_all_generated_domains(&self, campaign_id: Uuid) -> anyhow::Result<Vec<GeneratedDomain>> {
        let rows: Vec<GeneratedDomainRow> = sqlx::query_as(
            "SELECT * FROM generated_domains WHERE campaign_id = ? ORDER BY offset_index ASC",
        )
        .bind(campaign_id.to_string())
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(TryInto::try_into).collect::<OrchestratorResult<_>>().map_err(Into::into)
    }

    async fn get_campaign_counters(
        &self,
        campaign_id: Uuid,
    ) -> anyhow::Result<Option<CampaignDomainCounters>> {
        let row: Option<CountersRow> =
            sqlx::query_as("SELECT * FROM campaign_domain_counters WHERE campaign_id = ?")
                .bind(campaign_id.to_string())
                .fetch_optional(&self.pool)
                .await?;
        Ok(row.map(Into::into))
    }

    async fn upsert_campaign_counters(
        &self,
        campaign_id: Uuid,
        counters: CampaignDomainCounters,
    ) -> anyhow::Result<()> {
        sqlx::query(
            r"INSERT INTO campaign_domain_counters (campaign_id, total_domains,
               dns_pending, dns_ok, dns_error, dns_timeout,
               http_pending, http_ok, http_error, http_timeout,
               lead_pending, lead_match, lead_no_match, lead_error, lead_timeout, updated_at)
               VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
               ON CONFLICT (campaign_id) DO UPDATE SET
                 total_domains = excluded.total_domains,
                 dns_pending = excluded.dns_pending, dns_ok = excluded.dns_ok,
                 dns_error = excluded.dns_error, dns_timeout = excluded.dns_timeout,
                 http_pending = excluded.http_pending, http_ok = excluded.http_ok,
                 http_error = excluded.http_error, http_timeout = excluded.http_timeout,
                 lead_pending = excluded.lead_pending, lead_match = excluded.lead_match,
                 lead_no_match = excluded.lead_no_match, lead_error = excluded.lead_error,
                 lead_timeout = excluded.lead_timeout, updated_at = excluded.updated_at",
        )
        .bind(campaign_id.to_string())
        .bind(counters.total_domains as i64)
        .bind(counters.dns_pending as i64)
        .bind(counters.dns_ok as i64)
        .bind(counters.dns_error as i64)
        .bind(counters.dns_timeout as i64)
        .bind(counters.http_pending as i64)
        .bind(counters.http_ok as i64)
        .bind(counters.http_error as i64)
        .bind(counters.http_timeout as i64)
        .bind(counters.lead_pending as i64)
        .bind(counters.lead_match as i64)
        .bind(counters.lead_no_match as i64)
        .bind(counters.lead_error as i64)
        .bind(counters.lead_timeout as i64)
        .bind(chrono::Utc::now().to_rfc3339())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn create_scoring_profile(&self, profile: &ScoringProfile) -> anyhow::Result<()> {
        let weights = serde_json::to_string(&profile.weights)?;
        sqlx::query(
            r"INSERT INTO scoring_profiles (id, name, version, description, weights,
               parked_penalty_factor, created_at, updated_at)
               VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(profile.id.to_string())
        .bind(&profile.name)
        .bind(i64::from(profile.version))
        .bind(&profile.description)
        .bind(weights)
        .bind(profile.parked_penalty_factor)
        .bind(profile.created_at.to_rfc3339())
        .bind(profile.updated_at.to_rfc3339())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn get_scoring_profile(&self, id: Uuid) -> anyhow::Result<Option<ScoringProfile>> {
        let row: Option<ScoringProfileRow> =
            sqlx::query_as("SELECT * FROM scoring_profiles WHERE id = ?")
                .bind(id.to_string())
                .fetch_optional(&self.pool)
                .await?;
        row.map(TryInto::try_into).transpose().map_err(Into::into)
    }

    async fn update_scoring_profile(&self, profile: &ScoringProfile) -> anyhow::Result<()> {
        let weights = serde_json::to_string(&profile.weights)?;
        sqlx::query(
            r"UPDATE scoring_profiles SET name = ?, version = ?, description = ?, weights = ?,
               parked_penalty_factor = ?, updated_at = ? WHERE id = ?",
        )
        .bind(&profile.name)
        .bind(i64::from(profile.version))
        .bind(&profile.description)
        .bind(weights)
        .bind(profile.parked_penalty_factor)
        .bind(profile.updated_at.to_rfc3339())
        .bind(profile.id.to_string())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn get_campaign_scoring_profile(
        &self,
        campaign_id: Uuid,
    ) -> anyhow::Result<Option<ScoringProfile>> {
        let row: Option<ScoringProfileRow> = sqlx::query_as(
            r"SELECT sp.* FROM scoring_profiles sp
               INNER JOIN campaign_scoring_profiles csp ON csp.scoring_profile_id = sp.id
               WHERE csp.campaign_id = ?",
        )
        .bind(campaign_id.to_string())
        .fetch_optional(&self.pool)
        .await?;
        row.map(TryInto::try_into).transpose().map_err(Into::into)
    }

    async fn set_campaign_scoring_profile(
        &self,
        campaign_id: Uuid,
        profile_id: Uuid,
    ) -> anyhow::Result<()> {
        sqlx::query(
            r"INSERT INTO campaign_scoring_profiles (campaign_id, scoring_profile_id)
               VALUES (?, ?)
               ON CONFLICT (campaign_id) DO UPDATE SET scoring_profile_id = excluded.scoring_profile_id",
        )
        .bind(campaign_id.to_string())
        .bind(profile_id.to_string())
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

impl SqliteCampaignStore {
    async fn insert_one_domain(&self, domain: &GeneratedDomain) -> anyhow::Result<()> {
        sqlx::query(
            r"INSERT INTO generated_domains (id, campaign_id, domain_name, offset_index,
               dns_status, http_status, lead_status, score, richness_score, microcrawl_gain,
               keywords_unique, stuffing_penalty, repetition_index, anchor_share, created_at)
               VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(domain.id.to_string())
        .bind(domain.campaign_id.to_string())
        .bind(&domain.domain_name)
        .bind(domain.offset_index as i64)
        .bind(four_way_str(domain.dns_status))
        .bind(four_way_str(domain.http_status))
        .bind(lead_status_str(domain.lead_status))
        .bind(domain.score)
        .bind(domain.richness_score)
        .bind(domain.microcrawl_gain)
        .bind(domain.keywords_unique)
        .bind(domain.stuffing_penalty)
        .bind(domain.repetition_index)
        .bind(domain.anchor_share)
        .bind(domain.created_at.to_rfc3339())
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

fn sort_field_column(field: SortField) -> &'static str {
    match field {
        SortField::RichnessScore => "richness_score",
        SortField::MicrocrawlGain => "microcrawl_gain",
        SortField::KeywordsUnique => "keywords_unique",
    }
}

const fn phase_status_str(status: PhaseStatus) -> &'static str {
    match status {
        PhaseStatus::NotStarted => "not_started",
        PhaseStatus::Ready => "ready",
        PhaseStatus::Configured => "configured",
        PhaseStatus::InProgress => "in_progress",
        PhaseStatus::Paused => "paused",
        PhaseStatus::Completed => "completed",
        PhaseStatus::Failed => "failed",
    }
}

fn parse_phase_status(s: &str) -> OrchestratorResult<PhaseStatus> {
    Ok(match s {
        "not_started" => PhaseStatus::NotStarted,
        "ready" => PhaseStatus::Ready,
        "configured" => PhaseStatus::Configured,
        "in_progress" => PhaseStatus::InProgress,
        "paused" => PhaseStatus::Paused,
        "completed" => PhaseStatus::Completed,
        "failed" => PhaseStatus::Failed,
        other => {
            return Err(crate::domain::errors::OrchestratorError::Internal(anyhow::anyhow!(
                "invalid phase status: {other}"
            )))
        }
    })
}

const fn execution_status_str(status: ExecutionStatus) -> &'static str {
    match status {
        ExecutionStatus::Queued => "queued",
        ExecutionStatus::Running => "running",
        ExecutionStatus::Succeeded => "succeeded",
        ExecutionStatus::Failed => "failed",
        ExecutionStatus::Cancelled => "cancelled",
    }
}

fn parse_execution_status(s: &str) -> OrchestratorResult<ExecutionStatus> {
    Ok(match s {
        "queued" => ExecutionStatus::Queued,
        "running" => ExecutionStatus::Running,
        "succeeded" => ExecutionStatus::Succeeded,
        "failed" => ExecutionStatus::Failed,
        "cancelled" => ExecutionStatus::Cancelled,
        other => {
            return Err(crate::domain::errors::OrchestratorError::Internal(anyhow::anyhow!(
                "invalid execution status: {other}"
            )))
        }
    })
}

fn parse_phase_type(s: &str) -> OrchestratorResult<PhaseType> {
    Ok(match s {
        "domain_generation" => PhaseType::DomainGeneration,
        "dns_validation" => PhaseType::DnsValidation,
        "http_keyword_validation" => PhaseType::HttpKeywordValidation,
        "analysis" => PhaseType::Analysis,
        other => {
            return Err(crate::domain::errors::OrchestratorError::Internal(anyhow::anyhow!(
                "invalid phase type: {other}"
            )))
        }
    })
}

const fn four_way_str(status: crate::domain::models::FourWayStatus) -> &'static str {
    use crate::domain::models::FourWayStatus;
    match status {
        FourWayStatus::Pending => "pending",
        FourWayStatus::Ok => "ok",
        FourWayStatus::Error => "error",
        FourWayStatus::Timeout => "timeout",
    }
}

fn parse_four_way(s: &str) -> OrchestratorResult<crate::domain::models::FourWayStatus> {
    use crate::domain::models::FourWayStatus;
    Ok(match s {
        "pending" => FourWayStatus::Pending,
        "ok" => FourWayStatus::Ok,
        "error" => FourWayStatus::Error,
        "timeout" => FourWayStatus::Timeout,
        other => {
            return Err(crate::domain::errors::OrchestratorError::Internal(anyhow::anyhow!(
                "invalid four-way status: {other}"
            )))
        }
    })
}

const fn lead_status_str(status: crate::domain::models::LeadStatus) -> &'static str {
    use crate::domain::models::LeadStatus;
    match status {
        LeadStatus::Pending => "pending",
        LeadStatus::Match => "match",
        LeadStatus::NoMatch => "no_match",
        LeadStatus::Error => "error",
        LeadStatus::Timeout => "timeout",
    }
}

fn parse_lead_status(s: &str) -> OrchestratorResult<crate::domain::models::LeadStatus> {
    use crate::domain::models::LeadStatus;
    Ok(match s {
        "pending" => LeadStatus::Pending,
        "match" => LeadStatus::Match,
        "no_match" => LeadStatus::NoMatch,
        "error" => LeadStatus::Error,
        "timeout" => LeadStatus::Timeout,
        other => {
            return Err(crate::domain::errors::OrchestratorError::Internal(anyhow::anyhow!(
                "invalid lead status: {other}"
            )))
        }
    })
}

#[derive(sqlx::FromRow)]
struct CampaignRow {
    id: String,
    name: String,
    created_at: String,
    updated_at: String,
    campaign_type: String,
    total_phases: i64,
    completed_phases: i64,
    is_full_sequence_mode: bool,
    current_phase: Option<String>,
    phase_status: Option<String>,
    started_at: Option<String>,
    completed_at: Option<String>,
    estimated_completion_at: Option<String>,
}

impl TryFrom<CampaignRow> for Campaign {
    type Error = crate::domain::errors::OrchestratorError;

    fn try_from(row: CampaignRow) -> Result<Self, Self::Error> {
        Ok(Campaign {
            id: super::parse_uuid(&row.id)?,
            name: row.name,
            created_at: super::parse_datetime(&row.created_at)?,
            updated_at: super::parse_datetime(&row.updated_at)?,
            campaign_type: row.campaign_type,
            total_phases: row.total_phases as u32,
            completed_phases: row.completed_phases as u32,
            is_full_sequence_mode: row.is_full_sequence_mode,
            current_phase: row.current_phase.as_deref().map(parse_phase_type).transpose()?,
            phase_status: row.phase_status.as_deref().map(parse_phase_status).transpose()?,
            started_at: super::parse_optional_datetime(row.started_at)?,
            completed_at: super::parse_optional_datetime(row.completed_at)?,
            estimated_completion_at: super::parse_optional_datetime(row.estimated_completion_at)?,
        })
    }
}

#[derive(sqlx::FromRow)]
struct PhaseRow {
    campaign_id: String,
    phase_type: String,
    status: String,
    configuration: Option<String>,
    items_total: i64,
    items_processed: i64,
    progress_pct: f64,
    last_error: Option<String>,
    started_at: Option<String>,
    completed_at: Option<String>,
}

impl TryFrom<PhaseRow> for Phase {
    type Error = crate::domain::errors::OrchestratorError;

    fn try_from(row: PhaseRow) -> Result<Self, Self::Error> {
        Ok(Phase {
            campaign_id: super::parse_uuid(&row.campaign_id)?,
            phase_type: parse_phase_type(&row.phase_type)?,
            status: parse_phase_status(&row.status)?,
            configuration: row.configuration.map(|c| serde_json::from_str(&c)).transpose()?,
            items_total: row.items_total as u64,
            items_processed: row.items_processed as u64,
            progress_pct: row.progress_pct,
            last_error: row.last_error,
            started_at: super::parse_optional_datetime(row.started_at)?,
            completed_at: super::parse_optional_datetime(row.completed_at)?,
        })
    }
}

#[derive(sqlx::FromRow)]
struct PhaseExecutionRow {
    id: String,
    campaign_id: String,
    phase_type: String,
    status: String,
    error_details: Option<String>,
    created_at: String,
    started_at: Option<String>,
    completed_at: Option<String>,
}

impl TryFrom<PhaseExecutionRow> for PhaseExecution {
    type Error = crate::domain::errors::OrchestratorError;

    fn try_from(row: PhaseExecutionRow) -> Result<Self, Self::Error> {
        let error_details: Option<ErrorDetails> =
            row.error_details.map(|e| serde_json::from_str(&e)).transpose()?;
        Ok(PhaseExecution {
            id: super::parse_uuid(&row.id)?,
            campaign_id: super::parse_uuid(&row.campaign_id)?,
            phase_type: parse_phase_type(&row.phase_type)?,
            status: parse_execution_status(&row.status)?,
            error_details,
            created_at: super::parse_datetime(&row.created_at)?,
            started_at: super::parse_optional_datetime(row.started_at)?,
            completed_at: super::parse_optional_datetime(row.completed_at)?,
        })
    }
}

#[derive(sqlx::FromRow)]
struct GeneratedDomainRow {
    id: String,
    campaign_id: String,
    domain_name: String,
    offset_index: i64,
    dns_status: String,
    http_status: String,
    lead_status: String,
    score: Option<f64>,
    richness_score: Option<f64>,
    microcrawl_gain: Option<f64>,
    keywords_unique: Option<f64>,
    stuffing_penalty: Option<f64>,
    repetition_index: Option<f64>,
    anchor_share: Option<f64>,
    created_at: String,
}

impl TryFrom<GeneratedDomainRow> for GeneratedDomain {
    type Error = crate::domain::errors::OrchestratorError;

    fn try_from(row: GeneratedDomainRow) -> Result<Self, Self::Error> {
        Ok(GeneratedDomain {
            id: super::parse_uuid(&row.id)?,
            campaign_id: super::parse_uuid(&row.campaign_id)?,
            domain_name: row.domain_name,
            offset_index: row.offset_index as u64,
            dns_status: parse_four_way(&row.dns_status)?,
            http_status: parse_four_way(&row.http_status)?,
            lead_status: parse_lead_status(&row.lead_status)?,
            score: row.score,
            richness_score: row.richness_score,
            microcrawl_gain: row.microcrawl_gain,
            keywords_unique: row.keywords_unique,
            stuffing_penalty: row.stuffing_penalty,
            repetition_index: row.repetition_index,
            anchor_share: row.anchor_share,
            created_at: super::parse_datetime(&row.created_at)?,
        })
    }
}

#[derive(sqlx::FromRow)]
struct CountersRow {
    #[allow(dead_code)]
    campaign_id: String,
    total_domains: i64,
    dns_pending: i64,
    dns_ok: i64,
    dns_error: i64,
    dns_timeout: i64,
    http_pending: i64,
    http_ok: i64,
    http_error: i64,
    http_timeout: i64,
    lead_pending: i64,
    lead_match: i64,
    lead_no_match: i64,
    lead_error: i64,
    lead_timeout: i64,
    #[allow(dead_code)]
    updated_at: String,
}

impl From<CountersRow> for CampaignDomainCounters {
    fn from(row: CountersRow) -> Self {
        Self {
            total_domains: row.total_domains as u64,
            dns_pending: row.dns_pending as u64,
            dns_ok: row.dns_ok as u64,
            dns_error: row.dns_error as u64,
            dns_timeout: row.dns_timeout as u64,
            http_pending: row.http_pending as u64,
            http_ok: row.http_ok as u64,
            http_error: row.http_error as u64,
            http_timeout: row.http_timeout as u64,
            lead_pending: row.lead_pending as u64,
            lead_match: row.lead_match as u64,
            lead_no_match: row.lead_no_match as u64,
            lead_error: row.lead_error as u64,
            lead_timeout: row.lead_timeout as u64,
        }
    }
}

#[derive(sqlx::FromRow)]
struct ScoringProfileRow {
    id: String,
    name: String,
    version: i64,
    description: Option<String>,
    weights: String,
    parked_penalty_factor: f64,
    created_at: String,
    updated_at: String,
}

impl TryFrom<ScoringProfileRow> for ScoringProfile {
    type Error = crate::domain::errors::OrchestratorError;

    fn try_from(row: ScoringProfileRow) -> Result<Self, Self::Error> {
        Ok(ScoringProfile {
            id: super::parse_uuid(&row.id)?,
            name: row.name,
            version: row.version as u32,
            description: row.description,
            weights: serde_json::from_str(&row.weights)?,
            parked_penalty_factor: row.parked_penalty_factor,
            created_at: super::parse_datetime(&row.created_at)?,
            updated_at: super::parse_datetime(&row.updated_at)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::sqlite::create_migrated_test_pool;

    async fn setup() -> SqliteCampaignStore {
        let pool = create_migrated_test_pool().await.unwrap();
        SqliteCampaignStore::new(pool)
    }

    #[tokio::test]
    async fn create_and_get_campaign_round_trips() {
        let store = setup().await;
        let campaign = Campaign::new("acme-q3");
        store.create_campaign(&campaign).await.unwrap();

        let fetched = store.get_campaign(campaign.id).await.unwrap().unwrap();
        assert_eq!(fetched.name, "acme-q3");
        assert_eq!(fetched.campaign_type, "lead_generation");
    }

    #[tokio::test]
    async fn upsert_and_field_update_on_phase() {
        let store = setup().await;
        let campaign = Campaign::new("acme-q3");
        store.create_campaign(&campaign).await.unwrap();

        let phase = Phase::not_started(campaign.id, PhaseType::DomainGeneration);
        store.upsert_campaign_phase(&phase).await.unwrap();

        store
            .update_campaign_phase_fields(
                campaign.id,
                PhaseType::DomainGeneration,
                PhaseFieldUpdate {
                    status: Some(PhaseStatus::InProgress),
                    items_total: Some(100),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        let fetched =
            store.get_campaign_phase(campaign.id, PhaseType::DomainGeneration).await.unwrap().unwrap();
        assert_eq!(fetched.status, PhaseStatus::InProgress);
        assert_eq!(fetched.items_total, 100);
    }

    #[tokio::test]
    async fn domain_listing_respects_warnings_filter() {
        let store = setup().await;
        let campaign = Campaign::new("acme-q3");
        store.create_campaign(&campaign).await.unwrap();

        let mut clean = GeneratedDomain::new(campaign.id, "clean.com", 0);
        clean.repetition_index = Some(0.1);
        let mut flagged = GeneratedDomain::new(campaign.id, "flagged.com", 1);
        flagged.repetition_index = Some(0.5);
        store.insert_generated_domains(&[clean, flagged]).await.unwrap();

        let page = DomainPage { limit: 10, offset: 0, sort: None, warnings_only: true };
        let results = store.list_generated_domains(campaign.id, page).await.unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].domain_name, "flagged.com");
    }

    #[tokio::test]
    async fn counters_upsert_then_get_round_trips() {
        let store = setup().await;
        let campaign = Campaign::new("acme-q3");
        store.create_campaign(&campaign).await.unwrap();

        let counters = CampaignDomainCounters { total_domains: 3, dns_ok: 3, ..Default::default() };
        store.upsert_campaign_counters(campaign.id, counters).await.unwrap();

        let fetched = store.get_campaign_counters(campaign.id).await.unwrap().unwrap();
        assert_eq!(fetched.total_domains, 3);
        assert_eq!(fetched.dns_ok, 3);
    }
}
