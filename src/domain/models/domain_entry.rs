//! Generated domains and per-campaign domain counters.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FourWayStatus {
    Pending,
    Ok,
    Error,
    Timeout,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LeadStatus {
    Pending,
    Match,
    NoMatch,
    Error,
    Timeout,
}

/// One generated domain under a campaign, with its pipeline status and
/// optional final score. `offset_index` is assigned once, at generation
/// time, and never reused; it is the stable tiebreaker for paging.
///
/// The `richness_score`/`microcrawl_gain`/`keywords_unique` feature fields
/// and the `stuffing_penalty`/`repetition_index`/`anchor_share` warning
/// inputs are carried directly on the row rather than behind a separate
/// feature-store join, since a single campaign store backs both; they are
/// `None` until the analysis phase computes them for a domain.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratedDomain {
    pub id: Uuid,
    pub campaign_id: Uuid,
    pub domain_name: String,
    pub offset_index: u64,
    pub dns_status: FourWayStatus,
    pub http_status: FourWayStatus,
    pub lead_status: LeadStatus,
    pub score: Option<f64>,
    pub richness_score: Option<f64>,
    pub microcrawl_gain: Option<f64>,
    pub keywords_unique: Option<f64>,
    pub stuffing_penalty: Option<f64>,
    pub repetition_index: Option<f64>,
    pub anchor_share: Option<f64>,
    pub created_at: DateTime<Utc>,
}

impl GeneratedDomain {
    pub fn new(campaign_id: Uuid, domain_name: impl Into<String>, offset_index: u64) -> Self {
        Self {
            id: Uuid::new_v4(),
            campaign_id,
            domain_name: domain_name.into(),
            offset_index,
            dns_status: FourWayStatus::Pending,
            http_status: FourWayStatus::Pending,
            lead_status: LeadStatus::Pending,
            score: None,
            richness_score: None,
            microcrawl_gain: None,
            keywords_unique: None,
            stuffing_penalty: None,
            repetition_index: None,
            anchor_share: None,
            created_at: Utc::now(),
        }
    }

    /// An item carries a warning iff any of the three thresholds in the
    /// domain-listing warnings filter are crossed.
    pub fn has_warning(&self) -> bool {
        self.stuffing_penalty.is_some_and(|v| v > 0.0)
            || self.repetition_index.is_some_and(|v| v > 0.30)
            || self.anchor_share.is_some_and(|v| v > 0.40)
    }
}

/// The 14-field totals row for a campaign: total + 4 DNS + 4 HTTP + 5 lead.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct CampaignDomainCounters {
    pub total_domains: u64,

    pub dns_pending: u64,
    pub dns_ok: u64,
    pub dns_error: u64,
    pub dns_timeout: u64,

    pub http_pending: u64,
    pub http_ok: u64,
    pub http_error: u64,
    pub http_timeout: u64,

    pub lead_pending: u64,
    pub lead_match: u64,
    pub lead_no_match: u64,
    pub lead_error: u64,
    pub lead_timeout: u64,
}

impl CampaignDomainCounters {
    /// Aggregate the 14 counts over a campaign's generated domains. This is
    /// the reconciliation step behind §4.6's counter-reconciliation
    /// invariant; it is pure and always converges to the same result for
    /// the same input set, which is what makes concurrent reconcilers safe.
    pub fn aggregate(domains: &[GeneratedDomain]) -> Self {
        let mut counters = Self { total_domains: domains.len() as u64, ..Default::default() };

        for domain in domains {
            match domain.dns_status {
                FourWayStatus::Pending => counters.dns_pending += 1,
                FourWayStatus::Ok => counters.dns_ok += 1,
                FourWayStatus::Error => counters.dns_error += 1,
                FourWayStatus::Timeout => counters.dns_timeout += 1,
            }
            match domain.http_status {
                FourWayStatus::Pending => counters.http_pending += 1,
                FourWayStatus::Ok => counters.http_ok += 1,
                FourWayStatus::Error => counters.http_error += 1,
                FourWayStatus::Timeout => counters.http_timeout += 1,
            }
            match domain.lead_status {
                LeadStatus::Pending => counters.lead_pending += 1,
                LeadStatus::Match => counters.lead_match += 1,
                LeadStatus::NoMatch => counters.lead_no_match += 1,
                LeadStatus::Error => counters.lead_error += 1,
                LeadStatus::Timeout => counters.lead_timeout += 1,
            }
        }

        counters
    }

    /// Each of the DNS, HTTP, and Lead bucket breakdowns sums to `total_domains`.
    pub fn satisfies_sum_invariant(&self) -> bool {
        let dns_sum = self.dns_pending + self.dns_ok + self.dns_error + self.dns_timeout;
        let http_sum = self.http_pending + self.http_ok + self.http_error + self.http_timeout;
        let lead_sum =
            self.lead_pending + self.lead_match + self.lead_no_match + self.lead_error + self.lead_timeout;
        dns_sum == self.total_domains && http_sum == self.total_domains && lead_sum == self.total_domains
    }
}
