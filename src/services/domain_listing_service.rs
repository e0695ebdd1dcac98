//! Domain Listing Service: paginated, sorted, warnings-filterable domain
//! reads plus counter reconciliation (§4.6).

use std::sync::Arc;

use tracing::instrument;
use uuid::Uuid;

use crate::domain::errors::{OrchestratorError, OrchestratorResult};
use crate::domain::models::{CampaignDomainCounters, GeneratedDomain};
use crate::domain::ports::{CampaignStore, DomainPage};

/// A page of generated domains plus the campaign's (possibly just
/// reconciled) aggregate counters.
#[derive(Debug, Clone)]
pub struct DomainListing {
    pub items: Vec<GeneratedDomain>,
    pub counters: CampaignDomainCounters,
}

pub struct DomainListingService {
    store: Arc<dyn CampaignStore>,
}

impl DomainListingService {
    pub fn new(store: Arc<dyn CampaignStore>) -> Self {
        Self { store }
    }

    /// Lists a page of domains per `page`'s sort/filter/pagination, and
    /// returns the campaign's counters, reconciling them first if missing.
    #[instrument(skip(self), err)]
    pub async fn list(&self, campaign_id: Uuid, page: DomainPage) -> OrchestratorResult<DomainListing> {
        let items = self
            .store
            .list_generated_domains(campaign_id, page)
            .await
            .map_err(OrchestratorError::Internal)?;
        let counters = self.counters(campaign_id).await?;
        Ok(DomainListing { items, counters })
    }

    /// Returns the campaign's counters, reconciling (aggregate-then-upsert)
    /// when the row is missing. The aggregation+upsert is idempotent:
    /// concurrent reconcilers converge to the same values because the
    /// store's upsert is atomic per campaign.
    #[instrument(skip(self), err)]
    pub async fn counters(&self, campaign_id: Uuid) -> OrchestratorResult<CampaignDomainCounters> {
        if let Some(counters) =
            self.store.get_campaign_counters(campaign_id).await.map_err(OrchestratorError::Internal)?
        {
            return Ok(counters);
        }

        let domains = self
            .store
            .list_all_generated_domains(campaign_id)
            .await
            .map_err(OrchestratorError::Internal)?;
        let counters = CampaignDomainCounters::aggregate(&domains);
        self.store
            .upsert_campaign_counters(campaign_id, counters)
            .await
            .map_err(OrchestratorError::Internal)?;
        Ok(counters)
    }
}
