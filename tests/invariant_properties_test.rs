//! Property-based coverage for the three invariants explicitly called out
//! for property testing: phase gating, counter reconciliation, and restart
//! idempotency.

use std::sync::Arc;

use campaign_orchestrator::adapters::sqlite::{create_migrated_test_pool, SqliteCampaignStore};
use campaign_orchestrator::domain::models::{
    Campaign, CampaignDomainCounters, FourWayStatus, GeneratedDomain, LeadStatus, Phase, PhaseStatus, PhaseType,
};
use campaign_orchestrator::domain::ports::CampaignStore;
use campaign_orchestrator::services::{CampaignOrchestrator, EventBus, EventBusConfig};
use proptest::prelude::*;

fn four_way_status() -> impl Strategy<Value = FourWayStatus> {
    prop_oneof![
        Just(FourWayStatus::Pending),
        Just(FourWayStatus::Ok),
        Just(FourWayStatus::Error),
        Just(FourWayStatus::Timeout),
    ]
}

fn lead_status() -> impl Strategy<Value = LeadStatus> {
    prop_oneof![
        Just(LeadStatus::Pending),
        Just(LeadStatus::Match),
        Just(LeadStatus::NoMatch),
        Just(LeadStatus::Error),
        Just(LeadStatus::Timeout),
    ]
}

proptest! {
    /// Property: a phase never starts unless every strictly-upstream phase
    /// is completed, for any subset of the three upstream phases of
    /// analysis being marked completed.
    #[test]
    fn prop_phase_never_starts_with_an_incomplete_upstream(
        domain_gen_done in any::<bool>(),
        dns_done in any::<bool>(),
        http_done in any::<bool>(),
    ) {
        let runtime = tokio::runtime::Runtime::new().unwrap();
        runtime.block_on(async {
            let pool = create_migrated_test_pool().await.unwrap();
            let store: Arc<dyn CampaignStore> = Arc::new(SqliteCampaignStore::new(pool));
            let orchestrator = CampaignOrchestrator::new(
                store.clone(),
                EventBus::new(EventBusConfig::default()),
                chrono::Duration::hours(24),
            );

            let campaign = Campaign::new("prop-gating");
            store.create_campaign(&campaign).await.unwrap();

            for (phase_type, done) in [
                (PhaseType::DomainGeneration, domain_gen_done),
                (PhaseType::DnsValidation, dns_done),
                (PhaseType::HttpKeywordValidation, http_done),
            ] {
                let mut phase = Phase::not_started(campaign.id, phase_type);
                phase.status = if done { PhaseStatus::Completed } else { PhaseStatus::InProgress };
                store.upsert_campaign_phase(&phase).await.unwrap();
            }

            let all_upstream_complete = domain_gen_done && dns_done && http_done;
            let result = orchestrator.start_phase(campaign.id, PhaseType::Analysis).await;

            if all_upstream_complete {
                prop_assert!(result.is_ok());
            } else {
                prop_assert!(result.is_err());
            }
            Ok(())
        })?;
    }

    /// Property: the DNS/HTTP/Lead bucket breakdowns always sum to
    /// `total_domains`, for any combination of per-domain statuses.
    #[test]
    fn prop_counter_aggregate_satisfies_sum_invariant(
        statuses in prop::collection::vec((four_way_status(), four_way_status(), lead_status()), 0..50)
    ) {
        let domains: Vec<GeneratedDomain> = statuses
            .into_iter()
            .enumerate()
            .map(|(i, (dns, http, lead))| {
                let mut domain = GeneratedDomain::new(uuid::Uuid::new_v4(), format!("domain-{i}.example"), i as u64);
                domain.dns_status = dns;
                domain.http_status = http;
                domain.lead_status = lead;
                domain
            })
            .collect();

        let counters: CampaignDomainCounters = CampaignDomainCounters::aggregate(&domains);
        prop_assert_eq!(counters.total_domains, domains.len() as u64);
        prop_assert!(counters.satisfies_sum_invariant());
    }

    /// Property: replaying the same idempotency key for `restart_analysis`
    /// always returns the same `{previousState, currentState}`, regardless
    /// of how many times it is called.
    #[test]
    fn prop_restart_analysis_is_idempotent_across_repeated_calls(call_count in 1usize..6) {
        let runtime = tokio::runtime::Runtime::new().unwrap();
        runtime.block_on(async {
            let pool = create_migrated_test_pool().await.unwrap();
            let store: Arc<dyn CampaignStore> = Arc::new(SqliteCampaignStore::new(pool));
            let orchestrator = CampaignOrchestrator::new(
                store.clone(),
                EventBus::new(EventBusConfig::default()),
                chrono::Duration::hours(24),
            );

            let campaign = Campaign::new("prop-idempotency");
            store.create_campaign(&campaign).await.unwrap();
            let mut http_phase = Phase::not_started(campaign.id, PhaseType::HttpKeywordValidation);
            http_phase.status = PhaseStatus::Completed;
            store.upsert_campaign_phase(&http_phase).await.unwrap();

            let key = "prop-key".to_string();
            let mut outcomes = Vec::with_capacity(call_count);
            for _ in 0..call_count {
                outcomes.push(orchestrator.restart_analysis(campaign.id, Some(key.clone())).await.unwrap());
            }

            let first = outcomes[0];
            for outcome in &outcomes[1..] {
                prop_assert_eq!(outcome.previous_state, first.previous_state);
                prop_assert_eq!(outcome.current_state, first.current_state);
            }
            Ok(())
        })?;
    }
}
