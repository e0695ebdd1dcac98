//! Application services for the campaign orchestration core.
//!
//! These coordinate domain models and ports to implement use cases,
//! independent of any particular transport or storage technology.

pub mod bulk_operations_tracker;
pub mod campaign_orchestrator;
pub mod domain_listing_service;
pub mod event_bus;
pub mod phase_service;
pub mod session_service;

pub use bulk_operations_tracker::BulkOperationsTracker;
pub use campaign_orchestrator::{CampaignOrchestrator, RestartOutcome};
pub use domain_listing_service::{DomainListing, DomainListingService};
pub use event_bus::{EventBus, EventBusConfig, EventEnvelope, ObserverFilter, ObserverId, Subscription};
pub use phase_service::{PhaseConfiguration, PhaseStatusSnapshot};
pub use session_service::{SessionPolicy, SessionService};
