//! Domain models
//!
//! Pure domain entities with business logic and validation rules.
//! These models are framework-agnostic and contain no infrastructure concerns.

pub mod bulk_operation;
pub mod campaign;
pub mod config;
pub mod domain_entry;
pub mod phase;
pub mod scoring;
pub mod session;

pub use bulk_operation::{
    aggregate as aggregate_bulk_operation, BulkAggregate, BulkOperation, BulkOperationStatus,
    BulkOperationType, CampaignPhaseSnapshot,
};
pub use campaign::{Campaign, CampaignState};
pub use config::{Config, DatabaseConfig, EventBusConfig, IdempotencyConfig, SessionConfig};
pub use domain_entry::{CampaignDomainCounters, FourWayStatus, GeneratedDomain, LeadStatus};
pub use phase::{
    ErrorDetails, ExecutionStatus, Phase, PhaseExecution, PhaseStatus, PhaseType, ProgressItem,
    PHASE_ORDER,
};
pub use scoring::{ScoreBreakdown, ScoringProfile};
pub use session::Session;
