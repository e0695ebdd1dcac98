//! Domain ports (interfaces) for the campaign orchestration core.

pub mod campaign_store;
pub mod session_repository;

pub use campaign_store::{CampaignStore, DomainPage, PhaseFieldUpdate, SortDirection, SortField};
pub use session_repository::SessionRepository;
