//! Campaign orchestration core for a lead-generation pipeline.
//!
//! A hexagonal core: `domain` holds pure entities, errors, and ports;
//! `services` implements the use cases against those ports; `adapters`
//! provides the `SQLite`-backed implementations; `infrastructure` carries
//! configuration loading and structured logging.

pub mod adapters;
pub mod domain;
pub mod infrastructure;
pub mod services;

pub use domain::{OrchestratorError, OrchestratorResult};
