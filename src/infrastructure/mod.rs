//! Infrastructure layer
//!
//! Ambient concerns that sit outside the domain: configuration loading
//! and structured logging. `SQLite` adapters live under `crate::adapters`.

pub mod config;
pub mod logging;
