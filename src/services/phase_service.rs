//! Phase Service: the uniform `configure/execute/status/cancel/validate`
//! contract shared by all four phase kinds, plus the typed configuration
//! enum each phase kind's `configure`/`validate` is checked against.

use std::pin::Pin;

use chrono::Utc;
use futures::Stream;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::errors::{OrchestratorError, OrchestratorResult};
use crate::domain::models::{PhaseStatus, PhaseType, ProgressItem};

/// Recognized configuration, one variant per phase kind (§3A). Serializes
/// to/from the wire-level opaque configuration map of §6.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "phase_type", rename_all = "snake_case")]
pub enum PhaseConfiguration {
    DomainGeneration { pattern: String, tld_list: Vec<String>, max_domains: u64 },
    DnsValidation { stealth_enabled: bool, batch_size: u32, resolvers: Vec<String> },
    HttpKeywordValidation { stealth_enabled: bool, batch_size: u32, keyword_set_id: String },
    Analysis { scoring_profile_id: uuid::Uuid, batch_size: u32, rescore_on_config_change: bool },
}

impl PhaseConfiguration {
    pub const fn phase_type(&self) -> PhaseType {
        match self {
            Self::DomainGeneration { .. } => PhaseType::DomainGeneration,
            Self::DnsValidation { .. } => PhaseType::DnsValidation,
            Self::HttpKeywordValidation { .. } => PhaseType::HttpKeywordValidation,
            Self::Analysis { .. } => PhaseType::Analysis,
        }
    }

    /// Parse and validate an opaque configuration map against the schema
    /// for `expected`. Fails with `INVALID_CONFIG` on missing/out-of-range
    /// keys or a kind mismatch.
    pub fn parse(expected: PhaseType, cfg: &Value) -> OrchestratorResult<Self> {
        let parsed: Self = serde_json::from_value(tag_with_phase(expected, cfg)).map_err(|e| {
            OrchestratorError::InvalidConfig { reason: format!("malformed configuration: {e}") }
        })?;

        if parsed.phase_type() != expected {
            return Err(OrchestratorError::InvalidConfig {
                reason: format!("configuration is for {:?}, expected {expected:?}", parsed.phase_type()),
            });
        }
        parsed.validate_ranges()?;
        Ok(parsed)
    }

    fn validate_ranges(&self) -> OrchestratorResult<()> {
        match self {
            Self::DomainGeneration { pattern, max_domains, .. } => {
                if pattern.is_empty() {
                    return Err(OrchestratorError::InvalidConfig { reason: "pattern must not be empty".into() });
                }
                if *max_domains == 0 {
                    return Err(OrchestratorError::InvalidConfig { reason: "max_domains must be positive".into() });
                }
            }
            Self::DnsValidation { batch_size, resolvers, .. } => {
                if *batch_size == 0 {
                    return Err(OrchestratorError::InvalidConfig { reason: "batch_size must be positive".into() });
                }
                if resolvers.is_empty() {
                    return Err(OrchestratorError::InvalidConfig { reason: "resolvers must not be empty".into() });
                }
            }
            Self::HttpKeywordValidation { batch_size, keyword_set_id, .. } => {
                if *batch_size == 0 {
                    return Err(OrchestratorError::InvalidConfig { reason: "batch_size must be positive".into() });
                }
                if keyword_set_id.is_empty() {
                    return Err(OrchestratorError::InvalidConfig { reason: "keyword_set_id must not be empty".into() });
                }
            }
            Self::Analysis { batch_size, .. } => {
                if *batch_size == 0 {
                    return Err(OrchestratorError::InvalidConfig { reason: "batch_size must be positive".into() });
                }
            }
        }
        Ok(())
    }
}

/// `serde(tag = "phase_type")` needs the discriminant present in the JSON
/// object; callers hand us a bare map of the recognized keys, so splice it
/// in before deserializing.
fn tag_with_phase(phase_type: PhaseType, cfg: &Value) -> Value {
    let mut merged = cfg.clone();
    if let Value::Object(map) = &mut merged {
        map.insert("phase_type".to_string(), Value::String(phase_type.as_str().to_string()));
    }
    merged
}

/// A stream of progress items from a running `execute()`. Finite,
/// not restartable: a fresh `execute` call is a new run.
pub type ProgressStream = Pin<Box<dyn Stream<Item = ProgressItem> + Send>>;

/// Snapshot returned by `status()`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PhaseStatusSnapshot {
    pub status: PhaseStatus,
    pub items_total: u64,
    pub items_processed: u64,
    pub progress_pct: f64,
    pub last_error: Option<String>,
    pub started_at: Option<chrono::DateTime<Utc>>,
    pub completed_at: Option<chrono::DateTime<Utc>>,
    pub configuration: Option<Value>,
}

impl PhaseStatusSnapshot {
    pub fn not_started() -> Self {
        Self {
            status: PhaseStatus::NotStarted,
            items_total: 0,
            items_processed: 0,
            progress_pct: 0.0,
            last_error: None,
            started_at: None,
            completed_at: None,
            configuration: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_well_formed_dns_validation_config() {
        let cfg = serde_json::json!({
            "stealth_enabled": true,
            "batch_size": 50,
            "resolvers": ["1.1.1.1"],
        });
        let parsed = PhaseConfiguration::parse(PhaseType::DnsValidation, &cfg).unwrap();
        assert_eq!(parsed.phase_type(), PhaseType::DnsValidation);
    }

    #[test]
    fn rejects_zero_batch_size() {
        let cfg = serde_json::json!({
            "stealth_enabled": false,
            "batch_size": 0,
            "resolvers": ["1.1.1.1"],
        });
        let result = PhaseConfiguration::parse(PhaseType::DnsValidation, &cfg);
        assert!(matches!(result, Err(OrchestratorError::InvalidConfig { .. })));
    }

    #[test]
    fn rejects_empty_pattern_for_domain_generation() {
        let cfg = serde_json::json!({ "pattern": "", "tld_list": ["com"], "max_domains": 10 });
        let result = PhaseConfiguration::parse(PhaseType::DomainGeneration, &cfg);
        assert!(matches!(result, Err(OrchestratorError::InvalidConfig { .. })));
    }

    #[test]
    fn rejects_missing_required_key() {
        let cfg = serde_json::json!({ "stealth_enabled": true, "batch_size": 10 });
        let result = PhaseConfiguration::parse(PhaseType::HttpKeywordValidation, &cfg);
        assert!(matches!(result, Err(OrchestratorError::InvalidConfig { .. })));
    }

    #[test]
    fn accepts_well_formed_analysis_config() {
        let cfg = serde_json::json!({
            "scoring_profile_id": uuid::Uuid::new_v4(),
            "batch_size": 25,
            "rescore_on_config_change": true,
        });
        let parsed = PhaseConfiguration::parse(PhaseType::Analysis, &cfg).unwrap();
        assert_eq!(parsed.phase_type(), PhaseType::Analysis);
    }
}
