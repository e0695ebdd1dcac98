//! Scoring profiles and the score-breakdown response shape.
//!
//! The scoring algorithm itself (how features become component scores) is
//! out of scope; this module only carries the profile record and the
//! breakdown contract that `score_breakdown_full` returns.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoringProfile {
    pub id: Uuid,
    pub name: String,
    pub version: u32,
    pub description: Option<String>,
    /// Named components → non-negative weights; at least one must be positive.
    pub weights: BTreeMap<String, f64>,
    pub parked_penalty_factor: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ScoringProfile {
    /// Weights must be finite and non-negative, with at least one positive.
    pub fn has_valid_weights(&self) -> bool {
        if self.weights.is_empty() {
            return false;
        }
        let mut any_positive = false;
        for &w in self.weights.values() {
            if !w.is_finite() || w < 0.0 {
                return false;
            }
            if w > 0.0 {
                any_positive = true;
            }
        }
        any_positive
    }
}

/// The full breakdown of a domain's score under a profile: per-component
/// contributions, the weights used, the final score, and the penalty
/// factor applied to parked/placeholder domains.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub domain_name: String,
    pub components: BTreeMap<String, f64>,
    pub weights: BTreeMap<String, f64>,
    pub final_score: f64,
    pub parked_penalty_factor: f64,
}
