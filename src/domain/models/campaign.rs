//! Campaign model and derived campaign-level state.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::phase::{PhaseStatus, PhaseType, PHASE_ORDER};

/// Campaign-level derived state, recomputed on every phase transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CampaignState {
    Draft,
    Running,
    Completed,
    Failed,
    Cancelled,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Campaign {
    pub id: Uuid,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Always "lead_generation" today; retained for future campaign variants.
    pub campaign_type: String,
    pub total_phases: u32,
    pub completed_phases: u32,
    pub is_full_sequence_mode: bool,
    pub current_phase: Option<PhaseType>,
    pub phase_status: Option<PhaseStatus>,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub estimated_completion_at: Option<DateTime<Utc>>,
}

impl Campaign {
    pub fn new(name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            created_at: now,
            updated_at: now,
            campaign_type: "lead_generation".to_string(),
            total_phases: PHASE_ORDER.len() as u32,
            completed_phases: 0,
            is_full_sequence_mode: true,
            current_phase: None,
            phase_status: None,
            started_at: None,
            completed_at: None,
            estimated_completion_at: None,
        }
    }

    /// `draft` until any phase enters `running`; terminal states `completed`,
    /// `failed`, `cancelled`; `running` otherwise.
    pub fn state(&self) -> CampaignState {
        match self.phase_status {
            None => CampaignState::Draft,
            Some(PhaseStatus::Failed) => CampaignState::Failed,
            Some(PhaseStatus::Completed) if self.completed_phases == self.total_phases => {
                CampaignState::Completed
            }
            _ => CampaignState::Running,
        }
    }

    /// Recompute `phase_status`/`current_phase`/`completed_phases` from the
    /// per-phase rows, per the dominance order in §4.2: `failed` dominates,
    /// then `in_progress`, then `paused`, then `completed` only if every
    /// phase is `completed`, otherwise the newest configured/ready state.
    pub fn recompute_from_phases(&mut self, phases: &[(PhaseType, PhaseStatus)]) {
        self.completed_phases =
            phases.iter().filter(|(_, s)| *s == PhaseStatus::Completed).count() as u32;

        let dominant = phases
            .iter()
            .find(|(_, s)| *s == PhaseStatus::Failed)
            .or_else(|| phases.iter().find(|(_, s)| *s == PhaseStatus::InProgress))
            .or_else(|| phases.iter().find(|(_, s)| *s == PhaseStatus::Paused))
            .or_else(|| {
                if self.completed_phases as usize == PHASE_ORDER.len() {
                    phases.iter().find(|(_, s)| *s == PhaseStatus::Completed)
                } else {
                    None
                }
            })
            .or_else(|| {
                phases
                    .iter()
                    .rev()
                    .find(|(_, s)| matches!(s, PhaseStatus::Configured | PhaseStatus::Ready))
            });

        if let Some((phase_type, status)) = dominant {
            self.current_phase = Some(*phase_type);
            self.phase_status = Some(*status);
        }

        if self.started_at.is_none()
            && phases.iter().any(|(_, s)| {
                matches!(
                    s,
                    PhaseStatus::InProgress | PhaseStatus::Completed | PhaseStatus::Failed
                )
            })
        {
            self.started_at = Some(Utc::now());
        }

        if self.completed_phases as usize == PHASE_ORDER.len() {
            self.completed_at = Some(Utc::now());
        }

        self.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_campaign_starts_in_draft() {
        let campaign = Campaign::new("acme-q3");
        assert_eq!(campaign.state(), CampaignState::Draft);
        assert_eq!(campaign.campaign_type, "lead_generation");
    }

    #[test]
    fn failed_phase_dominates_recomputation() {
        let mut campaign = Campaign::new("acme-q3");
        campaign.recompute_from_phases(&[
            (PhaseType::DomainGeneration, PhaseStatus::Completed),
            (PhaseType::DnsValidation, PhaseStatus::Failed),
            (PhaseType::HttpKeywordValidation, PhaseStatus::NotStarted),
            (PhaseType::Analysis, PhaseStatus::NotStarted),
        ]);
        assert_eq!(campaign.phase_status, Some(PhaseStatus::Failed));
        assert_eq!(campaign.current_phase, Some(PhaseType::DnsValidation));
    }

    #[test]
    fn all_completed_yields_completed_campaign_state() {
        let mut campaign = Campaign::new("acme-q3");
        campaign.recompute_from_phases(&[
            (PhaseType::DomainGeneration, PhaseStatus::Completed),
            (PhaseType::DnsValidation, PhaseStatus::Completed),
            (PhaseType::HttpKeywordValidation, PhaseStatus::Completed),
            (PhaseType::Analysis, PhaseStatus::Completed),
        ]);
        assert_eq!(campaign.state(), CampaignState::Completed);
        assert!(campaign.completed_at.is_some());
    }

    #[test]
    fn in_progress_phase_means_campaign_is_not_completed() {
        let mut campaign = Campaign::new("acme-q3");
        campaign.recompute_from_phases(&[
            (PhaseType::DomainGeneration, PhaseStatus::Completed),
            (PhaseType::DnsValidation, PhaseStatus::Completed),
            (PhaseType::HttpKeywordValidation, PhaseStatus::Completed),
            (PhaseType::Analysis, PhaseStatus::InProgress),
        ]);
        assert_ne!(campaign.state(), CampaignState::Completed);
    }
}
