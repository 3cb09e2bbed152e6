use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A tracked pairing of one intended parent and one surrogate, moving through
/// the fixed stage list of its track.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Journey {
    pub id: Uuid,
    pub track: JourneyTrack,
    pub intended_parent_id: Uuid,
    pub surrogate_id: Uuid,
    pub match_id: Option<Uuid>,
    pub current_stage: Stage,
    pub stage_history: Vec<StageHistoryEntry>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Record of a stage that was left. Append-only.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StageHistoryEntry {
    pub id: Uuid,
    pub journey_id: Uuid,
    pub stage: Stage,
    pub completed_at: DateTime<Utc>,
    pub completed_by: Uuid,
    pub notes: Option<String>,
}

/// Which ordered stage list a journey follows.
///
/// `Case` is the agency-side view of a pairing, from matching onwards.
/// `Milestone` tracks the medical journey once a pairing is confirmed.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum JourneyTrack {
    Case,
    Milestone,
}

const CASE_STAGES: &[Stage] = &[
    Stage::Matching,
    Stage::Screening,
    Stage::Medical,
    Stage::Legal,
    Stage::Pregnancy,
    Stage::Completed,
];

const MILESTONE_STAGES: &[Stage] = &[
    Stage::MedicalScreening,
    Stage::Legal,
    Stage::EmbryoTransfer,
    Stage::Pregnancy,
    Stage::Birth,
    Stage::Completed,
];

impl JourneyTrack {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Case => "case",
            Self::Milestone => "milestone",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "case" => Some(Self::Case),
            "milestone" => Some(Self::Milestone),
            _ => None,
        }
    }

    /// The fixed, ordered stage list for this track.
    pub fn stages(&self) -> &'static [Stage] {
        match self {
            Self::Case => CASE_STAGES,
            Self::Milestone => MILESTONE_STAGES,
        }
    }

    pub fn first_stage(&self) -> Stage {
        self.stages()[0]
    }

    pub fn last_stage(&self) -> Stage {
        self.stages()[self.stages().len() - 1]
    }

    pub fn index_of(&self, stage: Stage) -> Option<usize> {
        self.stages().iter().position(|s| *s == stage)
    }

    pub fn contains(&self, stage: Stage) -> bool {
        self.index_of(stage).is_some()
    }
}

/// Every stage used by any track. Membership in a particular track is
/// checked through [`JourneyTrack::contains`].
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Matching,
    Screening,
    Medical,
    MedicalScreening,
    Legal,
    EmbryoTransfer,
    Pregnancy,
    Birth,
    Completed,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Matching => "matching",
            Self::Screening => "screening",
            Self::Medical => "medical",
            Self::MedicalScreening => "medical_screening",
            Self::Legal => "legal",
            Self::EmbryoTransfer => "embryo_transfer",
            Self::Pregnancy => "pregnancy",
            Self::Birth => "birth",
            Self::Completed => "completed",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "matching" => Some(Self::Matching),
            "screening" => Some(Self::Screening),
            "medical" => Some(Self::Medical),
            "medical_screening" => Some(Self::MedicalScreening),
            "legal" => Some(Self::Legal),
            "embryo_transfer" => Some(Self::EmbryoTransfer),
            "pregnancy" => Some(Self::Pregnancy),
            "birth" => Some(Self::Birth),
            "completed" => Some(Self::Completed),
            _ => None,
        }
    }

    /// Human-readable label used by timeline views.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Matching => "Matching",
            Self::Screening => "Screening",
            Self::Medical => "Medical",
            Self::MedicalScreening => "Medical Screening",
            Self::Legal => "Legal",
            Self::EmbryoTransfer => "Embryo Transfer",
            Self::Pregnancy => "Pregnancy",
            Self::Birth => "Birth",
            Self::Completed => "Completed",
        }
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateJourneyInput {
    pub track: JourneyTrack,
    pub intended_parent_id: Uuid,
    pub surrogate_id: Uuid,
    pub match_id: Option<Uuid>,
    /// Starting stage; defaults to the first stage of the track.
    pub current_stage: Option<Stage>,
    pub notes: Option<String>,
}

/// Request to move a journey forward.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AdvanceJourneyInput {
    /// Explicit target stage. When absent the journey moves to the next stage.
    pub target_stage: Option<Stage>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct JourneyFilter {
    pub track: Option<JourneyTrack>,
    pub participant_id: Option<Uuid>,
    pub stage: Option<Stage>,
}
