use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MedicalScreening {
    pub id: Uuid,
    pub surrogate_id: Uuid,
    pub screening_type: String,
    pub status: ScreeningStatus,
    pub result_notes: Option<String>,
    pub reviewed_by: Option<Uuid>,
    pub reviewed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ScreeningStatus {
    Pending,
    Cleared,
    Rejected,
}

impl ScreeningStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Cleared => "cleared",
            Self::Rejected => "rejected",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(Self::Pending),
            "cleared" => Some(Self::Cleared),
            "rejected" => Some(Self::Rejected),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateScreeningInput {
    pub surrogate_id: Uuid,
    pub screening_type: String,
    pub result_notes: Option<String>,
}

/// Outcome an admin can record for a screening.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ScreeningDecision {
    Cleared,
    Rejected,
}

impl From<ScreeningDecision> for ScreeningStatus {
    fn from(d: ScreeningDecision) -> Self {
        match d {
            ScreeningDecision::Cleared => Self::Cleared,
            ScreeningDecision::Rejected => Self::Rejected,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewScreeningInput {
    pub decision: ScreeningDecision,
    pub result_notes: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScreeningFilter {
    pub surrogate_id: Option<Uuid>,
    pub status: Option<ScreeningStatus>,
}
