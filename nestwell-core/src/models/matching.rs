use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Match {
    pub id: Uuid,
    pub intended_parent_id: Uuid,
    pub surrogate_id: Uuid,
    pub status: MatchStatus,
    pub ip_accepted: bool,
    pub ip_declined: bool,
    pub surrogate_accepted: bool,
    pub surrogate_declined: bool,
    pub score: Option<f64>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Match {
    /// Sides whose accept and decline flags are both set.
    ///
    /// Nothing prevents this combination; callers surface it rather than
    /// resolve it.
    pub fn conflicting_sides(&self) -> Vec<&'static str> {
        let mut sides = Vec::new();
        if self.ip_accepted && self.ip_declined {
            sides.push("intended_parent");
        }
        if self.surrogate_accepted && self.surrogate_declined {
            sides.push("surrogate");
        }
        sides
    }
}

/// Match status. Any status may be set from any other.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum MatchStatus {
    #[default]
    Proposed,
    UnderReview,
    Presented,
    Accepted,
    Declined,
    Active,
    OnHold,
    Cancelled,
}

impl MatchStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Proposed => "proposed",
            Self::UnderReview => "under_review",
            Self::Presented => "presented",
            Self::Accepted => "accepted",
            Self::Declined => "declined",
            Self::Active => "active",
            Self::OnHold => "on_hold",
            Self::Cancelled => "cancelled",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "proposed" => Some(Self::Proposed),
            "under_review" => Some(Self::UnderReview),
            "presented" => Some(Self::Presented),
            "accepted" => Some(Self::Accepted),
            "declined" => Some(Self::Declined),
            "active" => Some(Self::Active),
            "on_hold" => Some(Self::OnHold),
            "cancelled" => Some(Self::Cancelled),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateMatchInput {
    pub intended_parent_id: Uuid,
    pub surrogate_id: Uuid,
    pub status: Option<MatchStatus>,
    pub score: Option<f64>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateMatchInput {
    pub status: Option<MatchStatus>,
    pub ip_accepted: Option<bool>,
    pub ip_declined: Option<bool>,
    pub surrogate_accepted: Option<bool>,
    pub surrogate_declined: Option<bool>,
    pub score: Option<f64>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MatchFilter {
    pub status: Option<MatchStatus>,
    pub participant_id: Option<Uuid>,
}
