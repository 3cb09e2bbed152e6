use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// An intended parent, surrogate or agency admin.
///
/// Intake forms evolve faster than the schema, so everything the forms collect
/// beyond the handful of indexed columns lives in `form_data`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Participant {
    pub id: Uuid,
    pub role: ParticipantRole,
    pub status: ParticipantStatus,
    pub email: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub display_name: Option<String>,
    pub phone: Option<String>,
    pub form_data: serde_json::Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ParticipantRole {
    IntendedParent,
    Surrogate,
    Admin,
}

impl ParticipantRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::IntendedParent => "intended_parent",
            Self::Surrogate => "surrogate",
            Self::Admin => "admin",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "intended_parent" => Some(Self::IntendedParent),
            "surrogate" => Some(Self::Surrogate),
            "admin" => Some(Self::Admin),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ParticipantStatus {
    Lead,
    Applicant,
    Active,
    Matched,
    Inactive,
}

impl ParticipantStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Lead => "lead",
            Self::Applicant => "applicant",
            Self::Active => "active",
            Self::Matched => "matched",
            Self::Inactive => "inactive",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "lead" => Some(Self::Lead),
            "applicant" => Some(Self::Applicant),
            "active" => Some(Self::Active),
            "matched" => Some(Self::Matched),
            "inactive" => Some(Self::Inactive),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateParticipantInput {
    pub role: ParticipantRole,
    pub status: Option<ParticipantStatus>,
    pub email: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub display_name: Option<String>,
    pub phone: Option<String>,
    #[serde(default)]
    pub form_data: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateParticipantInput {
    pub status: Option<ParticipantStatus>,
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub display_name: Option<String>,
    pub phone: Option<String>,
    pub form_data: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ParticipantFilter {
    pub role: Option<ParticipantRole>,
    pub status: Option<ParticipantStatus>,
}

/// What list views and denormalized references show for a participant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParticipantSummary {
    pub id: Uuid,
    pub role: ParticipantRole,
    pub name: String,
    pub email: String,
}

impl From<&Participant> for ParticipantSummary {
    fn from(p: &Participant) -> Self {
        Self {
            id: p.id,
            role: p.role,
            name: crate::names::resolve_display_name(p),
            email: p.email.clone(),
        }
    }
}
