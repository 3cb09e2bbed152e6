//! Request and response bodies that exist only at the HTTP boundary.

use nestwell_core::models::*;
use nestwell_core::progression::progress_percent;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

impl Default for HealthResponse {
    fn default() -> Self {
        Self {
            status: "ok".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

/// A participant together with the name every screen should show.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParticipantView {
    #[serde(flatten)]
    pub participant: Participant,
    pub name: String,
}

impl From<Participant> for ParticipantView {
    fn from(participant: Participant) -> Self {
        let name = nestwell_core::resolve_display_name(&participant);
        Self { participant, name }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JourneyDetail {
    #[serde(flatten)]
    pub journey: Journey,
    pub percent_complete: u8,
    pub intended_parent: Option<ParticipantSummary>,
    pub surrogate: Option<ParticipantSummary>,
}

impl JourneyDetail {
    pub fn new(
        journey: Journey,
        intended_parent: Option<&Participant>,
        surrogate: Option<&Participant>,
    ) -> Self {
        Self {
            percent_complete: progress_percent(journey.track, journey.current_stage),
            intended_parent: intended_parent.map(ParticipantSummary::from),
            surrogate: surrogate.map(ParticipantSummary::from),
            journey,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StageInfo {
    pub stage: Stage,
    pub label: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StageListResponse {
    pub track: JourneyTrack,
    pub stages: Vec<StageInfo>,
}

impl StageListResponse {
    pub fn for_track(track: JourneyTrack) -> Self {
        Self {
            track,
            stages: track
                .stages()
                .iter()
                .map(|s| StageInfo {
                    stage: *s,
                    label: s.label().to_string(),
                })
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationQuery {
    pub participant_id: Uuid,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarkReadRequest {
    pub reader_id: Uuid,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarkReadResponse {
    pub marked: usize,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LedgerSummaryQuery {
    pub journey_id: Option<Uuid>,
}
