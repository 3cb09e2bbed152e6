//! Typed failures callers need to tell apart.
//!
//! Plain storage failures stay `anyhow::Error`; these wrap them where a
//! domain rule can also reject the operation.

use thiserror::Error;
use uuid::Uuid;

use crate::models::{JourneyTrack, Stage};

#[derive(Debug, Error)]
pub enum ProgressionError {
    #[error("journey {0} not found")]
    JourneyNotFound(Uuid),

    #[error("journey is already at its final stage ({0})")]
    AlreadyCompleted(Stage),

    #[error("stage {stage} is not part of the {} track", track.as_str())]
    StageNotInTrack { track: JourneyTrack, stage: Stage },

    #[error("cannot move from {from} to {to}: target must come after the current stage")]
    NotForward { from: Stage, to: Stage },

    #[error("journey {0} was advanced concurrently; reload and retry")]
    Conflict(Uuid),

    #[error(transparent)]
    Storage(#[from] anyhow::Error),
}

#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("{0} must not be empty")]
    Blank(&'static str),

    #[error("participant {0} not found")]
    ParticipantNotFound(Uuid),

    #[error("participant {id} must be a {expected}")]
    WrongRole { id: Uuid, expected: &'static str },

    #[error("amount must be positive, got {0}")]
    NonPositiveAmount(i64),

    #[error("amount {cents} exceeds the maximum of {max} cents")]
    AmountTooLarge { cents: i64, max: i64 },

    #[error("participant {0} is not part of this conversation")]
    NotAConversationMember(Uuid),

    #[error("a conversation needs at least two participants")]
    TooFewParticipants,

    #[error("stage {stage} is not part of the {track} track")]
    StageNotInTrack { track: &'static str, stage: Stage },

    #[error(transparent)]
    Storage(#[from] anyhow::Error),
}

impl From<rusqlite::Error> for ValidationError {
    fn from(e: rusqlite::Error) -> Self {
        Self::Storage(e.into())
    }
}

impl From<rusqlite::Error> for ProgressionError {
    fn from(e: rusqlite::Error) -> Self {
        Self::Storage(e.into())
    }
}

impl From<serde_json::Error> for ValidationError {
    fn from(e: serde_json::Error) -> Self {
        Self::Storage(e.into())
    }
}
