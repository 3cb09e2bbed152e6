//! Journey stage progression.
//!
//! A journey walks forward through the ordered stage list of its
//! [`JourneyTrack`]. Every move records the stage being left in the journey's
//! history and never goes backwards. The functions here are pure; persisting a
//! progression is [`crate::Database::advance_journey`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ProgressionError;
use crate::models::{AdvanceJourneyInput, Journey, JourneyTrack, Stage, StageHistoryEntry};

/// The stage after `current`, or `None` when `current` is the last stage
/// (or not part of the track at all).
pub fn next_stage(track: JourneyTrack, current: Stage) -> Option<Stage> {
    let index = track.index_of(current)?;
    track.stages().get(index + 1).copied()
}

/// Integer percentage of the track reached: `(index + 1) * 100 / len`.
pub fn progress_percent(track: JourneyTrack, current: Stage) -> u8 {
    let stages = track.stages();
    match track.index_of(current) {
        Some(index) => ((index + 1) * 100 / stages.len()) as u8,
        None => 0,
    }
}

/// The one transition rule: the target must belong to the track and come
/// strictly after `from`. Skipping ahead is allowed.
pub fn validate_transition(
    track: JourneyTrack,
    from: Stage,
    to: Stage,
) -> Result<(), ProgressionError> {
    let from_index = track
        .index_of(from)
        .ok_or(ProgressionError::StageNotInTrack { track, stage: from })?;
    let to_index = track
        .index_of(to)
        .ok_or(ProgressionError::StageNotInTrack { track, stage: to })?;

    if to_index <= from_index {
        return Err(ProgressionError::NotForward { from, to });
    }
    Ok(())
}

/// Moves `journey` forward in memory and returns the history entry that was
/// appended. On error the journey is left untouched.
pub fn apply_progression(
    journey: &mut Journey,
    input: &AdvanceJourneyInput,
    actor: Uuid,
    now: DateTime<Utc>,
) -> Result<StageHistoryEntry, ProgressionError> {
    let track = journey.track;
    let current = journey.current_stage;
    if !track.contains(current) {
        return Err(ProgressionError::StageNotInTrack {
            track,
            stage: current,
        });
    }
    if current == track.last_stage() {
        return Err(ProgressionError::AlreadyCompleted(current));
    }

    let target = match input.target_stage {
        Some(stage) => stage,
        None => next_stage(track, current).ok_or(ProgressionError::AlreadyCompleted(current))?,
    };
    validate_transition(track, current, target)?;

    let entry = StageHistoryEntry {
        id: Uuid::new_v4(),
        journey_id: journey.id,
        stage: current,
        completed_at: now,
        completed_by: actor,
        notes: input.notes.clone(),
    };

    journey.stage_history.push(entry.clone());
    journey.current_stage = target;
    journey.updated_at = now;

    Ok(entry)
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum StepState {
    Completed,
    Current,
    Upcoming,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TimelineStep {
    pub stage: Stage,
    pub label: String,
    pub state: StepState,
    pub completed_at: Option<DateTime<Utc>>,
    pub completed_by: Option<Uuid>,
}

/// View model for rendering a journey as a horizontal timeline.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StageTimeline {
    pub journey_id: Uuid,
    pub track: JourneyTrack,
    pub current_stage: Stage,
    pub percent_complete: u8,
    pub is_complete: bool,
    pub steps: Vec<TimelineStep>,
}

impl StageTimeline {
    pub fn build(journey: &Journey) -> Self {
        let track = journey.track;
        let current_index = track.index_of(journey.current_stage).unwrap_or(0);

        let steps = track
            .stages()
            .iter()
            .enumerate()
            .map(|(index, stage)| {
                let state = if index < current_index {
                    StepState::Completed
                } else if index == current_index {
                    StepState::Current
                } else {
                    StepState::Upcoming
                };
                // Latest entry wins if a stage was somehow recorded twice.
                let recorded = journey
                    .stage_history
                    .iter()
                    .rev()
                    .find(|h| h.stage == *stage);
                TimelineStep {
                    stage: *stage,
                    label: stage.label().to_string(),
                    state,
                    completed_at: recorded.map(|h| h.completed_at),
                    completed_by: recorded.map(|h| h.completed_by),
                }
            })
            .collect();

        Self {
            journey_id: journey.id,
            track,
            current_stage: journey.current_stage,
            percent_complete: progress_percent(track, journey.current_stage),
            is_complete: journey.current_stage == track.last_stage(),
            steps,
        }
    }
}
