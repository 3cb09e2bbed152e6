use anyhow::Result;
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension, Row};
use uuid::Uuid;

use super::{enum_col, fmt_ts, opt_uuid_col, ts_col, uuid_col, Database};
use crate::error::{ProgressionError, ValidationError};
use crate::models::*;
use crate::progression::{apply_progression, StageTimeline};

const JOURNEY_COLUMNS: &str =
    "id, track, intended_parent_id, surrogate_id, match_id, current_stage, notes, created_at, updated_at";

fn row_to_journey(row: &Row) -> rusqlite::Result<Journey> {
    Ok(Journey {
        id: uuid_col(row, "id")?,
        track: enum_col(row, "track", JourneyTrack::from_str)?,
        intended_parent_id: uuid_col(row, "intended_parent_id")?,
        surrogate_id: uuid_col(row, "surrogate_id")?,
        match_id: opt_uuid_col(row, "match_id")?,
        current_stage: enum_col(row, "current_stage", Stage::from_str)?,
        stage_history: Vec::new(),
        notes: row.get("notes")?,
        created_at: ts_col(row, "created_at")?,
        updated_at: ts_col(row, "updated_at")?,
    })
}

fn row_to_history(row: &Row) -> rusqlite::Result<StageHistoryEntry> {
    Ok(StageHistoryEntry {
        id: uuid_col(row, "id")?,
        journey_id: uuid_col(row, "journey_id")?,
        stage: enum_col(row, "stage", Stage::from_str)?,
        completed_at: ts_col(row, "completed_at")?,
        completed_by: uuid_col(row, "completed_by")?,
        notes: row.get("notes")?,
    })
}

fn load_history(conn: &Connection, journey_id: Uuid) -> rusqlite::Result<Vec<StageHistoryEntry>> {
    let mut stmt = conn.prepare(
        "SELECT id, journey_id, stage, completed_at, completed_by, notes
         FROM stage_history WHERE journey_id = ?1 ORDER BY seq",
    )?;
    let rows = stmt.query_map(params![journey_id.to_string()], row_to_history)?;
    rows.collect()
}

impl Database {
    pub fn create_journey(&self, input: CreateJourneyInput) -> Result<Journey, ValidationError> {
        self.require_participant(input.intended_parent_id, Some(ParticipantRole::IntendedParent))?;
        self.require_participant(input.surrogate_id, Some(ParticipantRole::Surrogate))?;

        let track = input.track;
        let stage = input.current_stage.unwrap_or_else(|| track.first_stage());
        if !track.contains(stage) {
            return Err(ValidationError::StageNotInTrack {
                track: track.as_str(),
                stage,
            });
        }

        let now = Utc::now();
        let journey = Journey {
            id: Uuid::new_v4(),
            track,
            intended_parent_id: input.intended_parent_id,
            surrogate_id: input.surrogate_id,
            match_id: input.match_id,
            current_stage: stage,
            stage_history: Vec::new(),
            notes: input.notes,
            created_at: now,
            updated_at: now,
        };

        let conn = self.conn()?;
        conn.execute(
            &format!(
                "INSERT INTO journeys ({}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
                JOURNEY_COLUMNS
            ),
            params![
                journey.id.to_string(),
                journey.track.as_str(),
                journey.intended_parent_id.to_string(),
                journey.surrogate_id.to_string(),
                journey.match_id.map(|id| id.to_string()),
                journey.current_stage.as_str(),
                journey.notes,
                fmt_ts(journey.created_at),
                fmt_ts(journey.updated_at),
            ],
        )?;

        tracing::info!(
            id = %journey.id,
            track = journey.track.as_str(),
            stage = journey.current_stage.as_str(),
            "Created journey"
        );
        Ok(journey)
    }

    pub fn get_journey(&self, id: Uuid) -> Result<Option<Journey>> {
        let conn = self.conn()?;
        let journey = conn
            .query_row(
                &format!("SELECT {} FROM journeys WHERE id = ?1", JOURNEY_COLUMNS),
                params![id.to_string()],
                row_to_journey,
            )
            .optional()?;

        match journey {
            Some(mut journey) => {
                journey.stage_history = load_history(&conn, id)?;
                Ok(Some(journey))
            }
            None => Ok(None),
        }
    }

    pub fn list_journeys(&self, filter: &JourneyFilter) -> Result<Vec<Journey>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM journeys
             WHERE (?1 IS NULL OR track = ?1)
               AND (?2 IS NULL OR intended_parent_id = ?2 OR surrogate_id = ?2)
               AND (?3 IS NULL OR current_stage = ?3)
             ORDER BY created_at, id",
            JOURNEY_COLUMNS
        ))?;
        let journeys = stmt
            .query_map(
                params![
                    filter.track.map(|t| t.as_str()),
                    filter.participant_id.map(|id| id.to_string()),
                    filter.stage.map(|s| s.as_str()),
                ],
                row_to_journey,
            )?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        journeys
            .into_iter()
            .map(|mut journey| -> Result<Journey> {
                journey.stage_history = load_history(&conn, journey.id)?;
                Ok(journey)
            })
            .collect()
    }

    pub fn delete_journey(&self, id: Uuid) -> Result<bool> {
        let conn = self.conn()?;
        let changed = conn.execute("DELETE FROM journeys WHERE id = ?1", params![id.to_string()])?;
        Ok(changed > 0)
    }

    pub fn get_stage_history(&self, journey_id: Uuid) -> Result<Vec<StageHistoryEntry>> {
        let conn = self.conn()?;
        Ok(load_history(&conn, journey_id)?)
    }

    pub fn get_journey_timeline(&self, id: Uuid) -> Result<Option<StageTimeline>> {
        Ok(self.get_journey(id)?.map(|j| StageTimeline::build(&j)))
    }

    /// Moves a journey forward on behalf of `actor`.
    ///
    /// The stage change and its history entry are written in one transaction,
    /// and only if the stored stage is still the one the move started from.
    pub fn advance_journey(
        &self,
        id: Uuid,
        input: &AdvanceJourneyInput,
        actor: Uuid,
    ) -> Result<Journey, ProgressionError> {
        let mut journey = self
            .get_journey(id)?
            .ok_or(ProgressionError::JourneyNotFound(id))?;
        let from = journey.current_stage;

        let entry = apply_progression(&mut journey, input, actor, Utc::now())?;
        self.commit_progression(&journey, from, &entry)?;

        tracing::info!(
            id = %journey.id,
            from = from.as_str(),
            to = journey.current_stage.as_str(),
            actor = %actor,
            "Advanced journey"
        );
        Ok(journey)
    }

    fn commit_progression(
        &self,
        journey: &Journey,
        expected_stage: Stage,
        entry: &StageHistoryEntry,
    ) -> Result<(), ProgressionError> {
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;

        let changed = tx.execute(
            "UPDATE journeys SET current_stage = ?2, updated_at = ?3
             WHERE id = ?1 AND current_stage = ?4",
            params![
                journey.id.to_string(),
                journey.current_stage.as_str(),
                fmt_ts(journey.updated_at),
                expected_stage.as_str(),
            ],
        )?;
        if changed == 0 {
            tracing::warn!(id = %journey.id, "Journey stage changed underneath a progression");
            return Err(ProgressionError::Conflict(journey.id));
        }

        tx.execute(
            "INSERT INTO stage_history (id, journey_id, stage, completed_at, completed_by, notes, seq)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6,
                     (SELECT COALESCE(MAX(seq), 0) + 1 FROM stage_history WHERE journey_id = ?2))",
            params![
                entry.id.to_string(),
                entry.journey_id.to_string(),
                entry.stage.as_str(),
                fmt_ts(entry.completed_at),
                entry.completed_by.to_string(),
                entry.notes,
            ],
        )?;

        tx.commit()?;
        Ok(())
    }
}
