use anyhow::Result;
use chrono::Utc;
use rusqlite::{params, OptionalExtension, Row};
use uuid::Uuid;

use super::{enum_col, fmt_ts, ts_col, uuid_col, Database};
use crate::error::ValidationError;
use crate::models::*;

const MATCH_COLUMNS: &str = "id, intended_parent_id, surrogate_id, status, ip_accepted, ip_declined, surrogate_accepted, surrogate_declined, score, notes, created_at, updated_at";

fn row_to_match(row: &Row) -> rusqlite::Result<Match> {
    Ok(Match {
        id: uuid_col(row, "id")?,
        intended_parent_id: uuid_col(row, "intended_parent_id")?,
        surrogate_id: uuid_col(row, "surrogate_id")?,
        status: enum_col(row, "status", MatchStatus::from_str)?,
        ip_accepted: row.get("ip_accepted")?,
        ip_declined: row.get("ip_declined")?,
        surrogate_accepted: row.get("surrogate_accepted")?,
        surrogate_declined: row.get("surrogate_declined")?,
        score: row.get("score")?,
        notes: row.get("notes")?,
        created_at: ts_col(row, "created_at")?,
        updated_at: ts_col(row, "updated_at")?,
    })
}

fn warn_on_conflicting_flags(m: &Match) {
    for side in m.conflicting_sides() {
        tracing::warn!(id = %m.id, side, "Match has both accepted and declined set");
    }
}

impl Database {
    pub fn create_match(&self, input: CreateMatchInput) -> Result<Match, ValidationError> {
        self.require_participant(input.intended_parent_id, Some(ParticipantRole::IntendedParent))?;
        self.require_participant(input.surrogate_id, Some(ParticipantRole::Surrogate))?;

        let now = Utc::now();
        let m = Match {
            id: Uuid::new_v4(),
            intended_parent_id: input.intended_parent_id,
            surrogate_id: input.surrogate_id,
            status: input.status.unwrap_or_default(),
            ip_accepted: false,
            ip_declined: false,
            surrogate_accepted: false,
            surrogate_declined: false,
            score: input.score,
            notes: input.notes,
            created_at: now,
            updated_at: now,
        };

        let conn = self.conn()?;
        conn.execute(
            &format!(
                "INSERT INTO matches ({}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
                MATCH_COLUMNS
            ),
            params![
                m.id.to_string(),
                m.intended_parent_id.to_string(),
                m.surrogate_id.to_string(),
                m.status.as_str(),
                m.ip_accepted,
                m.ip_declined,
                m.surrogate_accepted,
                m.surrogate_declined,
                m.score,
                m.notes,
                fmt_ts(m.created_at),
                fmt_ts(m.updated_at),
            ],
        )?;

        tracing::info!(id = %m.id, status = m.status.as_str(), "Created match");
        Ok(m)
    }

    pub fn get_match(&self, id: Uuid) -> Result<Option<Match>> {
        let conn = self.conn()?;
        let m = conn
            .query_row(
                &format!("SELECT {} FROM matches WHERE id = ?1", MATCH_COLUMNS),
                params![id.to_string()],
                row_to_match,
            )
            .optional()?;
        Ok(m)
    }

    pub fn list_matches(&self, filter: &MatchFilter) -> Result<Vec<Match>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM matches
             WHERE (?1 IS NULL OR status = ?1)
               AND (?2 IS NULL OR intended_parent_id = ?2 OR surrogate_id = ?2)
             ORDER BY created_at, id",
            MATCH_COLUMNS
        ))?;
        let rows = stmt.query_map(
            params![
                filter.status.map(|s| s.as_str()),
                filter.participant_id.map(|id| id.to_string()),
            ],
            row_to_match,
        )?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    /// Applies whichever fields are present. Status changes are unrestricted
    /// and the accept/decline flags never change the status on their own.
    pub fn update_match(&self, id: Uuid, input: UpdateMatchInput) -> Result<Option<Match>> {
        let Some(mut m) = self.get_match(id)? else {
            return Ok(None);
        };

        if let Some(status) = input.status {
            m.status = status;
        }
        if let Some(v) = input.ip_accepted {
            m.ip_accepted = v;
        }
        if let Some(v) = input.ip_declined {
            m.ip_declined = v;
        }
        if let Some(v) = input.surrogate_accepted {
            m.surrogate_accepted = v;
        }
        if let Some(v) = input.surrogate_declined {
            m.surrogate_declined = v;
        }
        if input.score.is_some() {
            m.score = input.score;
        }
        if input.notes.is_some() {
            m.notes = input.notes;
        }
        m.updated_at = Utc::now();

        let conn = self.conn()?;
        conn.execute(
            "UPDATE matches
             SET status = ?2, ip_accepted = ?3, ip_declined = ?4, surrogate_accepted = ?5,
                 surrogate_declined = ?6, score = ?7, notes = ?8, updated_at = ?9
             WHERE id = ?1",
            params![
                id.to_string(),
                m.status.as_str(),
                m.ip_accepted,
                m.ip_declined,
                m.surrogate_accepted,
                m.surrogate_declined,
                m.score,
                m.notes,
                fmt_ts(m.updated_at),
            ],
        )?;

        warn_on_conflicting_flags(&m);
        Ok(Some(m))
    }

    pub fn delete_match(&self, id: Uuid) -> Result<bool> {
        let conn = self.conn()?;
        let changed = conn.execute("DELETE FROM matches WHERE id = ?1", params![id.to_string()])?;
        Ok(changed > 0)
    }
}
