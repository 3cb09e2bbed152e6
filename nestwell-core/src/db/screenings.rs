use anyhow::Result;
use chrono::Utc;
use rusqlite::{params, OptionalExtension, Row};
use uuid::Uuid;

use super::{enum_col, fmt_ts, opt_ts_col, opt_uuid_col, ts_col, uuid_col, Database};
use crate::error::ValidationError;
use crate::models::*;

const SCREENING_COLUMNS: &str =
    "id, surrogate_id, screening_type, status, result_notes, reviewed_by, reviewed_at, created_at";

fn row_to_screening(row: &Row) -> rusqlite::Result<MedicalScreening> {
    Ok(MedicalScreening {
        id: uuid_col(row, "id")?,
        surrogate_id: uuid_col(row, "surrogate_id")?,
        screening_type: row.get("screening_type")?,
        status: enum_col(row, "status", ScreeningStatus::from_str)?,
        result_notes: row.get("result_notes")?,
        reviewed_by: opt_uuid_col(row, "reviewed_by")?,
        reviewed_at: opt_ts_col(row, "reviewed_at")?,
        created_at: ts_col(row, "created_at")?,
    })
}

impl Database {
    pub fn create_screening(
        &self,
        input: CreateScreeningInput,
    ) -> Result<MedicalScreening, ValidationError> {
        if input.screening_type.trim().is_empty() {
            return Err(ValidationError::Blank("screening_type"));
        }
        self.require_participant(input.surrogate_id, Some(ParticipantRole::Surrogate))?;

        let screening = MedicalScreening {
            id: Uuid::new_v4(),
            surrogate_id: input.surrogate_id,
            screening_type: input.screening_type.trim().to_string(),
            status: ScreeningStatus::Pending,
            result_notes: input.result_notes,
            reviewed_by: None,
            reviewed_at: None,
            created_at: Utc::now(),
        };

        let conn = self.conn()?;
        conn.execute(
            &format!(
                "INSERT INTO medical_screenings ({}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                SCREENING_COLUMNS
            ),
            params![
                screening.id.to_string(),
                screening.surrogate_id.to_string(),
                screening.screening_type,
                screening.status.as_str(),
                screening.result_notes,
                Option::<String>::None,
                Option::<String>::None,
                fmt_ts(screening.created_at),
            ],
        )?;
        Ok(screening)
    }

    pub fn get_screening(&self, id: Uuid) -> Result<Option<MedicalScreening>> {
        let conn = self.conn()?;
        let screening = conn
            .query_row(
                &format!("SELECT {} FROM medical_screenings WHERE id = ?1", SCREENING_COLUMNS),
                params![id.to_string()],
                row_to_screening,
            )
            .optional()?;
        Ok(screening)
    }

    pub fn list_screenings(&self, filter: &ScreeningFilter) -> Result<Vec<MedicalScreening>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM medical_screenings
             WHERE (?1 IS NULL OR surrogate_id = ?1) AND (?2 IS NULL OR status = ?2)
             ORDER BY created_at",
            SCREENING_COLUMNS
        ))?;
        let rows = stmt.query_map(
            params![
                filter.surrogate_id.map(|id| id.to_string()),
                filter.status.map(|s| s.as_str()),
            ],
            row_to_screening,
        )?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    /// Records an admin's decision. A later review overwrites an earlier one.
    pub fn review_screening(
        &self,
        id: Uuid,
        input: ReviewScreeningInput,
        reviewer: Uuid,
    ) -> Result<Option<MedicalScreening>> {
        let Some(mut screening) = self.get_screening(id)? else {
            return Ok(None);
        };

        screening.status = input.decision.into();
        if input.result_notes.is_some() {
            screening.result_notes = input.result_notes;
        }
        screening.reviewed_by = Some(reviewer);
        screening.reviewed_at = Some(Utc::now());

        let conn = self.conn()?;
        conn.execute(
            "UPDATE medical_screenings
             SET status = ?2, result_notes = ?3, reviewed_by = ?4, reviewed_at = ?5
             WHERE id = ?1",
            params![
                id.to_string(),
                screening.status.as_str(),
                screening.result_notes,
                reviewer.to_string(),
                screening.reviewed_at.map(fmt_ts),
            ],
        )?;

        tracing::info!(id = %id, status = screening.status.as_str(), reviewer = %reviewer, "Reviewed screening");
        Ok(Some(screening))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_support::{db, participant};

    #[test]
    fn review_records_decision_and_reviewer() {
        let db = db();
        let gc = participant(&db, ParticipantRole::Surrogate, "Gc");
        let s = db
            .create_screening(CreateScreeningInput {
                surrogate_id: gc.id,
                screening_type: "Psychological".into(),
                result_notes: None,
            })
            .unwrap();
        assert_eq!(s.status, ScreeningStatus::Pending);

        let admin = Uuid::new_v4();
        let reviewed = db
            .review_screening(
                s.id,
                ReviewScreeningInput {
                    decision: ScreeningDecision::Cleared,
                    result_notes: Some("No concerns".into()),
                },
                admin,
            )
            .unwrap()
            .unwrap();
        assert_eq!(reviewed.status, ScreeningStatus::Cleared);

        let loaded = db.get_screening(s.id).unwrap().unwrap();
        assert_eq!(loaded.reviewed_by, Some(admin));
        assert!(loaded.reviewed_at.is_some());
        assert_eq!(loaded.result_notes.as_deref(), Some("No concerns"));

        let pending = db
            .list_screenings(&ScreeningFilter {
                surrogate_id: None,
                status: Some(ScreeningStatus::Pending),
            })
            .unwrap();
        assert!(pending.is_empty());
    }

    #[test]
    fn screenings_are_for_surrogates_only() {
        let db = db();
        let ip = participant(&db, ParticipantRole::IntendedParent, "Ip");
        let err = db
            .create_screening(CreateScreeningInput {
                surrogate_id: ip.id,
                screening_type: "Blood panel".into(),
                result_notes: None,
            })
            .unwrap_err();
        assert!(matches!(err, ValidationError::WrongRole { .. }));
    }

    #[test]
    fn reviewing_missing_screening_returns_none() {
        let db = db();
        let result = db
            .review_screening(
                Uuid::new_v4(),
                ReviewScreeningInput {
                    decision: ScreeningDecision::Rejected,
                    result_notes: None,
                },
                Uuid::new_v4(),
            )
            .unwrap();
        assert!(result.is_none());
    }
}
