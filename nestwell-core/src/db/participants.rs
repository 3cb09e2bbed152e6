use anyhow::Result;
use chrono::Utc;
use rusqlite::{params, OptionalExtension, Row};
use uuid::Uuid;

use super::{enum_col, fmt_ts, json_col, ts_col, uuid_col, Database};
use crate::error::ValidationError;
use crate::models::*;

const PARTICIPANT_COLUMNS: &str = "id, role, status, email, first_name, last_name, display_name, phone, form_data, created_at, updated_at";

fn row_to_participant(row: &Row) -> rusqlite::Result<Participant> {
    Ok(Participant {
        id: uuid_col(row, "id")?,
        role: enum_col(row, "role", ParticipantRole::from_str)?,
        status: enum_col(row, "status", ParticipantStatus::from_str)?,
        email: row.get("email")?,
        first_name: row.get("first_name")?,
        last_name: row.get("last_name")?,
        display_name: row.get("display_name")?,
        phone: row.get("phone")?,
        form_data: json_col(row, "form_data")?,
        created_at: ts_col(row, "created_at")?,
        updated_at: ts_col(row, "updated_at")?,
    })
}

impl Database {
    pub fn create_participant(&self, input: CreateParticipantInput) -> Result<Participant> {
        let now = Utc::now();
        let participant = Participant {
            id: Uuid::new_v4(),
            role: input.role,
            status: input.status.unwrap_or(ParticipantStatus::Lead),
            email: input.email.trim().to_string(),
            first_name: input.first_name,
            last_name: input.last_name,
            display_name: input.display_name,
            phone: input.phone,
            form_data: input
                .form_data
                .unwrap_or_else(|| serde_json::Value::Object(Default::default())),
            created_at: now,
            updated_at: now,
        };

        let conn = self.conn()?;
        conn.execute(
            &format!(
                "INSERT INTO participants ({}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
                PARTICIPANT_COLUMNS
            ),
            params![
                participant.id.to_string(),
                participant.role.as_str(),
                participant.status.as_str(),
                participant.email,
                participant.first_name,
                participant.last_name,
                participant.display_name,
                participant.phone,
                serde_json::to_string(&participant.form_data)?,
                fmt_ts(participant.created_at),
                fmt_ts(participant.updated_at),
            ],
        )?;

        tracing::debug!(id = %participant.id, role = participant.role.as_str(), "Created participant");
        Ok(participant)
    }

    pub fn get_participant(&self, id: Uuid) -> Result<Option<Participant>> {
        let conn = self.conn()?;
        let participant = conn
            .query_row(
                &format!("SELECT {} FROM participants WHERE id = ?1", PARTICIPANT_COLUMNS),
                params![id.to_string()],
                row_to_participant,
            )
            .optional()?;
        Ok(participant)
    }

    pub fn list_participants(&self, filter: &ParticipantFilter) -> Result<Vec<Participant>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM participants
             WHERE (?1 IS NULL OR role = ?1) AND (?2 IS NULL OR status = ?2)
             ORDER BY created_at, id",
            PARTICIPANT_COLUMNS
        ))?;
        let rows = stmt.query_map(
            params![
                filter.role.map(|r| r.as_str()),
                filter.status.map(|s| s.as_str()),
            ],
            row_to_participant,
        )?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    pub fn update_participant(&self, id: Uuid, input: UpdateParticipantInput) -> Result<bool> {
        let Some(mut p) = self.get_participant(id)? else {
            return Ok(false);
        };

        if let Some(status) = input.status {
            p.status = status;
        }
        if let Some(email) = input.email {
            p.email = email.trim().to_string();
        }
        if input.first_name.is_some() {
            p.first_name = input.first_name;
        }
        if input.last_name.is_some() {
            p.last_name = input.last_name;
        }
        if input.display_name.is_some() {
            p.display_name = input.display_name;
        }
        if input.phone.is_some() {
            p.phone = input.phone;
        }
        if let Some(form_data) = input.form_data {
            p.form_data = form_data;
        }

        let conn = self.conn()?;
        let changed = conn.execute(
            "UPDATE participants
             SET status = ?2, email = ?3, first_name = ?4, last_name = ?5,
                 display_name = ?6, phone = ?7, form_data = ?8, updated_at = ?9
             WHERE id = ?1",
            params![
                id.to_string(),
                p.status.as_str(),
                p.email,
                p.first_name,
                p.last_name,
                p.display_name,
                p.phone,
                serde_json::to_string(&p.form_data)?,
                fmt_ts(Utc::now()),
            ],
        )?;
        Ok(changed > 0)
    }

    pub fn delete_participant(&self, id: Uuid) -> Result<bool> {
        let conn = self.conn()?;
        let changed = conn.execute("DELETE FROM participants WHERE id = ?1", params![id.to_string()])?;
        Ok(changed > 0)
    }

    /// Loads a participant and checks its role.
    pub(crate) fn require_participant(
        &self,
        id: Uuid,
        role: Option<ParticipantRole>,
    ) -> Result<Participant, ValidationError> {
        let participant = self
            .get_participant(id)?
            .ok_or(ValidationError::ParticipantNotFound(id))?;
        if let Some(expected) = role {
            if participant.role != expected {
                return Err(ValidationError::WrongRole {
                    id,
                    expected: expected.as_str(),
                });
            }
        }
        Ok(participant)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_support::{db, participant};
    use serde_json::json;

    #[test]
    fn create_defaults_status_and_form_data() {
        let db = db();
        let p = participant(&db, ParticipantRole::IntendedParent, "Sam");

        assert_eq!(p.status, ParticipantStatus::Lead);
        assert!(p.form_data.is_object());

        let loaded = db.get_participant(p.id).unwrap().unwrap();
        assert_eq!(loaded.email, "sam@example.com");
        assert_eq!(loaded.role, ParticipantRole::IntendedParent);
    }

    #[test]
    fn form_data_first_name_reads_back_through_summary() {
        let db = db();
        let p = db
            .create_participant(CreateParticipantInput {
                role: ParticipantRole::Surrogate,
                status: Some(ParticipantStatus::Applicant),
                email: "x@example.com".into(),
                first_name: None,
                last_name: None,
                display_name: None,
                phone: None,
                form_data: Some(json!({ "firstName": "Lucía", "lastName": "Ortega" })),
            })
            .unwrap();

        let loaded = db.get_participant(p.id).unwrap().unwrap();
        let summary = ParticipantSummary::from(&loaded);
        assert_eq!(summary.name, "Lucía Ortega");
    }

    #[test]
    fn list_filters_by_role_and_status() {
        let db = db();
        participant(&db, ParticipantRole::IntendedParent, "A");
        let gc = participant(&db, ParticipantRole::Surrogate, "B");
        db.update_participant(
            gc.id,
            UpdateParticipantInput {
                status: Some(ParticipantStatus::Active),
                ..Default::default()
            },
        )
        .unwrap();

        let surrogates = db
            .list_participants(&ParticipantFilter {
                role: Some(ParticipantRole::Surrogate),
                status: None,
            })
            .unwrap();
        assert_eq!(surrogates.len(), 1);

        let active = db
            .list_participants(&ParticipantFilter {
                role: None,
                status: Some(ParticipantStatus::Active),
            })
            .unwrap();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].id, gc.id);

        assert_eq!(db.list_participants(&ParticipantFilter::default()).unwrap().len(), 2);
    }

    #[test]
    fn update_and_delete_report_missing_rows() {
        let db = db();
        assert!(!db.update_participant(Uuid::new_v4(), Default::default()).unwrap());
        assert!(!db.delete_participant(Uuid::new_v4()).unwrap());

        let p = participant(&db, ParticipantRole::Admin, "Root");
        assert!(db.delete_participant(p.id).unwrap());
        assert!(db.get_participant(p.id).unwrap().is_none());
    }

    #[test]
    fn require_participant_checks_role() {
        let db = db();
        let ip = participant(&db, ParticipantRole::IntendedParent, "Kim");
        assert!(matches!(
            db.require_participant(ip.id, Some(ParticipantRole::Surrogate)),
            Err(ValidationError::WrongRole { .. })
        ));
        assert!(db.require_participant(ip.id, Some(ParticipantRole::IntendedParent)).is_ok());
    }
}
