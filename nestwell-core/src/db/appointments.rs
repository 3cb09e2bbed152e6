use anyhow::Result;
use chrono::Utc;
use rusqlite::{params, OptionalExtension, Row};
use uuid::Uuid;

use super::{enum_col, fmt_ts, opt_uuid_col, ts_col, uuid_col, Database};
use crate::error::ValidationError;
use crate::models::*;

const APPOINTMENT_COLUMNS: &str =
    "id, participant_id, journey_id, title, scheduled_at, location, status, notes, created_at";

fn row_to_appointment(row: &Row) -> rusqlite::Result<Appointment> {
    Ok(Appointment {
        id: uuid_col(row, "id")?,
        participant_id: uuid_col(row, "participant_id")?,
        journey_id: opt_uuid_col(row, "journey_id")?,
        title: row.get("title")?,
        scheduled_at: ts_col(row, "scheduled_at")?,
        location: row.get("location")?,
        status: enum_col(row, "status", AppointmentStatus::from_str)?,
        notes: row.get("notes")?,
        created_at: ts_col(row, "created_at")?,
    })
}

impl Database {
    pub fn create_appointment(
        &self,
        input: CreateAppointmentInput,
    ) -> Result<Appointment, ValidationError> {
        if input.title.trim().is_empty() {
            return Err(ValidationError::Blank("title"));
        }
        self.require_participant(input.participant_id, None)?;

        let appointment = Appointment {
            id: Uuid::new_v4(),
            participant_id: input.participant_id,
            journey_id: input.journey_id,
            title: input.title.trim().to_string(),
            scheduled_at: input.scheduled_at,
            location: input.location,
            status: AppointmentStatus::Pending,
            notes: input.notes,
            created_at: Utc::now(),
        };

        let conn = self.conn()?;
        conn.execute(
            &format!(
                "INSERT INTO appointments ({}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
                APPOINTMENT_COLUMNS
            ),
            params![
                appointment.id.to_string(),
                appointment.participant_id.to_string(),
                appointment.journey_id.map(|id| id.to_string()),
                appointment.title,
                fmt_ts(appointment.scheduled_at),
                appointment.location,
                appointment.status.as_str(),
                appointment.notes,
                fmt_ts(appointment.created_at),
            ],
        )?;
        Ok(appointment)
    }

    pub fn get_appointment(&self, id: Uuid) -> Result<Option<Appointment>> {
        let conn = self.conn()?;
        let appointment = conn
            .query_row(
                &format!("SELECT {} FROM appointments WHERE id = ?1", APPOINTMENT_COLUMNS),
                params![id.to_string()],
                row_to_appointment,
            )
            .optional()?;
        Ok(appointment)
    }

    pub fn list_appointments(&self, filter: &AppointmentFilter) -> Result<Vec<Appointment>> {
        let not_before = filter.upcoming.then(|| fmt_ts(Utc::now()));
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM appointments
             WHERE (?1 IS NULL OR participant_id = ?1)
               AND (?2 IS NULL OR status = ?2)
               AND (?3 IS NULL OR scheduled_at >= ?3)
             ORDER BY scheduled_at",
            APPOINTMENT_COLUMNS
        ))?;
        let rows = stmt.query_map(
            params![
                filter.participant_id.map(|id| id.to_string()),
                filter.status.map(|s| s.as_str()),
                not_before,
            ],
            row_to_appointment,
        )?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    pub fn update_appointment(
        &self,
        id: Uuid,
        input: UpdateAppointmentInput,
    ) -> Result<Option<Appointment>> {
        let Some(mut appointment) = self.get_appointment(id)? else {
            return Ok(None);
        };

        if let Some(title) = input.title {
            appointment.title = title;
        }
        if let Some(at) = input.scheduled_at {
            appointment.scheduled_at = at;
        }
        if input.location.is_some() {
            appointment.location = input.location;
        }
        if let Some(status) = input.status {
            appointment.status = status;
        }
        if input.notes.is_some() {
            appointment.notes = input.notes;
        }

        let conn = self.conn()?;
        conn.execute(
            "UPDATE appointments
             SET title = ?2, scheduled_at = ?3, location = ?4, status = ?5, notes = ?6
             WHERE id = ?1",
            params![
                id.to_string(),
                appointment.title,
                fmt_ts(appointment.scheduled_at),
                appointment.location,
                appointment.status.as_str(),
                appointment.notes,
            ],
        )?;
        Ok(Some(appointment))
    }

    pub fn delete_appointment(&self, id: Uuid) -> Result<bool> {
        let conn = self.conn()?;
        let changed = conn.execute("DELETE FROM appointments WHERE id = ?1", params![id.to_string()])?;
        Ok(changed > 0)
    }
}
