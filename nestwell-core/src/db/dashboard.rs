use anyhow::Result;
use chrono::{DateTime, Utc};
use rusqlite::params;

use super::Database;
use crate::models::*;

impl Database {
    pub fn dashboard_stats(&self, now: DateTime<Utc>) -> Result<DashboardStats> {
        let overdue_tasks = self.list_overdue_tasks(now)?.len() as u32;
        let ledger_net_cents = self.ledger_summary(None)?.net_cents;

        let conn = self.conn()?;
        let count = |sql: &str, value: &str| -> rusqlite::Result<u32> {
            conn.query_row(sql, params![value], |row| row.get(0))
        };

        Ok(DashboardStats {
            intended_parents: count(
                "SELECT COUNT(*) FROM participants WHERE role = ?1",
                ParticipantRole::IntendedParent.as_str(),
            )?,
            surrogates: count(
                "SELECT COUNT(*) FROM participants WHERE role = ?1",
                ParticipantRole::Surrogate.as_str(),
            )?,
            active_matches: count(
                "SELECT COUNT(*) FROM matches WHERE status = ?1",
                MatchStatus::Active.as_str(),
            )?,
            case_journeys: count(
                "SELECT COUNT(*) FROM journeys WHERE track = ?1",
                JourneyTrack::Case.as_str(),
            )?,
            milestone_journeys: count(
                "SELECT COUNT(*) FROM journeys WHERE track = ?1",
                JourneyTrack::Milestone.as_str(),
            )?,
            completed_journeys: count(
                "SELECT COUNT(*) FROM journeys WHERE current_stage = ?1",
                Stage::Completed.as_str(),
            )?,
            open_tasks: conn.query_row(
                "SELECT COUNT(*) FROM tasks WHERE is_completed = 0",
                [],
                |row| row.get(0),
            )?,
            overdue_tasks,
            pending_screenings: count(
                "SELECT COUNT(*) FROM medical_screenings WHERE status = ?1",
                ScreeningStatus::Pending.as_str(),
            )?,
            ledger_net_cents,
        })
    }
}
