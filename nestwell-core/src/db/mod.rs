//! SQLite-backed repository.
//!
//! [`Database`] is the only storage abstraction. Each entity gets its own
//! `impl Database` block in a sibling module; they all share the connection
//! and the column helpers defined here.

mod appointments;
mod dashboard;
mod journeys;
mod ledger;
mod matches;
mod messaging;
mod participants;
mod schema;
mod screenings;
mod tasks;

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use rusqlite::{types::Type, Connection, Row};
use serde::de::DeserializeOwned;
use uuid::Uuid;

pub use schema::SCHEMA;

const DB_FILE_NAME: &str = "nestwell.db";

#[derive(Clone)]
pub struct Database {
    conn: Arc<Mutex<Connection>>,
}

impl Database {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("creating {}", parent.display()))?;
            }
        }
        let conn = Connection::open(path)
            .with_context(|| format!("opening database at {}", path.display()))?;
        tracing::debug!("Opened database at {}", path.display());
        Self::from_connection(conn)
    }

    /// Opens the database in the platform data directory.
    pub fn open_default() -> Result<Self> {
        Self::open(Self::default_path()?)
    }

    pub fn open_in_memory() -> Result<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    pub fn default_path() -> Result<PathBuf> {
        let dirs = directories::ProjectDirs::from("org", "nestwell", "nestwell")
            .ok_or_else(|| anyhow!("could not determine a data directory"))?;
        Ok(dirs.data_dir().join(DB_FILE_NAME))
    }

    fn from_connection(conn: Connection) -> Result<Self> {
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Applies the schema. Safe to run on every start.
    pub fn migrate(&self) -> Result<()> {
        let conn = self.conn()?;
        conn.execute_batch(SCHEMA)?;
        tracing::info!("Database schema is up to date");
        Ok(())
    }

    pub(crate) fn conn(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| anyhow!("database connection mutex poisoned"))
    }
}

// --- column helpers ---

pub(crate) fn fmt_ts(ts: DateTime<Utc>) -> String {
    // Fixed precision keeps the TEXT columns lexically ordered.
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub(crate) fn fmt_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

fn conversion_error<E>(e: E) -> rusqlite::Error
where
    E: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    rusqlite::Error::FromSqlConversionFailure(0, Type::Text, e.into())
}

pub(crate) fn uuid_col(row: &Row, col: &str) -> rusqlite::Result<Uuid> {
    let s: String = row.get(col)?;
    Uuid::parse_str(&s).map_err(conversion_error)
}

pub(crate) fn opt_uuid_col(row: &Row, col: &str) -> rusqlite::Result<Option<Uuid>> {
    let s: Option<String> = row.get(col)?;
    s.map(|s| Uuid::parse_str(&s).map_err(conversion_error))
        .transpose()
}

pub(crate) fn ts_col(row: &Row, col: &str) -> rusqlite::Result<DateTime<Utc>> {
    let s: String = row.get(col)?;
    parse_ts(&s)
}

pub(crate) fn opt_ts_col(row: &Row, col: &str) -> rusqlite::Result<Option<DateTime<Utc>>> {
    let s: Option<String> = row.get(col)?;
    s.as_deref().map(parse_ts).transpose()
}

fn parse_ts(s: &str) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(conversion_error)
}

pub(crate) fn date_col(row: &Row, col: &str) -> rusqlite::Result<NaiveDate> {
    let s: String = row.get(col)?;
    NaiveDate::parse_from_str(&s, "%Y-%m-%d").map_err(conversion_error)
}

pub(crate) fn opt_date_col(row: &Row, col: &str) -> rusqlite::Result<Option<NaiveDate>> {
    let s: Option<String> = row.get(col)?;
    s.map(|s| NaiveDate::parse_from_str(&s, "%Y-%m-%d").map_err(conversion_error))
        .transpose()
}

pub(crate) fn enum_col<T>(
    row: &Row,
    col: &str,
    parse: fn(&str) -> Option<T>,
) -> rusqlite::Result<T> {
    let s: String = row.get(col)?;
    parse(&s).ok_or_else(|| conversion_error(format!("unknown {} value '{}'", col, s)))
}

pub(crate) fn json_col<T: DeserializeOwned>(row: &Row, col: &str) -> rusqlite::Result<T> {
    let s: String = row.get(col)?;
    serde_json::from_str(&s).map_err(conversion_error)
}


#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn migrate_is_idempotent() {
        let db = Database::open_in_memory().unwrap();
        db.migrate().unwrap();
        db.migrate().unwrap();
    }

    #[test]
    fn open_creates_parent_directories() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("nestwell.db");

        let db = Database::open(&path).unwrap();
        db.migrate().unwrap();

        assert!(path.exists());
    }

    #[test]
    fn data_survives_reopen() {
        use crate::models::ParticipantRole;

        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nestwell.db");

        let id = {
            let db = Database::open(&path).unwrap();
            db.migrate().unwrap();
            test_support::participant(&db, ParticipantRole::Surrogate, "Mia").id
        };

        let db = Database::open(&path).unwrap();
        db.migrate().unwrap();
        assert!(db.get_participant(id).unwrap().is_some());
    }

    #[test]
    fn timestamps_are_fixed_width() {
        let a = fmt_ts(DateTime::parse_from_rfc3339("2026-01-01T00:00:00Z").unwrap().with_timezone(&Utc));
        let b = fmt_ts(DateTime::parse_from_rfc3339("2026-01-01T00:00:00.5Z").unwrap().with_timezone(&Utc));
        assert_eq!(a.len(), b.len());
        assert!(a < b);
    }
}
