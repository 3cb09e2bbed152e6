use anyhow::{anyhow, Result};
use chrono::Utc;
use rusqlite::{params, Row};
use uuid::Uuid;

use super::{date_col, enum_col, fmt_date, fmt_ts, opt_uuid_col, ts_col, uuid_col, Database};
use crate::error::ValidationError;
use crate::models::*;

/// Largest single entry accepted (one trillion dollars). Keeps any realistic
/// number of entries summable in `i64` cents.
pub const MAX_AMOUNT_CENTS: i64 = 100_000_000_000_000;

const LEDGER_COLUMNS: &str =
    "id, journey_id, kind, category, amount_cents, description, occurred_on, recorded_by, created_at";

fn row_to_entry(row: &Row) -> rusqlite::Result<LedgerEntry> {
    Ok(LedgerEntry {
        id: uuid_col(row, "id")?,
        journey_id: opt_uuid_col(row, "journey_id")?,
        kind: enum_col(row, "kind", LedgerKind::from_str)?,
        category: row.get("category")?,
        amount_cents: row.get("amount_cents")?,
        description: row.get("description")?,
        occurred_on: date_col(row, "occurred_on")?,
        recorded_by: uuid_col(row, "recorded_by")?,
        created_at: ts_col(row, "created_at")?,
    })
}

impl Database {
    pub fn create_ledger_entry(
        &self,
        input: CreateLedgerEntryInput,
        recorded_by: Uuid,
    ) -> Result<LedgerEntry, ValidationError> {
        if input.amount_cents <= 0 {
            return Err(ValidationError::NonPositiveAmount(input.amount_cents));
        }
        if input.amount_cents > MAX_AMOUNT_CENTS {
            return Err(ValidationError::AmountTooLarge {
                cents: input.amount_cents,
                max: MAX_AMOUNT_CENTS,
            });
        }
        if input.category.trim().is_empty() {
            return Err(ValidationError::Blank("category"));
        }

        let entry = LedgerEntry {
            id: Uuid::new_v4(),
            journey_id: input.journey_id,
            kind: input.kind,
            category: input.category.trim().to_string(),
            amount_cents: input.amount_cents,
            description: input.description,
            occurred_on: input.occurred_on,
            recorded_by,
            created_at: Utc::now(),
        };

        let conn = self.conn()?;
        conn.execute(
            &format!(
                "INSERT INTO ledger_entries ({}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
                LEDGER_COLUMNS
            ),
            params![
                entry.id.to_string(),
                entry.journey_id.map(|id| id.to_string()),
                entry.kind.as_str(),
                entry.category,
                entry.amount_cents,
                entry.description,
                fmt_date(entry.occurred_on),
                entry.recorded_by.to_string(),
                fmt_ts(entry.created_at),
            ],
        )?;

        tracing::info!(
            id = %entry.id,
            kind = entry.kind.as_str(),
            amount_cents = entry.amount_cents,
            "Recorded ledger entry"
        );
        Ok(entry)
    }

    pub fn list_ledger_entries(&self, filter: &LedgerFilter) -> Result<Vec<LedgerEntry>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM ledger_entries
             WHERE (?1 IS NULL OR journey_id = ?1) AND (?2 IS NULL OR kind = ?2)
             ORDER BY occurred_on, created_at",
            LEDGER_COLUMNS
        ))?;
        let rows = stmt.query_map(
            params![
                filter.journey_id.map(|id| id.to_string()),
                filter.kind.map(|k| k.as_str()),
            ],
            row_to_entry,
        )?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    pub fn ledger_summary(&self, journey_id: Option<Uuid>) -> Result<LedgerSummary> {
        let entries = self.list_ledger_entries(&LedgerFilter {
            journey_id,
            kind: None,
        })?;

        let mut summary = LedgerSummary::default();
        for entry in &entries {
            match entry.kind {
                LedgerKind::Revenue => {
                    summary.revenue_cents = add_cents(summary.revenue_cents, entry.amount_cents)?
                }
                LedgerKind::Expense => {
                    summary.expense_cents = add_cents(summary.expense_cents, entry.amount_cents)?
                }
            }
            summary.net_cents = add_cents(summary.net_cents, entry.signed_cents())?;
            summary.entry_count += 1;
        }
        Ok(summary)
    }

    pub fn delete_ledger_entry(&self, id: Uuid) -> Result<bool> {
        let conn = self.conn()?;
        let changed = conn.execute("DELETE FROM ledger_entries WHERE id = ?1", params![id.to_string()])?;
        Ok(changed > 0)
    }
}

fn add_cents(total: i64, cents: i64) -> Result<i64> {
    total
        .checked_add(cents)
        .ok_or_else(|| anyhow!("ledger total overflows at {} + {} cents", total, cents))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_support::db;
    use chrono::NaiveDate;

    fn entry(kind: LedgerKind, cents: i64) -> CreateLedgerEntryInput {
        CreateLedgerEntryInput {
            journey_id: None,
            kind,
            category: "agency_fee".into(),
            amount_cents: cents,
            description: None,
            occurred_on: NaiveDate::from_ymd_opt(2026, 2, 1).unwrap(),
        }
    }

    #[test]
    fn summary_nets_revenue_against_expense() {
        let db = db();
        let admin = Uuid::new_v4();
        db.create_ledger_entry(entry(LedgerKind::Revenue, 500_000), admin).unwrap();
        db.create_ledger_entry(entry(LedgerKind::Expense, 120_000), admin).unwrap();
        db.create_ledger_entry(entry(LedgerKind::Expense, 30_000), admin).unwrap();

        let summary = db.ledger_summary(None).unwrap();
        assert_eq!(
            summary,
            LedgerSummary {
                revenue_cents: 500_000,
                expense_cents: 150_000,
                net_cents: 350_000,
                entry_count: 3,
            }
        );
    }

    #[test]
    fn non_positive_amounts_are_rejected() {
        let db = db();
        for cents in [0, -100] {
            let err = db
                .create_ledger_entry(entry(LedgerKind::Expense, cents), Uuid::new_v4())
                .unwrap_err();
            assert!(matches!(err, ValidationError::NonPositiveAmount(c) if c == cents));
        }
    }

    #[test]
    fn oversized_amounts_are_rejected() {
        let db = db();
        let err = db
            .create_ledger_entry(entry(LedgerKind::Revenue, i64::MAX), Uuid::new_v4())
            .unwrap_err();
        assert!(matches!(err, ValidationError::AmountTooLarge { cents, .. } if cents == i64::MAX));

        db.create_ledger_entry(entry(LedgerKind::Revenue, MAX_AMOUNT_CENTS), Uuid::new_v4())
            .unwrap();
    }

    #[test]
    fn summary_reports_overflow_instead_of_wrapping() {
        let db = db();
        let admin = Uuid::new_v4();
        let stored = db.create_ledger_entry(entry(LedgerKind::Revenue, 1), admin).unwrap();
        db.create_ledger_entry(entry(LedgerKind::Revenue, 1), admin).unwrap();
        // Rows written before the cap existed can still hold huge amounts.
        db.conn()
            .unwrap()
            .execute(
                "UPDATE ledger_entries SET amount_cents = ?1",
                params![i64::MAX],
            )
            .unwrap();

        assert!(db.ledger_summary(None).is_err());
        assert!(db.dashboard_stats(Utc::now()).is_err());

        assert!(db.delete_ledger_entry(stored.id).unwrap());
        let summary = db.ledger_summary(None).unwrap();
        assert_eq!(summary.revenue_cents, i64::MAX);
        assert_eq!(summary.net_cents, i64::MAX);
    }

    #[test]
    fn recorded_by_is_the_caller() {
        let db = db();
        let admin = Uuid::new_v4();
        let e = db.create_ledger_entry(entry(LedgerKind::Revenue, 1), admin).unwrap();
        let listed = db
            .list_ledger_entries(&LedgerFilter {
                journey_id: None,
                kind: Some(LedgerKind::Revenue),
            })
            .unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].recorded_by, admin);
        assert!(db.delete_ledger_entry(e.id).unwrap());
        assert_eq!(db.ledger_summary(None).unwrap(), LedgerSummary::default());
    }
}
