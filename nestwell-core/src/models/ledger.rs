use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A single financial ledger line. `amount_cents` is always positive;
/// `kind` carries the direction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerEntry {
    pub id: Uuid,
    pub journey_id: Option<Uuid>,
    pub kind: LedgerKind,
    pub category: String,
    pub amount_cents: i64,
    pub description: Option<String>,
    pub occurred_on: NaiveDate,
    pub recorded_by: Uuid,
    pub created_at: DateTime<Utc>,
}

impl LedgerEntry {
    pub fn signed_cents(&self) -> i64 {
        match self.kind {
            LedgerKind::Revenue => self.amount_cents,
            LedgerKind::Expense => -self.amount_cents,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum LedgerKind {
    Revenue,
    Expense,
}

impl LedgerKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Revenue => "revenue",
            Self::Expense => "expense",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "revenue" => Some(Self::Revenue),
            "expense" => Some(Self::Expense),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateLedgerEntryInput {
    pub journey_id: Option<Uuid>,
    pub kind: LedgerKind,
    pub category: String,
    pub amount_cents: i64,
    pub description: Option<String>,
    pub occurred_on: NaiveDate,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LedgerFilter {
    pub journey_id: Option<Uuid>,
    pub kind: Option<LedgerKind>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerSummary {
    pub revenue_cents: i64,
    pub expense_cents: i64,
    pub net_cents: i64,
    pub entry_count: u32,
}
