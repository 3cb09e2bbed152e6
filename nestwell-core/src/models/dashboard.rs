use serde::{Deserialize, Serialize};

/// Headline counts for the admin dashboard.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardStats {
    pub intended_parents: u32,
    pub surrogates: u32,
    pub active_matches: u32,
    pub case_journeys: u32,
    pub milestone_journeys: u32,
    pub completed_journeys: u32,
    pub open_tasks: u32,
    pub overdue_tasks: u32,
    pub pending_screenings: u32,
    pub ledger_net_cents: i64,
}
