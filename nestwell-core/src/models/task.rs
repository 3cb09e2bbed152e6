use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    pub id: Uuid,
    pub assignee_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub due_date: Option<NaiveDate>,
    pub is_completed: bool,
    pub completed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Task {
    /// A task is overdue when it is still open and its due date is before `now`'s date.
    /// Completed tasks are never overdue.
    pub fn is_overdue(&self, now: DateTime<Utc>) -> bool {
        if self.is_completed {
            return false;
        }
        match self.due_date {
            Some(due) => due < now.date_naive(),
            None => false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTaskInput {
    pub assignee_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub due_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateTaskInput {
    pub title: Option<String>,
    pub description: Option<String>,
    pub due_date: Option<NaiveDate>,
    pub is_completed: Option<bool>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TaskFilter {
    pub assignee_id: Option<Uuid>,
    pub is_completed: Option<bool>,
}

/// An overdue task with its assignee's resolved display name.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OverdueTask {
    #[serde(flatten)]
    pub task: Task,
    /// `None` when the assignee no longer exists.
    pub assignee_name: Option<String>,
}
