use anyhow::Result;
use chrono::{DateTime, Utc};
use rusqlite::{params, OptionalExtension, Row};
use uuid::Uuid;

use super::{fmt_date, fmt_ts, opt_date_col, opt_ts_col, ts_col, uuid_col, Database};
use crate::error::ValidationError;
use crate::models::*;
use crate::names::resolve_display_name;

const TASK_COLUMNS: &str =
    "id, assignee_id, title, description, due_date, is_completed, completed_at, created_at, updated_at";

fn row_to_task(row: &Row) -> rusqlite::Result<Task> {
    Ok(Task {
        id: uuid_col(row, "id")?,
        assignee_id: uuid_col(row, "assignee_id")?,
        title: row.get("title")?,
        description: row.get("description")?,
        due_date: opt_date_col(row, "due_date")?,
        is_completed: row.get("is_completed")?,
        completed_at: opt_ts_col(row, "completed_at")?,
        created_at: ts_col(row, "created_at")?,
        updated_at: ts_col(row, "updated_at")?,
    })
}

impl Database {
    pub fn create_task(&self, input: CreateTaskInput) -> Result<Task, ValidationError> {
        let title = input.title.trim();
        if title.is_empty() {
            return Err(ValidationError::Blank("title"));
        }
        self.require_participant(input.assignee_id, None)?;

        let now = Utc::now();
        let task = Task {
            id: Uuid::new_v4(),
            assignee_id: input.assignee_id,
            title: title.to_string(),
            description: input.description,
            due_date: input.due_date,
            is_completed: false,
            completed_at: None,
            created_at: now,
            updated_at: now,
        };

        let conn = self.conn()?;
        conn.execute(
            &format!(
                "INSERT INTO tasks ({}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
                TASK_COLUMNS
            ),
            params![
                task.id.to_string(),
                task.assignee_id.to_string(),
                task.title,
                task.description,
                task.due_date.map(fmt_date),
                task.is_completed,
                task.completed_at.map(fmt_ts),
                fmt_ts(task.created_at),
                fmt_ts(task.updated_at),
            ],
        )?;
        Ok(task)
    }

    pub fn get_task(&self, id: Uuid) -> Result<Option<Task>> {
        let conn = self.conn()?;
        let task = conn
            .query_row(
                &format!("SELECT {} FROM tasks WHERE id = ?1", TASK_COLUMNS),
                params![id.to_string()],
                row_to_task,
            )
            .optional()?;
        Ok(task)
    }

    pub fn list_tasks(&self, filter: &TaskFilter) -> Result<Vec<Task>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM tasks
             WHERE (?1 IS NULL OR assignee_id = ?1) AND (?2 IS NULL OR is_completed = ?2)
             ORDER BY due_date IS NULL, due_date, created_at",
            TASK_COLUMNS
        ))?;
        let rows = stmt.query_map(
            params![filter.assignee_id.map(|id| id.to_string()), filter.is_completed],
            row_to_task,
        )?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    /// Open tasks whose due date is before `now`'s date.
    pub fn list_overdue_tasks(&self, now: DateTime<Utc>) -> Result<Vec<Task>> {
        let open = self.list_tasks(&TaskFilter {
            assignee_id: None,
            is_completed: Some(false),
        })?;
        Ok(open.into_iter().filter(|t| t.is_overdue(now)).collect())
    }

    /// Overdue tasks paired with who they are assigned to.
    pub fn list_overdue_with_assignees(&self, now: DateTime<Utc>) -> Result<Vec<OverdueTask>> {
        self.list_overdue_tasks(now)?
            .into_iter()
            .map(|task| -> Result<OverdueTask> {
                let assignee_name = self
                    .get_participant(task.assignee_id)?
                    .map(|p| resolve_display_name(&p));
                Ok(OverdueTask { task, assignee_name })
            })
            .collect()
    }

    pub fn update_task(
        &self,
        id: Uuid,
        input: UpdateTaskInput,
    ) -> Result<Option<Task>, ValidationError> {
        let title = match input.title.as_deref().map(str::trim) {
            Some("") => return Err(ValidationError::Blank("title")),
            other => other.map(str::to_string),
        };
        let Some(mut task) = self.get_task(id)? else {
            return Ok(None);
        };
        let now = Utc::now();

        if let Some(title) = title {
            task.title = title;
        }
        if input.description.is_some() {
            task.description = input.description;
        }
        if input.due_date.is_some() {
            task.due_date = input.due_date;
        }
        if let Some(done) = input.is_completed {
            if done && !task.is_completed {
                task.completed_at = Some(now);
            } else if !done {
                task.completed_at = None;
            }
            task.is_completed = done;
        }
        task.updated_at = now;

        let conn = self.conn()?;
        conn.execute(
            "UPDATE tasks
             SET title = ?2, description = ?3, due_date = ?4, is_completed = ?5,
                 completed_at = ?6, updated_at = ?7
             WHERE id = ?1",
            params![
                id.to_string(),
                task.title,
                task.description,
                task.due_date.map(fmt_date),
                task.is_completed,
                task.completed_at.map(fmt_ts),
                fmt_ts(task.updated_at),
            ],
        )?;
        Ok(Some(task))
    }

    pub fn delete_task(&self, id: Uuid) -> Result<bool> {
        let conn = self.conn()?;
        let changed = conn.execute("DELETE FROM tasks WHERE id = ?1", params![id.to_string()])?;
        Ok(changed > 0)
    }
}
