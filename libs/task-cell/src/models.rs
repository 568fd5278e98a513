use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use shared_models::error::{AppError, FieldErrors};
use shared_models::patch::{nullable, Nullable};
use shared_models::task::{TaskPriority, TaskStatus};
use shared_models::validation::{check_date, require_text};

pub const DEFAULT_CATEGORY: &str = "general";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTaskRequest {
    pub member_id: Option<Uuid>,
    pub title: String,
    pub description: Option<String>,
    pub due_date: String,
    pub priority: Option<TaskPriority>,
    pub category: Option<String>,
}

impl CreateTaskRequest {
    pub fn validate(&self) -> Result<NaiveDate, AppError> {
        let mut errors = FieldErrors::new();
        require_text(&mut errors, "title", &self.title, 200);
        let due_date = check_date(&mut errors, "due_date", &self.due_date);
        if let Some(category) = &self.category {
            require_text(&mut errors, "category", category, 50);
        }
        errors.into_result()?;
        due_date.ok_or_else(|| AppError::BadRequest("due_date is required".to_string()))
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateTaskRequest {
    pub title: Option<String>,
    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "Option::is_none")]
    pub description: Nullable<String>,
    pub due_date: Option<String>,
    pub priority: Option<TaskPriority>,
    pub status: Option<TaskStatus>,
    pub category: Option<String>,
}

impl UpdateTaskRequest {
    pub fn validate(&self) -> Result<Option<NaiveDate>, AppError> {
        let mut errors = FieldErrors::new();
        if let Some(title) = &self.title {
            require_text(&mut errors, "title", title, 200);
        }
        if let Some(category) = &self.category {
            require_text(&mut errors, "category", category, 50);
        }
        let due_date = self
            .due_date
            .as_deref()
            .and_then(|raw| check_date(&mut errors, "due_date", raw));
        errors.into_result()?;
        Ok(due_date)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TaskListQuery {
    pub status: Option<TaskStatus>,
    pub member_id: Option<Uuid>,
}

/// How `completed_at` changes when a task moves from `previous` to `next`.
///
/// `None` leaves it alone, `Some(None)` clears it, `Some(Some(t))` stamps it.
pub fn completion_change(
    previous: TaskStatus,
    next: TaskStatus,
    now: DateTime<Utc>,
) -> Option<Option<DateTime<Utc>>> {
    match (previous, next) {
        (TaskStatus::Completed, TaskStatus::Completed) => None,
        (_, TaskStatus::Completed) => Some(Some(now)),
        (TaskStatus::Completed, _) => Some(None),
        _ => None,
    }
}
