use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::{Validate, ValidationError};

use super::{double_option, Label};

/// The kind of work item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum TaskType {
    Issue,
    Bugfix,
    Story,
    Subtask,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum TaskPriority {
    High,
    #[default]
    Medium,
    Low,
}

/// A row of the `tasks` table.
///
/// `status` is a free-form label. By convention it names one of the board's
/// columns, but nothing ties the two together.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Task {
    pub id: i64,
    pub board_id: i64,
    #[sqlx(rename = "type")]
    #[serde(rename = "type")]
    pub task_type: TaskType,
    pub title: String,
    pub description: Option<String>,
    pub status: String,
    pub priority: TaskPriority,
    pub assignee_id: Option<i64>,
    pub reporter_id: i64,
    /// Set for subtasks. Subtasks are ordered among their siblings only.
    pub parent_id: Option<i64>,
    /// Stored as sent: a calendar date or an RFC 3339 timestamp.
    pub deadline: Option<String>,
    pub position: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A task together with the labels attached to it.
#[derive(Debug, Serialize, Deserialize)]
pub struct TaskWithLabels {
    #[serde(flatten)]
    pub task: Task,
    pub labels: Vec<Label>,
}

/// A top-level task together with its subtasks, as listed on a board.
#[derive(Debug, Serialize, Deserialize)]
pub struct TaskWithSubtasks {
    #[serde(flatten)]
    pub task: Task,
    pub subtasks: Vec<Task>,
}

fn default_status() -> String {
    "todo".to_string()
}

/// Everything a client may set when creating a task or a subtask.
#[derive(Debug, Deserialize, Validate)]
pub struct TaskDetails {
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    #[validate(length(max = 5000))]
    pub description: Option<String>,
    #[serde(default = "default_status")]
    #[validate(length(min = 1, max = 50))]
    pub status: String,
    #[serde(default)]
    pub priority: TaskPriority,
    pub assignee_id: Option<i64>,
    #[validate(custom = "validate_deadline")]
    pub deadline: Option<String>,
}

/// Accepts `YYYY-MM-DD` or a full RFC 3339 timestamp.
fn validate_deadline(deadline: &str) -> Result<(), ValidationError> {
    let is_date = NaiveDate::parse_from_str(deadline, "%Y-%m-%d").is_ok();
    if is_date || DateTime::parse_from_rfc3339(deadline).is_ok() {
        Ok(())
    } else {
        Err(ValidationError::new("deadline"))
    }
}

/// Payload of `POST /boards/{id}/tasks`.
#[derive(Debug, Deserialize, Validate)]
pub struct TaskInput {
    #[serde(rename = "type")]
    pub task_type: TaskType,
    #[serde(flatten)]
    #[validate]
    pub details: TaskDetails,
}

/// Payload of `PATCH /tasks/{id}`. Absent fields are left untouched;
/// `assignee_id` and `deadline` may be cleared with an explicit `null`.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct TaskUpdate {
    #[validate(length(min = 1, max = 200))]
    pub title: Option<String>,
    #[validate(length(max = 5000))]
    pub description: Option<String>,
    #[validate(length(min = 1, max = 50))]
    pub status: Option<String>,
    pub priority: Option<TaskPriority>,
    #[serde(default, deserialize_with = "double_option")]
    pub assignee_id: Option<Option<i64>>,
    #[serde(default, deserialize_with = "double_option")]
    #[validate(custom = "validate_deadline")]
    pub deadline: Option<Option<String>>,
    pub position: Option<i64>,
}

impl TaskUpdate {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.status.is_none()
            && self.priority.is_none()
            && self.assignee_id.is_none()
            && self.deadline.is_none()
            && self.position.is_none()
    }
}

/// What the task repository needs to insert a row.
#[derive(Debug, Clone)]
pub struct NewTask {
    pub board_id: i64,
    pub task_type: TaskType,
    pub title: String,
    pub description: Option<String>,
    pub status: String,
    pub priority: TaskPriority,
    pub assignee_id: Option<i64>,
    pub reporter_id: i64,
    pub parent_id: Option<i64>,
    pub deadline: Option<String>,
}

impl NewTask {
    /// A top-level task on `board_id` reported by `reporter_id`.
    pub fn new(board_id: i64, task_type: TaskType, details: TaskDetails, reporter_id: i64) -> Self {
        Self {
            board_id,
            task_type,
            title: details.title,
            description: details.description,
            status: details.status,
            priority: details.priority,
            assignee_id: details.assignee_id,
            reporter_id,
            parent_id: None,
            deadline: details.deadline,
        }
    }

    /// A subtask of `parent`, placed on the parent's board.
    pub fn subtask(parent: &Task, details: TaskDetails, reporter_id: i64) -> Self {
        Self {
            parent_id: Some(parent.id),
            ..Self::new(parent.board_id, TaskType::Subtask, details, reporter_id)
        }
    }
}
