use chrono::Utc;
use sqlx::{QueryBuilder, Sqlite, SqlitePool};

use super::label::LabelRepo;
use super::RepoResult;
use crate::models::{NewTask, Task, TaskUpdate, TaskWithLabels};

const INSERT_TOP_LEVEL: &str = "INSERT INTO tasks (board_id, type, title, description, status, priority, assignee_id, reporter_id, parent_id, deadline, position, created_at, updated_at)
     SELECT ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, COALESCE(MAX(position), -1) + 1, ?, ?
     FROM tasks WHERE board_id = ? AND parent_id IS NULL
     RETURNING *";

const INSERT_SUBTASK: &str = "INSERT INTO tasks (board_id, type, title, description, status, priority, assignee_id, reporter_id, parent_id, deadline, position, created_at, updated_at)
     SELECT ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, COALESCE(MAX(position), -1) + 1, ?, ?
     FROM tasks WHERE parent_id = ?
     RETURNING *";

pub struct TaskRepo<'a> {
    pool: &'a SqlitePool,
}

impl<'a> TaskRepo<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Inserts a task at the end of its sequence.
    ///
    /// Top-level tasks are sequenced per board, subtasks per parent. The next
    /// position is computed inside the INSERT statement.
    pub async fn create(&self, task: &NewTask) -> RepoResult<Task> {
        let (sql, scope) = match task.parent_id {
            Some(parent_id) => (INSERT_SUBTASK, parent_id),
            None => (INSERT_TOP_LEVEL, task.board_id),
        };
        let now = Utc::now();

        sqlx::query_as::<_, Task>(sql)
            .bind(task.board_id)
            .bind(task.task_type)
            .bind(&task.title)
            .bind(&task.description)
            .bind(&task.status)
            .bind(task.priority)
            .bind(task.assignee_id)
            .bind(task.reporter_id)
            .bind(task.parent_id)
            .bind(&task.deadline)
            .bind(now)
            .bind(now)
            .bind(scope)
            .fetch_one(self.pool)
            .await
    }

    pub async fn find_by_id(&self, id: i64) -> RepoResult<Option<Task>> {
        sqlx::query_as::<_, Task>("SELECT * FROM tasks WHERE id = ?")
            .bind(id)
            .fetch_optional(self.pool)
            .await
    }

    /// The task plus its labels.
    pub async fn find_with_labels(&self, id: i64) -> RepoResult<Option<TaskWithLabels>> {
        let Some(task) = self.find_by_id(id).await? else {
            return Ok(None);
        };
        let labels = LabelRepo::new(self.pool).task_labels(id).await?;
        Ok(Some(TaskWithLabels { task, labels }))
    }

    /// Top-level tasks of a board in position order. Subtasks are excluded.
    pub async fn find_by_board_id(&self, board_id: i64) -> RepoResult<Vec<Task>> {
        sqlx::query_as::<_, Task>(
            "SELECT * FROM tasks WHERE board_id = ? AND parent_id IS NULL ORDER BY position, id",
        )
        .bind(board_id)
        .fetch_all(self.pool)
        .await
    }

    pub async fn subtasks(&self, parent_id: i64) -> RepoResult<Vec<Task>> {
        sqlx::query_as::<_, Task>("SELECT * FROM tasks WHERE parent_id = ? ORDER BY position, id")
            .bind(parent_id)
            .fetch_all(self.pool)
            .await
    }

    /// Applies the fields present in `changes` and bumps `updated_at`.
    /// An empty change-set just re-reads the task.
    pub async fn update(&self, id: i64, changes: &TaskUpdate) -> RepoResult<Option<Task>> {
        if changes.is_empty() {
            return self.find_by_id(id).await;
        }

        let mut query = QueryBuilder::<Sqlite>::new("UPDATE tasks SET ");
        let mut fields = query.separated(", ");
        if let Some(title) = &changes.title {
            fields.push("title = ").push_bind_unseparated(title.clone());
        }
        if let Some(description) = &changes.description {
            fields
                .push("description = ")
                .push_bind_unseparated(description.clone());
        }
        if let Some(status) = &changes.status {
            fields.push("status = ").push_bind_unseparated(status.clone());
        }
        if let Some(priority) = changes.priority {
            fields.push("priority = ").push_bind_unseparated(priority);
        }
        if let Some(assignee_id) = changes.assignee_id {
            fields.push("assignee_id = ").push_bind_unseparated(assignee_id);
        }
        if let Some(deadline) = &changes.deadline {
            fields.push("deadline = ").push_bind_unseparated(deadline.clone());
        }
        if let Some(position) = changes.position {
            fields.push("position = ").push_bind_unseparated(position);
        }
        fields.push("updated_at = ").push_bind_unseparated(Utc::now());
        query.push(" WHERE id = ").push_bind(id).push(" RETURNING *");

        query.build_query_as::<Task>().fetch_optional(self.pool).await
    }

    /// Subtasks, label links and comments go with the task (`ON DELETE CASCADE`).
    pub async fn delete(&self, id: i64) -> RepoResult<u64> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = ?")
            .bind(id)
            .execute(self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}
