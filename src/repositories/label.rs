use sqlx::{QueryBuilder, Sqlite, SqlitePool};

use super::RepoResult;
use crate::models::{Label, LabelUpdate};

pub const DEFAULT_LABEL_COLOR: &str = "#6366f1";

pub struct LabelRepo<'a> {
    pool: &'a SqlitePool,
}

impl<'a> LabelRepo<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, project_id: i64, name: &str, color: Option<&str>) -> RepoResult<Label> {
        sqlx::query_as::<_, Label>(
            "INSERT INTO labels (project_id, name, color) VALUES (?, ?, ?) RETURNING *",
        )
        .bind(project_id)
        .bind(name)
        .bind(color.unwrap_or(DEFAULT_LABEL_COLOR))
        .fetch_one(self.pool)
        .await
    }

    pub async fn find_by_id(&self, id: i64) -> RepoResult<Option<Label>> {
        sqlx::query_as::<_, Label>("SELECT * FROM labels WHERE id = ?")
            .bind(id)
            .fetch_optional(self.pool)
            .await
    }

    pub async fn find_by_project_id(&self, project_id: i64) -> RepoResult<Vec<Label>> {
        sqlx::query_as::<_, Label>("SELECT * FROM labels WHERE project_id = ? ORDER BY name, id")
            .bind(project_id)
            .fetch_all(self.pool)
            .await
    }

    /// Attaching the same label twice is a no-op.
    pub async fn add_to_task(&self, task_id: i64, label_id: i64) -> RepoResult<()> {
        sqlx::query("INSERT OR IGNORE INTO task_labels (task_id, label_id) VALUES (?, ?)")
            .bind(task_id)
            .bind(label_id)
            .execute(self.pool)
            .await?;
        Ok(())
    }

    pub async fn remove_from_task(&self, task_id: i64, label_id: i64) -> RepoResult<u64> {
        let result = sqlx::query("DELETE FROM task_labels WHERE task_id = ? AND label_id = ?")
            .bind(task_id)
            .bind(label_id)
            .execute(self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    pub async fn task_labels(&self, task_id: i64) -> RepoResult<Vec<Label>> {
        sqlx::query_as::<_, Label>(
            "SELECT l.* FROM labels l
             INNER JOIN task_labels tl ON l.id = tl.label_id
             WHERE tl.task_id = ?
             ORDER BY l.name, l.id",
        )
        .bind(task_id)
        .fetch_all(self.pool)
        .await
    }

    pub async fn update(&self, id: i64, changes: &LabelUpdate) -> RepoResult<Option<Label>> {
        if changes.is_empty() {
            return self.find_by_id(id).await;
        }

        let mut query = QueryBuilder::<Sqlite>::new("UPDATE labels SET ");
        let mut fields = query.separated(", ");
        if let Some(name) = &changes.name {
            fields.push("name = ").push_bind_unseparated(name.clone());
        }
        if let Some(color) = &changes.color {
            fields.push("color = ").push_bind_unseparated(color.clone());
        }
        query.push(" WHERE id = ").push_bind(id).push(" RETURNING *");

        query.build_query_as::<Label>().fetch_optional(self.pool).await
    }

    pub async fn delete(&self, id: i64) -> RepoResult<u64> {
        let result = sqlx::query("DELETE FROM labels WHERE id = ?")
            .bind(id)
            .execute(self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}
