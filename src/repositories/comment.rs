use chrono::Utc;
use sqlx::SqlitePool;

use super::RepoResult;
use crate::models::Comment;

pub struct CommentRepo<'a> {
    pool: &'a SqlitePool,
}

impl<'a> CommentRepo<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, task_id: i64, author_id: i64, content: &str) -> RepoResult<Comment> {
        let now = Utc::now();
        sqlx::query_as::<_, Comment>(
            "INSERT INTO comments (task_id, author_id, content, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?)
             RETURNING *",
        )
        .bind(task_id)
        .bind(author_id)
        .bind(content)
        .bind(now)
        .bind(now)
        .fetch_one(self.pool)
        .await
    }

    pub async fn find_by_id(&self, id: i64) -> RepoResult<Option<Comment>> {
        sqlx::query_as::<_, Comment>("SELECT * FROM comments WHERE id = ?")
            .bind(id)
            .fetch_optional(self.pool)
            .await
    }

    /// Oldest first.
    pub async fn find_by_task_id(&self, task_id: i64) -> RepoResult<Vec<Comment>> {
        sqlx::query_as::<_, Comment>(
            "SELECT * FROM comments WHERE task_id = ? ORDER BY created_at, id",
        )
        .bind(task_id)
        .fetch_all(self.pool)
        .await
    }

    pub async fn update(&self, id: i64, content: &str) -> RepoResult<Option<Comment>> {
        sqlx::query_as::<_, Comment>(
            "UPDATE comments SET content = ?, updated_at = ? WHERE id = ? RETURNING *",
        )
        .bind(content)
        .bind(Utc::now())
        .bind(id)
        .fetch_optional(self.pool)
        .await
    }

    pub async fn delete(&self, id: i64) -> RepoResult<u64> {
        let result = sqlx::query("DELETE FROM comments WHERE id = ?")
            .bind(id)
            .execute(self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}
