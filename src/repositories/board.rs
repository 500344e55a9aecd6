use chrono::Utc;
use sqlx::{SqliteConnection, SqlitePool};

use super::column;
use super::RepoResult;
use crate::models::Board;

pub struct BoardRepo<'a> {
    pool: &'a SqlitePool,
}

impl<'a> BoardRepo<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Creates a board with its three default columns in one transaction.
    pub async fn create(&self, project_id: i64, name: &str) -> RepoResult<Board> {
        let mut tx = self.pool.begin().await?;
        let board = insert_with_defaults(&mut *tx, project_id, name).await?;
        tx.commit().await?;
        Ok(board)
    }

    pub async fn find_by_id(&self, id: i64) -> RepoResult<Option<Board>> {
        sqlx::query_as::<_, Board>("SELECT * FROM boards WHERE id = ?")
            .bind(id)
            .fetch_optional(self.pool)
            .await
    }

    pub async fn find_by_project_id(&self, project_id: i64) -> RepoResult<Vec<Board>> {
        sqlx::query_as::<_, Board>(
            "SELECT * FROM boards WHERE project_id = ? ORDER BY created_at, id",
        )
        .bind(project_id)
        .fetch_all(self.pool)
        .await
    }

    pub async fn update(&self, id: i64, name: &str) -> RepoResult<Option<Board>> {
        sqlx::query_as::<_, Board>("UPDATE boards SET name = ? WHERE id = ? RETURNING *")
            .bind(name)
            .bind(id)
            .fetch_optional(self.pool)
            .await
    }

    /// Columns and tasks go with the board (`ON DELETE CASCADE`).
    pub async fn delete(&self, id: i64) -> RepoResult<u64> {
        let result = sqlx::query("DELETE FROM boards WHERE id = ?")
            .bind(id)
            .execute(self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}

/// Inserts a board and its default columns on an open connection or
/// transaction.
pub(crate) async fn insert_with_defaults(
    conn: &mut SqliteConnection,
    project_id: i64,
    name: &str,
) -> RepoResult<Board> {
    let board = sqlx::query_as::<_, Board>(
        "INSERT INTO boards (project_id, name, created_at) VALUES (?, ?, ?) RETURNING *",
    )
    .bind(project_id)
    .bind(name)
    .bind(Utc::now())
    .fetch_one(&mut *conn)
    .await?;

    column::insert_defaults(conn, board.id).await?;
    Ok(board)
}
