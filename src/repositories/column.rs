use sqlx::{QueryBuilder, Sqlite, SqliteConnection, SqlitePool};

use super::RepoResult;
use crate::models::{BoardColumn, ColumnUpdate};

pub const DEFAULT_COLUMN_COLOR: &str = "#6b7280";

/// Columns every new board starts with, in order.
pub const DEFAULT_COLUMNS: [(&str, &str); 3] = [
    ("To Do", DEFAULT_COLUMN_COLOR),
    ("In Progress", "#f59e0b"),
    ("Done", "#10b981"),
];

pub struct ColumnRepo<'a> {
    pool: &'a SqlitePool,
}

impl<'a> ColumnRepo<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Appends a column to the end of the board.
    ///
    /// The position is computed by the INSERT itself, so two concurrent
    /// appends cannot both observe the same maximum.
    pub async fn create(
        &self,
        board_id: i64,
        name: &str,
        color: Option<&str>,
    ) -> RepoResult<BoardColumn> {
        sqlx::query_as::<_, BoardColumn>(
            "INSERT INTO board_columns (board_id, name, color, position)
             SELECT ?, ?, ?, COALESCE(MAX(position), -1) + 1
             FROM board_columns WHERE board_id = ?
             RETURNING *",
        )
        .bind(board_id)
        .bind(name)
        .bind(color.unwrap_or(DEFAULT_COLUMN_COLOR))
        .bind(board_id)
        .fetch_one(self.pool)
        .await
    }

    pub async fn find_by_id(&self, id: i64) -> RepoResult<Option<BoardColumn>> {
        sqlx::query_as::<_, BoardColumn>("SELECT * FROM board_columns WHERE id = ?")
            .bind(id)
            .fetch_optional(self.pool)
            .await
    }

    pub async fn find_by_board_id(&self, board_id: i64) -> RepoResult<Vec<BoardColumn>> {
        sqlx::query_as::<_, BoardColumn>(
            "SELECT * FROM board_columns WHERE board_id = ? ORDER BY position ASC, id ASC",
        )
        .bind(board_id)
        .fetch_all(self.pool)
        .await
    }

    pub async fn count_by_board_id(&self, board_id: i64) -> RepoResult<i64> {
        sqlx::query_scalar("SELECT COUNT(*) FROM board_columns WHERE board_id = ?")
            .bind(board_id)
            .fetch_one(self.pool)
            .await
    }

    /// Applies the fields present in `changes`. An empty change-set just
    /// re-reads the column.
    pub async fn update(&self, id: i64, changes: &ColumnUpdate) -> RepoResult<Option<BoardColumn>> {
        if changes.is_empty() {
            return self.find_by_id(id).await;
        }

        let mut query = QueryBuilder::<Sqlite>::new("UPDATE board_columns SET ");
        let mut fields = query.separated(", ");
        if let Some(name) = &changes.name {
            fields.push("name = ").push_bind_unseparated(name.clone());
        }
        if let Some(color) = &changes.color {
            fields.push("color = ").push_bind_unseparated(color.clone());
        }
        query.push(" WHERE id = ").push_bind(id).push(" RETURNING *");

        query
            .build_query_as::<BoardColumn>()
            .fetch_optional(self.pool)
            .await
    }

    pub async fn delete(&self, id: i64) -> RepoResult<u64> {
        let result = sqlx::query("DELETE FROM board_columns WHERE id = ?")
            .bind(id)
            .execute(self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    /// Gives each listed column its index in `column_ids` as position.
    ///
    /// Only columns of `board_id` are touched. The list is not checked to be a
    /// permutation of the board's columns: ids that are missing keep their old
    /// position, unknown ids match nothing.
    pub async fn reorder(&self, board_id: i64, column_ids: &[i64]) -> RepoResult<()> {
        let mut tx = self.pool.begin().await?;
        for (position, id) in column_ids.iter().enumerate() {
            sqlx::query("UPDATE board_columns SET position = ? WHERE id = ? AND board_id = ?")
                .bind(position as i64)
                .bind(*id)
                .bind(board_id)
                .execute(&mut *tx)
                .await?;
        }
        tx.commit().await
    }
}

/// Inserts [`DEFAULT_COLUMNS`] at positions 0, 1, 2 on a fresh board.
pub(crate) async fn insert_defaults(
    conn: &mut SqliteConnection,
    board_id: i64,
) -> RepoResult<Vec<BoardColumn>> {
    let mut columns = Vec::with_capacity(DEFAULT_COLUMNS.len());
    for (position, (name, color)) in DEFAULT_COLUMNS.iter().enumerate() {
        let column = sqlx::query_as::<_, BoardColumn>(
            "INSERT INTO board_columns (board_id, name, color, position)
             VALUES (?, ?, ?, ?)
             RETURNING *",
        )
        .bind(board_id)
        .bind(*name)
        .bind(*color)
        .bind(position as i64)
        .fetch_one(&mut *conn)
        .await?;
        columns.push(column);
    }
    Ok(columns)
}
