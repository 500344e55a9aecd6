use chrono::Utc;
use sqlx::{QueryBuilder, Sqlite, SqliteConnection, SqlitePool};

use super::board;
use super::RepoResult;
use crate::models::{Board, MemberWithUser, Project, ProjectUpdate, Role};

/// Name of the board every project is created with.
pub const DEFAULT_BOARD_NAME: &str = "Main Board";

pub struct ProjectRepo<'a> {
    pool: &'a SqlitePool,
}

impl<'a> ProjectRepo<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Creates a project owned by `owner_id`.
    ///
    /// In the same transaction the owner becomes a project admin and the
    /// default board (with its default columns) is created.
    pub async fn create(
        &self,
        name: &str,
        key: &str,
        description: Option<&str>,
        owner_id: i64,
    ) -> RepoResult<(Project, Board)> {
        let now = Utc::now();
        let mut tx = self.pool.begin().await?;

        let project = sqlx::query_as::<_, Project>(
            "INSERT INTO projects (name, key, description, owner_id, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?)
             RETURNING *",
        )
        .bind(name)
        .bind(key)
        .bind(description)
        .bind(owner_id)
        .bind(now)
        .bind(now)
        .fetch_one(&mut *tx)
        .await?;

        upsert_member(&mut *tx, project.id, owner_id, Role::Admin).await?;
        let board = board::insert_with_defaults(&mut *tx, project.id, DEFAULT_BOARD_NAME).await?;

        tx.commit().await?;
        Ok((project, board))
    }

    pub async fn find_by_id(&self, id: i64) -> RepoResult<Option<Project>> {
        sqlx::query_as::<_, Project>("SELECT * FROM projects WHERE id = ?")
            .bind(id)
            .fetch_optional(self.pool)
            .await
    }

    pub async fn find_by_key(&self, key: &str) -> RepoResult<Option<Project>> {
        sqlx::query_as::<_, Project>("SELECT * FROM projects WHERE key = ?")
            .bind(key)
            .fetch_optional(self.pool)
            .await
    }

    /// Projects `user_id` is a member of, in any role.
    pub async fn find_by_user_id(&self, user_id: i64) -> RepoResult<Vec<Project>> {
        sqlx::query_as::<_, Project>(
            "SELECT p.* FROM projects p
             INNER JOIN project_members pm ON p.id = pm.project_id
             WHERE pm.user_id = ?
             ORDER BY p.id",
        )
        .bind(user_id)
        .fetch_all(self.pool)
        .await
    }

    pub async fn update(&self, id: i64, changes: &ProjectUpdate) -> RepoResult<Option<Project>> {
        if changes.is_empty() {
            return self.find_by_id(id).await;
        }

        let mut query = QueryBuilder::<Sqlite>::new("UPDATE projects SET ");
        let mut fields = query.separated(", ");
        if let Some(name) = &changes.name {
            fields.push("name = ").push_bind_unseparated(name.clone());
        }
        if let Some(description) = &changes.description {
            fields
                .push("description = ")
                .push_bind_unseparated(description.clone());
        }
        fields.push("updated_at = ").push_bind_unseparated(Utc::now());
        query.push(" WHERE id = ").push_bind(id).push(" RETURNING *");

        query
            .build_query_as::<Project>()
            .fetch_optional(self.pool)
            .await
    }

    /// Boards, labels and memberships go with the project (`ON DELETE CASCADE`).
    pub async fn delete(&self, id: i64) -> RepoResult<u64> {
        let result = sqlx::query("DELETE FROM projects WHERE id = ?")
            .bind(id)
            .execute(self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    /// Adds `user_id` to the project, replacing any previous role.
    pub async fn add_member(&self, project_id: i64, user_id: i64, role: Role) -> RepoResult<()> {
        let mut conn = self.pool.acquire().await?;
        upsert_member(&mut *conn, project_id, user_id, role).await
    }

    pub async fn remove_member(&self, project_id: i64, user_id: i64) -> RepoResult<u64> {
        let result =
            sqlx::query("DELETE FROM project_members WHERE project_id = ? AND user_id = ?")
                .bind(project_id)
                .bind(user_id)
                .execute(self.pool)
                .await?;
        Ok(result.rows_affected())
    }

    pub async fn members(&self, project_id: i64) -> RepoResult<Vec<MemberWithUser>> {
        sqlx::query_as::<_, MemberWithUser>(
            "SELECT pm.project_id, pm.user_id, pm.role, u.name, u.email
             FROM project_members pm
             INNER JOIN users u ON pm.user_id = u.id
             WHERE pm.project_id = ?
             ORDER BY u.name, u.id",
        )
        .bind(project_id)
        .fetch_all(self.pool)
        .await
    }

    /// The role of `user_id` in the project, or `None` for non-members.
    pub async fn member_role(&self, project_id: i64, user_id: i64) -> RepoResult<Option<Role>> {
        sqlx::query_scalar::<_, Role>(
            "SELECT role FROM project_members WHERE project_id = ? AND user_id = ?",
        )
        .bind(project_id)
        .bind(user_id)
        .fetch_optional(self.pool)
        .await
    }
}

async fn upsert_member(
    conn: &mut SqliteConnection,
    project_id: i64,
    user_id: i64,
    role: Role,
) -> RepoResult<()> {
    sqlx::query(
        "INSERT OR REPLACE INTO project_members (project_id, user_id, role) VALUES (?, ?, ?)",
    )
    .bind(project_id)
    .bind(user_id)
    .bind(role)
    .execute(conn)
    .await?;
    Ok(())
}
