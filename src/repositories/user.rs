use chrono::Utc;
use sqlx::SqlitePool;

use super::RepoResult;
use crate::models::{PublicUser, Role, User};

pub struct UserRepo<'a> {
    pool: &'a SqlitePool,
}

impl<'a> UserRepo<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn create(
        &self,
        email: &str,
        password_hash: &str,
        name: &str,
        role: Role,
    ) -> RepoResult<User> {
        let now = Utc::now();
        sqlx::query_as::<_, User>(
            "INSERT INTO users (email, password_hash, name, role, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?)
             RETURNING *",
        )
        .bind(email)
        .bind(password_hash)
        .bind(name)
        .bind(role)
        .bind(now)
        .bind(now)
        .fetch_one(self.pool)
        .await
    }

    pub async fn find_by_id(&self, id: i64) -> RepoResult<Option<User>> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = ?")
            .bind(id)
            .fetch_optional(self.pool)
            .await
    }

    pub async fn find_by_email(&self, email: &str) -> RepoResult<Option<User>> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = ?")
            .bind(email)
            .fetch_optional(self.pool)
            .await
    }

    pub async fn find_all(&self) -> RepoResult<Vec<PublicUser>> {
        sqlx::query_as::<_, PublicUser>("SELECT id, email, name, role FROM users ORDER BY name, id")
            .fetch_all(self.pool)
            .await
    }

    /// Changes the global role. Returns `None` when the user does not exist.
    pub async fn set_role(&self, id: i64, role: Role) -> RepoResult<Option<User>> {
        sqlx::query_as::<_, User>(
            "UPDATE users SET role = ?, updated_at = ? WHERE id = ? RETURNING *",
        )
        .bind(role)
        .bind(Utc::now())
        .bind(id)
        .fetch_optional(self.pool)
        .await
    }
}
