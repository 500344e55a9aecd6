use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::Role;

/// A row of the `users` table.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: i64,
    pub email: String,
    // never leaves the server
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    pub name: String,
    /// Global role. Independent of any per-project role.
    pub role: Role,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// The subset of a user that other users may see.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct PublicUser {
    pub id: i64,
    pub email: String,
    pub name: String,
    pub role: Role,
}

impl From<User> for PublicUser {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            name: user.name,
            role: user.role,
        }
    }
}
