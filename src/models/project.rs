use chrono::{DateTime, Utc};
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

lazy_static! {
    static ref PROJECT_KEY_REGEX: Regex = Regex::new(r"^[a-zA-Z0-9]+$").unwrap();
}

/// Admin or member. Used both for the global user role and for the
/// per-project role stored in `project_members`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    #[default]
    Member,
}

impl Role {
    pub fn is_admin(self) -> bool {
        self == Role::Admin
    }
}

/// A row of the `projects` table.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Project {
    pub id: i64,
    pub name: String,
    /// Unique, upper-cased short key such as `ABC`.
    pub key: String,
    pub description: Option<String>,
    pub owner_id: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ProjectMember {
    pub project_id: i64,
    pub user_id: i64,
    pub role: Role,
}

/// A membership row joined with the member's name and email.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct MemberWithUser {
    pub project_id: i64,
    pub user_id: i64,
    pub role: Role,
    pub name: String,
    pub email: String,
}

/// Payload of `POST /projects`.
#[derive(Debug, Deserialize, Validate)]
pub struct ProjectInput {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    /// 2 to 10 alphanumerics; stored upper-cased.
    #[validate(
        length(min = 2, max = 10),
        regex(path = "PROJECT_KEY_REGEX", message = "Project key must be alphanumeric")
    )]
    pub key: String,
    #[validate(length(max = 1000))]
    pub description: Option<String>,
}

/// Payload of `PATCH /projects/{id}`. Absent fields are left untouched.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct ProjectUpdate {
    #[validate(length(min = 1, max = 100))]
    pub name: Option<String>,
    #[validate(length(max = 1000))]
    pub description: Option<String>,
}

impl ProjectUpdate {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.description.is_none()
    }
}

/// Payload of `POST /projects/{id}/members`.
#[derive(Debug, Deserialize)]
pub struct AddMemberInput {
    pub user_id: i64,
    #[serde(default)]
    pub role: Role,
}
