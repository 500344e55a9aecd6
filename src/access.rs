//! Project-level authorization.
//!
//! A user's role inside a project comes from `project_members`. Handlers build
//! one [`AccessContext`] per request; it remembers every role it has looked up
//! so repeated checks against the same project cost a single query. Nothing is
//! shared between requests.

use std::collections::HashMap;

use sqlx::SqlitePool;

use crate::error::AppError;
use crate::models::Role;
use crate::repositories::ProjectRepo;

pub struct AccessContext<'a> {
    pool: &'a SqlitePool,
    user_id: i64,
    roles: HashMap<i64, Option<Role>>,
}

impl<'a> AccessContext<'a> {
    pub fn new(pool: &'a SqlitePool, user_id: i64) -> Self {
        Self {
            pool,
            user_id,
            roles: HashMap::new(),
        }
    }

    /// The caller's role in `project_id`, `None` for non-members.
    pub async fn role_in(&mut self, project_id: i64) -> Result<Option<Role>, AppError> {
        if let Some(role) = self.roles.get(&project_id) {
            return Ok(*role);
        }
        let role = ProjectRepo::new(self.pool)
            .member_role(project_id, self.user_id)
            .await?;
        self.roles.insert(project_id, role);
        Ok(role)
    }

    /// Fails with 403 unless the caller belongs to the project.
    pub async fn require_member(&mut self, project_id: i64) -> Result<Role, AppError> {
        self.role_in(project_id)
            .await?
            .ok_or_else(|| AppError::Forbidden("Not a member of this project".into()))
    }

    /// Fails with 403 unless the caller is an admin of the project.
    pub async fn require_admin(&mut self, project_id: i64) -> Result<(), AppError> {
        match self.role_in(project_id).await? {
            Some(Role::Admin) => Ok(()),
            Some(Role::Member) => Err(AppError::Forbidden("Project admin access required".into())),
            None => Err(AppError::Forbidden("Not a member of this project".into())),
        }
    }

    pub async fn is_admin(&mut self, project_id: i64) -> Result<bool, AppError> {
        Ok(self.role_in(project_id).await? == Some(Role::Admin))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;
    use crate::repositories::UserRepo;

    async fn seed() -> (SqlitePool, i64, i64, i64) {
        let pool = db::init("sqlite::memory:").await.unwrap();
        let users = UserRepo::new(&pool);
        let owner = users.create("a@x.com", "h", "A", Role::Member).await.unwrap();
        let other = users.create("b@x.com", "h", "B", Role::Member).await.unwrap();
        let (project, _) = ProjectRepo::new(&pool)
            .create("Alpha", "ABC", None, owner.id)
            .await
            .unwrap();
        (pool, owner.id, other.id, project.id)
    }

    #[actix_rt::test]
    async fn test_owner_is_admin() {
        let (pool, owner, _, project) = seed().await;
        let mut access = AccessContext::new(&pool, owner);

        assert_eq!(access.role_in(project).await.unwrap(), Some(Role::Admin));
        assert!(access.require_admin(project).await.is_ok());
        assert!(access.is_admin(project).await.unwrap());
    }

    #[actix_rt::test]
    async fn test_non_member_is_forbidden() {
        let (pool, _, other, project) = seed().await;
        let mut access = AccessContext::new(&pool, other);

        assert!(matches!(
            access.require_member(project).await,
            Err(AppError::Forbidden(_))
        ));
        assert!(matches!(
            access.require_admin(project).await,
            Err(AppError::Forbidden(_))
        ));
    }

    #[actix_rt::test]
    async fn test_member_is_not_admin() {
        let (pool, _, other, project) = seed().await;
        ProjectRepo::new(&pool)
            .add_member(project, other, Role::Member)
            .await
            .unwrap();
        let mut access = AccessContext::new(&pool, other);

        assert_eq!(access.require_member(project).await.unwrap(), Role::Member);
        assert!(access.require_admin(project).await.is_err());
    }

    #[actix_rt::test]
    async fn test_roles_are_remembered_for_the_request() {
        let (pool, _, other, project) = seed().await;
        let mut access = AccessContext::new(&pool, other);
        assert_eq!(access.role_in(project).await.unwrap(), None);

        // Membership granted after the first lookup is not seen by this context.
        ProjectRepo::new(&pool)
            .add_member(project, other, Role::Member)
            .await
            .unwrap();
        assert_eq!(access.role_in(project).await.unwrap(), None);

        let mut fresh = AccessContext::new(&pool, other);
        assert_eq!(fresh.role_in(project).await.unwrap(), Some(Role::Member));
    }
}
