use actix_web::{patch, web, HttpResponse};
use serde::Deserialize;
use sqlx::SqlitePool;

use crate::{
    error::AppError,
    models::{PublicUser, Role},
    repositories::UserRepo,
    response,
};

#[derive(Debug, Deserialize)]
pub struct SetRoleRequest {
    pub role: Role,
}

/// Changes a user's global role. Guarded by `RequireAdmin` on the `/admin`
/// scope. Takes effect for the user's next issued token.
#[patch("/users/{id}/role")]
pub async fn set_user_role(
    pool: web::Data<SqlitePool>,
    path: web::Path<i64>,
    body: web::Json<SetRoleRequest>,
) -> Result<HttpResponse, AppError> {
    let user_id = path.into_inner();
    let user = UserRepo::new(&pool)
        .set_role(user_id, body.role)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".into()))?;
    log::info!("User {} global role set to {:?}", user.id, user.role);

    Ok(response::success(PublicUser::from(user), "Role updated"))
}
