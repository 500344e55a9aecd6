use actix_web::{delete, get, patch, post, web, HttpResponse};
use sqlx::SqlitePool;
use validator::Validate;

use crate::{
    access::AccessContext,
    auth::AuthenticatedUser,
    error::AppError,
    models::{Label, LabelInput, LabelUpdate},
    repositories::LabelRepo,
    response,
};

async fn find_label(pool: &SqlitePool, id: i64) -> Result<Label, AppError> {
    LabelRepo::new(pool)
        .find_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Label not found".into()))
}

#[get("/projects/{project_id}/labels")]
pub async fn list_labels(
    pool: web::Data<SqlitePool>,
    user: AuthenticatedUser,
    path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    let project_id = path.into_inner();
    AccessContext::new(&pool, user.id())
        .require_member(project_id)
        .await?;

    let labels = LabelRepo::new(&pool).find_by_project_id(project_id).await?;
    Ok(response::success(labels, "Success"))
}

/// Color defaults to `#6366f1`.
#[post("/projects/{project_id}/labels")]
pub async fn create_label(
    pool: web::Data<SqlitePool>,
    user: AuthenticatedUser,
    path: web::Path<i64>,
    body: web::Json<LabelInput>,
) -> Result<HttpResponse, AppError> {
    let project_id = path.into_inner();
    AccessContext::new(&pool, user.id())
        .require_admin(project_id)
        .await?;
    body.validate()?;

    let label = LabelRepo::new(&pool)
        .create(project_id, &body.name, body.color.as_deref())
        .await?;
    Ok(response::created(label, "Label created"))
}

#[patch("/labels/{id}")]
pub async fn update_label(
    pool: web::Data<SqlitePool>,
    user: AuthenticatedUser,
    path: web::Path<i64>,
    body: web::Json<LabelUpdate>,
) -> Result<HttpResponse, AppError> {
    let label = find_label(&pool, path.into_inner()).await?;
    AccessContext::new(&pool, user.id())
        .require_admin(label.project_id)
        .await?;
    body.validate()?;

    let label = LabelRepo::new(&pool)
        .update(label.id, &body)
        .await?
        .ok_or_else(|| AppError::NotFound("Label not found".into()))?;
    Ok(response::success(label, "Label updated"))
}

/// Detaches the label from every task and deletes it.
#[delete("/labels/{id}")]
pub async fn delete_label(
    pool: web::Data<SqlitePool>,
    user: AuthenticatedUser,
    path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    let label = find_label(&pool, path.into_inner()).await?;
    AccessContext::new(&pool, user.id())
        .require_admin(label.project_id)
        .await?;

    LabelRepo::new(&pool).delete(label.id).await?;
    Ok(response::message("Label deleted"))
}
