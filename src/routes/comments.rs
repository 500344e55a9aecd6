use actix_web::{delete, get, patch, post, web, HttpResponse};
use sqlx::SqlitePool;
use validator::Validate;

use crate::{
    access::AccessContext,
    auth::AuthenticatedUser,
    error::AppError,
    models::{Board, Comment, CommentInput},
    repositories::CommentRepo,
    response,
};

use super::find_task;

/// The comment and the board of its task.
async fn find_comment(pool: &SqlitePool, id: i64) -> Result<(Comment, Board), AppError> {
    let comment = CommentRepo::new(pool)
        .find_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Comment not found".into()))?;
    let (_, board) = find_task(pool, comment.task_id).await?;
    Ok((comment, board))
}

#[get("/tasks/{id}/comments")]
pub async fn list_comments(
    pool: web::Data<SqlitePool>,
    user: AuthenticatedUser,
    path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    let (task, board) = find_task(&pool, path.into_inner()).await?;
    AccessContext::new(&pool, user.id())
        .require_member(board.project_id)
        .await?;

    let comments = CommentRepo::new(&pool).find_by_task_id(task.id).await?;
    Ok(response::success(comments, "Success"))
}

#[post("/tasks/{id}/comments")]
pub async fn create_comment(
    pool: web::Data<SqlitePool>,
    user: AuthenticatedUser,
    path: web::Path<i64>,
    body: web::Json<CommentInput>,
) -> Result<HttpResponse, AppError> {
    let (task, board) = find_task(&pool, path.into_inner()).await?;
    AccessContext::new(&pool, user.id())
        .require_member(board.project_id)
        .await?;
    body.validate()?;

    let comment = CommentRepo::new(&pool)
        .create(task.id, user.id(), &body.content)
        .await?;
    Ok(response::created(comment, "Comment added"))
}

/// Only the author may edit a comment.
#[patch("/comments/{id}")]
pub async fn update_comment(
    pool: web::Data<SqlitePool>,
    user: AuthenticatedUser,
    path: web::Path<i64>,
    body: web::Json<CommentInput>,
) -> Result<HttpResponse, AppError> {
    let (comment, board) = find_comment(&pool, path.into_inner()).await?;
    AccessContext::new(&pool, user.id())
        .require_member(board.project_id)
        .await?;
    if comment.author_id != user.id() {
        return Err(AppError::Forbidden(
            "Only the author can edit this comment".into(),
        ));
    }
    body.validate()?;

    let comment = CommentRepo::new(&pool)
        .update(comment.id, &body.content)
        .await?
        .ok_or_else(|| AppError::NotFound("Comment not found".into()))?;
    Ok(response::success(comment, "Comment updated"))
}

/// The author or a project admin may delete a comment.
#[delete("/comments/{id}")]
pub async fn delete_comment(
    pool: web::Data<SqlitePool>,
    user: AuthenticatedUser,
    path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    let (comment, board) = find_comment(&pool, path.into_inner()).await?;
    let mut access = AccessContext::new(&pool, user.id());
    access.require_member(board.project_id).await?;
    if comment.author_id != user.id() && !access.is_admin(board.project_id).await? {
        return Err(AppError::Forbidden(
            "Only the author or a project admin can delete this comment".into(),
        ));
    }

    CommentRepo::new(&pool).delete(comment.id).await?;
    Ok(response::message("Comment deleted"))
}
