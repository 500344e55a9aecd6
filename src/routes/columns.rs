use actix_web::{delete, get, patch, post, web, HttpResponse};
use sqlx::SqlitePool;
use validator::Validate;

use crate::{
    access::AccessContext,
    auth::AuthenticatedUser,
    error::AppError,
    models::{BoardColumn, ColumnInput, ColumnUpdate, ReorderColumnsInput},
    repositories::ColumnRepo,
    response,
};

use super::find_board;

async fn find_column(pool: &SqlitePool, id: i64) -> Result<BoardColumn, AppError> {
    ColumnRepo::new(pool)
        .find_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Column not found".into()))
}

#[get("/boards/{board_id}/columns")]
pub async fn list_columns(
    pool: web::Data<SqlitePool>,
    user: AuthenticatedUser,
    path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    let board = find_board(&pool, path.into_inner()).await?;
    AccessContext::new(&pool, user.id())
        .require_member(board.project_id)
        .await?;

    let columns = ColumnRepo::new(&pool).find_by_board_id(board.id).await?;
    Ok(response::success(columns, "Success"))
}

/// Appends a column to the board.
#[post("/boards/{board_id}/columns")]
pub async fn create_column(
    pool: web::Data<SqlitePool>,
    user: AuthenticatedUser,
    path: web::Path<i64>,
    body: web::Json<ColumnInput>,
) -> Result<HttpResponse, AppError> {
    let board = find_board(&pool, path.into_inner()).await?;
    AccessContext::new(&pool, user.id())
        .require_admin(board.project_id)
        .await?;
    body.validate()?;

    let column = ColumnRepo::new(&pool)
        .create(board.id, &body.name, body.color.as_deref())
        .await?;
    Ok(response::created(column, "Column created"))
}

/// Sets column positions from the order of `column_ids` and returns the
/// board's columns in their new order.
///
/// Ids of other boards are ignored. Columns left out of the list keep their
/// current position.
#[patch("/boards/{board_id}/columns/reorder")]
pub async fn reorder_columns(
    pool: web::Data<SqlitePool>,
    user: AuthenticatedUser,
    path: web::Path<i64>,
    body: web::Json<ReorderColumnsInput>,
) -> Result<HttpResponse, AppError> {
    let board = find_board(&pool, path.into_inner()).await?;
    AccessContext::new(&pool, user.id())
        .require_admin(board.project_id)
        .await?;

    let repo = ColumnRepo::new(&pool);
    repo.reorder(board.id, &body.column_ids).await?;
    let columns = repo.find_by_board_id(board.id).await?;
    Ok(response::success(columns, "Columns reordered"))
}

#[patch("/columns/{id}")]
pub async fn update_column(
    pool: web::Data<SqlitePool>,
    user: AuthenticatedUser,
    path: web::Path<i64>,
    body: web::Json<ColumnUpdate>,
) -> Result<HttpResponse, AppError> {
    let column = find_column(&pool, path.into_inner()).await?;
    let board = find_board(&pool, column.board_id).await?;
    AccessContext::new(&pool, user.id())
        .require_admin(board.project_id)
        .await?;
    body.validate()?;

    let column = ColumnRepo::new(&pool)
        .update(column.id, &body)
        .await?
        .ok_or_else(|| AppError::NotFound("Column not found".into()))?;
    Ok(response::success(column, "Column updated"))
}

/// A board always keeps at least one column.
#[delete("/columns/{id}")]
pub async fn delete_column(
    pool: web::Data<SqlitePool>,
    user: AuthenticatedUser,
    path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    let column = find_column(&pool, path.into_inner()).await?;
    let board = find_board(&pool, column.board_id).await?;
    AccessContext::new(&pool, user.id())
        .require_admin(board.project_id)
        .await?;

    let repo = ColumnRepo::new(&pool);
    if repo.count_by_board_id(board.id).await? <= 1 {
        return Err(AppError::BadRequest(
            "Cannot delete the last column of a board".into(),
        ));
    }
    repo.delete(column.id).await?;
    Ok(response::message("Column deleted"))
}
