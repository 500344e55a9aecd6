use actix_web::{delete, get, patch, post, web, HttpResponse};
use serde::Serialize;
use sqlx::SqlitePool;
use validator::Validate;

use crate::{
    access::AccessContext,
    auth::AuthenticatedUser,
    error::AppError,
    models::{Board, BoardColumn, BoardInput, TaskWithSubtasks},
    repositories::{BoardRepo, ColumnRepo, TaskRepo},
    response,
};

use super::find_board;

/// A board as rendered by the frontend: its columns and its top-level tasks,
/// each with its subtasks.
#[derive(Debug, Serialize)]
pub struct BoardDetails {
    pub board: Board,
    pub columns: Vec<BoardColumn>,
    pub tasks: Vec<TaskWithSubtasks>,
}

#[get("/projects/{project_id}/boards")]
pub async fn list_boards(
    pool: web::Data<SqlitePool>,
    user: AuthenticatedUser,
    path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    let project_id = path.into_inner();
    AccessContext::new(&pool, user.id())
        .require_member(project_id)
        .await?;

    let boards = BoardRepo::new(&pool).find_by_project_id(project_id).await?;
    Ok(response::success(boards, "Success"))
}

/// Creates a board with the default columns. Project admins only.
#[post("/projects/{project_id}/boards")]
pub async fn create_board(
    pool: web::Data<SqlitePool>,
    user: AuthenticatedUser,
    path: web::Path<i64>,
    body: web::Json<BoardInput>,
) -> Result<HttpResponse, AppError> {
    let project_id = path.into_inner();
    AccessContext::new(&pool, user.id())
        .require_admin(project_id)
        .await?;
    body.validate()?;

    let board = BoardRepo::new(&pool).create(project_id, &body.name).await?;
    log::info!("Board {} created in project {}", board.id, project_id);
    Ok(response::created(board, "Board created"))
}

/// ## Responses:
/// - `200 OK`: [`BoardDetails`].
/// - `403 Forbidden`: the caller is not a member of the board's project.
/// - `404 Not Found`: no such board.
#[get("/boards/{id}")]
pub async fn get_board(
    pool: web::Data<SqlitePool>,
    user: AuthenticatedUser,
    path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    let board = find_board(&pool, path.into_inner()).await?;
    AccessContext::new(&pool, user.id())
        .require_member(board.project_id)
        .await?;

    let columns = ColumnRepo::new(&pool).find_by_board_id(board.id).await?;
    let task_repo = TaskRepo::new(&pool);
    let mut tasks = Vec::new();
    for task in task_repo.find_by_board_id(board.id).await? {
        let subtasks = task_repo.subtasks(task.id).await?;
        tasks.push(TaskWithSubtasks { task, subtasks });
    }

    Ok(response::success(
        BoardDetails {
            board,
            columns,
            tasks,
        },
        "Success",
    ))
}

#[patch("/boards/{id}")]
pub async fn update_board(
    pool: web::Data<SqlitePool>,
    user: AuthenticatedUser,
    path: web::Path<i64>,
    body: web::Json<BoardInput>,
) -> Result<HttpResponse, AppError> {
    let board = find_board(&pool, path.into_inner()).await?;
    AccessContext::new(&pool, user.id())
        .require_admin(board.project_id)
        .await?;
    body.validate()?;

    let board = BoardRepo::new(&pool)
        .update(board.id, &body.name)
        .await?
        .ok_or_else(|| AppError::NotFound("Board not found".into()))?;
    Ok(response::success(board, "Board updated"))
}

#[delete("/boards/{id}")]
pub async fn delete_board(
    pool: web::Data<SqlitePool>,
    user: AuthenticatedUser,
    path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    let board = find_board(&pool, path.into_inner()).await?;
    AccessContext::new(&pool, user.id())
        .require_admin(board.project_id)
        .await?;

    BoardRepo::new(&pool).delete(board.id).await?;
    log::info!("Board {} deleted by user {}", board.id, user.id());
    Ok(response::message("Board deleted"))
}
