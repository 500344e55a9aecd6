pub mod admin;
pub mod auth;
pub mod boards;
pub mod columns;
pub mod comments;
pub mod health;
pub mod labels;
pub mod projects;
pub mod tasks;

use actix_web::{web, HttpRequest};
use sqlx::SqlitePool;

use crate::auth::RequireAdmin;
use crate::error::AppError;
use crate::models::{Board, Task};
use crate::repositories::{BoardRepo, TaskRepo, UserRepo};

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.app_data(json_config())
        .app_data(path_config())
        .service(health::index)
        .service(health::health)
        .service(
            web::scope("/auth")
                .service(auth::register)
                .service(auth::login)
                .service(auth::refresh)
                .service(auth::me)
                .service(auth::users),
        )
        .service(
            web::scope("/admin")
                .wrap(RequireAdmin)
                .service(admin::set_user_role),
        )
        .service(projects::list_projects)
        .service(projects::create_project)
        .service(projects::get_project)
        .service(projects::update_project)
        .service(projects::delete_project)
        .service(projects::add_member)
        .service(projects::remove_member)
        .service(boards::list_boards)
        .service(boards::create_board)
        .service(boards::get_board)
        .service(boards::update_board)
        .service(boards::delete_board)
        .service(columns::reorder_columns)
        .service(columns::list_columns)
        .service(columns::create_column)
        .service(columns::update_column)
        .service(columns::delete_column)
        .service(tasks::list_tasks)
        .service(tasks::create_task)
        .service(tasks::get_task)
        .service(tasks::update_task)
        .service(tasks::delete_task)
        .service(tasks::create_subtask)
        .service(tasks::add_label)
        .service(tasks::remove_label)
        .service(comments::list_comments)
        .service(comments::create_comment)
        .service(comments::update_comment)
        .service(comments::delete_comment)
        .service(labels::list_labels)
        .service(labels::create_label)
        .service(labels::update_label)
        .service(labels::delete_label);
}

/// Malformed JSON bodies become a 400 envelope instead of actix's plain text.
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err, _req: &HttpRequest| {
        AppError::BadRequest(format!("Invalid request body: {}", err)).into()
    })
}

/// Non-numeric ids in the path become a 400 envelope.
pub fn path_config() -> web::PathConfig {
    web::PathConfig::default().error_handler(|err, _req: &HttpRequest| {
        AppError::BadRequest(format!("Invalid path parameter: {}", err)).into()
    })
}

pub(crate) async fn find_board(pool: &SqlitePool, id: i64) -> Result<Board, AppError> {
    BoardRepo::new(pool)
        .find_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Board not found".into()))
}

/// The task and the board it lives on. The board carries the project id
/// every access check needs.
pub(crate) async fn find_task(pool: &SqlitePool, id: i64) -> Result<(Task, Board), AppError> {
    let task = TaskRepo::new(pool)
        .find_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Task not found".into()))?;
    let board = find_board(pool, task.board_id).await?;
    Ok((task, board))
}

/// Rejects references to users that do not exist before they reach a
/// foreign-key constraint.
pub(crate) async fn ensure_user_exists(pool: &SqlitePool, id: i64) -> Result<(), AppError> {
    match UserRepo::new(pool).find_by_id(id).await? {
        Some(_) => Ok(()),
        None => Err(AppError::BadRequest(format!("User {} does not exist", id))),
    }
}
