use crate::{
    access::AccessContext,
    auth::AuthenticatedUser,
    error::AppError,
    models::{Comment, NewTask, Task, TaskDetails, TaskInput, TaskType, TaskUpdate, TaskWithLabels},
    repositories::{CommentRepo, LabelRepo, TaskRepo},
    response,
};
use actix_web::{delete, get, patch, post, web, HttpResponse};
use serde::Serialize;
use sqlx::SqlitePool;
use validator::Validate;

use super::{ensure_user_exists, find_board, find_task};

/// Everything the task detail view shows.
#[derive(Debug, Serialize)]
pub struct TaskView {
    pub task: TaskWithLabels,
    pub subtasks: Vec<Task>,
    pub comments: Vec<Comment>,
}

/// Retrieves the top-level tasks of a board, in position order.
///
/// ## Responses:
/// - `200 OK`: a JSON array of `Task` objects. Subtasks are not included.
/// - `403 Forbidden`: the caller is not a member of the board's project.
/// - `404 Not Found`: no such board.
#[get("/boards/{board_id}/tasks")]
pub async fn list_tasks(
    pool: web::Data<SqlitePool>,
    user: AuthenticatedUser,
    path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    let board = find_board(&pool, path.into_inner()).await?;
    AccessContext::new(&pool, user.id())
        .require_member(board.project_id)
        .await?;

    let tasks = TaskRepo::new(&pool).find_by_board_id(board.id).await?;
    Ok(response::success(tasks, "Success"))
}

/// Creates a top-level task reported by the caller, placed after the board's
/// existing tasks.
///
/// ## Request Body:
/// - `type`: `issue`, `bugfix` or `story`. Subtasks go through
///   `POST /tasks/{id}/subtasks`.
/// - `title`: 1 to 200 characters.
/// - `description`, `status` (default `todo`), `priority` (default `medium`),
///   `assignee_id`, `deadline` (`YYYY-MM-DD` or RFC 3339): optional.
///
/// ## Responses:
/// - `201 Created`: the new `Task`.
/// - `400 Bad Request`: invalid input or unknown assignee.
/// - `403 Forbidden`: the caller is not a member of the board's project.
/// - `404 Not Found`: no such board.
#[post("/boards/{board_id}/tasks")]
pub async fn create_task(
    pool: web::Data<SqlitePool>,
    user: AuthenticatedUser,
    path: web::Path<i64>,
    task_data: web::Json<TaskInput>,
) -> Result<HttpResponse, AppError> {
    let board = find_board(&pool, path.into_inner()).await?;
    AccessContext::new(&pool, user.id())
        .require_member(board.project_id)
        .await?;
    task_data.validate()?;

    let TaskInput { task_type, details } = task_data.into_inner();
    if task_type == TaskType::Subtask {
        return Err(AppError::BadRequest(
            "Subtasks must be created under a parent task".into(),
        ));
    }
    if let Some(assignee_id) = details.assignee_id {
        ensure_user_exists(&pool, assignee_id).await?;
    }

    let task = TaskRepo::new(&pool)
        .create(&NewTask::new(board.id, task_type, details, user.id()))
        .await?;
    Ok(response::created(task, "Task created"))
}

#[get("/tasks/{id}")]
pub async fn get_task(
    pool: web::Data<SqlitePool>,
    user: AuthenticatedUser,
    path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    let (task, board) = find_task(&pool, path.into_inner()).await?;
    AccessContext::new(&pool, user.id())
        .require_member(board.project_id)
        .await?;

    let repo = TaskRepo::new(&pool);
    let view = TaskView {
        subtasks: repo.subtasks(task.id).await?,
        comments: CommentRepo::new(&pool).find_by_task_id(task.id).await?,
        task: TaskWithLabels {
            labels: LabelRepo::new(&pool).task_labels(task.id).await?,
            task,
        },
    };
    Ok(response::success(view, "Success"))
}

/// Partially updates a task. Any project member may edit any task.
/// `assignee_id` and `deadline` can be cleared with `null`.
#[patch("/tasks/{id}")]
pub async fn update_task(
    pool: web::Data<SqlitePool>,
    user: AuthenticatedUser,
    path: web::Path<i64>,
    task_data: web::Json<TaskUpdate>,
) -> Result<HttpResponse, AppError> {
    let (task, board) = find_task(&pool, path.into_inner()).await?;
    AccessContext::new(&pool, user.id())
        .require_member(board.project_id)
        .await?;
    task_data.validate()?;
    if let Some(Some(assignee_id)) = task_data.assignee_id {
        ensure_user_exists(&pool, assignee_id).await?;
    }

    let task = TaskRepo::new(&pool)
        .update(task.id, &task_data)
        .await?
        .ok_or_else(|| AppError::NotFound("Task not found".into()))?;
    Ok(response::success(task, "Task updated"))
}

/// Only the reporter or a project admin may delete a task. Its subtasks,
/// comments and label links are deleted with it.
#[delete("/tasks/{id}")]
pub async fn delete_task(
    pool: web::Data<SqlitePool>,
    user: AuthenticatedUser,
    path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    let (task, board) = find_task(&pool, path.into_inner()).await?;
    let mut access = AccessContext::new(&pool, user.id());
    access.require_member(board.project_id).await?;

    if task.reporter_id != user.id() && !access.is_admin(board.project_id).await? {
        return Err(AppError::Forbidden(
            "Only the reporter or a project admin can delete this task".into(),
        ));
    }

    TaskRepo::new(&pool).delete(task.id).await?;
    Ok(response::message("Task deleted"))
}

/// Creates a subtask under the task in the path, on the same board. Subtasks
/// are one level deep.
#[post("/tasks/{id}/subtasks")]
pub async fn create_subtask(
    pool: web::Data<SqlitePool>,
    user: AuthenticatedUser,
    path: web::Path<i64>,
    task_data: web::Json<TaskDetails>,
) -> Result<HttpResponse, AppError> {
    let (parent, board) = find_task(&pool, path.into_inner()).await?;
    AccessContext::new(&pool, user.id())
        .require_member(board.project_id)
        .await?;
    task_data.validate()?;

    if parent.parent_id.is_some() {
        return Err(AppError::BadRequest("Subtasks cannot have subtasks".into()));
    }
    if let Some(assignee_id) = task_data.assignee_id {
        ensure_user_exists(&pool, assignee_id).await?;
    }

    let subtask = TaskRepo::new(&pool)
        .create(&NewTask::subtask(&parent, task_data.into_inner(), user.id()))
        .await?;
    Ok(response::created(subtask, "Subtask created"))
}

/// Attaches a label of the task's project. Attaching twice is harmless.
#[post("/tasks/{id}/labels/{label_id}")]
pub async fn add_label(
    pool: web::Data<SqlitePool>,
    user: AuthenticatedUser,
    path: web::Path<(i64, i64)>,
) -> Result<HttpResponse, AppError> {
    let (task_id, label_id) = path.into_inner();
    let (task, board) = find_task(&pool, task_id).await?;
    AccessContext::new(&pool, user.id())
        .require_member(board.project_id)
        .await?;

    let labels = LabelRepo::new(&pool);
    match labels.find_by_id(label_id).await? {
        Some(label) if label.project_id == board.project_id => {}
        _ => return Err(AppError::NotFound("Label not found".into())),
    }
    labels.add_to_task(task.id, label_id).await?;

    let task = TaskRepo::new(&pool)
        .find_with_labels(task.id)
        .await?
        .ok_or_else(|| AppError::NotFound("Task not found".into()))?;
    Ok(response::success(task, "Label added"))
}

#[delete("/tasks/{id}/labels/{label_id}")]
pub async fn remove_label(
    pool: web::Data<SqlitePool>,
    user: AuthenticatedUser,
    path: web::Path<(i64, i64)>,
) -> Result<HttpResponse, AppError> {
    let (task_id, label_id) = path.into_inner();
    let (task, board) = find_task(&pool, task_id).await?;
    AccessContext::new(&pool, user.id())
        .require_member(board.project_id)
        .await?;

    LabelRepo::new(&pool).remove_from_task(task.id, label_id).await?;
    Ok(response::message("Label removed"))
}
