use actix_web::{delete, get, patch, post, web, HttpResponse};
use serde::Serialize;
use sqlx::SqlitePool;
use validator::Validate;

use crate::{
    access::AccessContext,
    auth::AuthenticatedUser,
    error::{unique_violation, AppError},
    models::{
        AddMemberInput, Board, Label, MemberWithUser, Project, ProjectInput, ProjectMember,
        ProjectUpdate,
    },
    repositories::{BoardRepo, LabelRepo, ProjectRepo},
    response,
};

use super::ensure_user_exists;

const DUPLICATE_KEY: &str = "Project key already exists";

#[derive(Debug, Serialize)]
pub struct ProjectDetails {
    pub project: Project,
    pub members: Vec<MemberWithUser>,
    pub boards: Vec<Board>,
    pub labels: Vec<Label>,
}

#[derive(Debug, Serialize)]
pub struct CreatedProject {
    #[serde(flatten)]
    pub project: Project,
    pub default_board: Board,
}

/// Projects the caller is a member of.
#[get("/projects")]
pub async fn list_projects(
    pool: web::Data<SqlitePool>,
    user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    let projects = ProjectRepo::new(&pool).find_by_user_id(user.id()).await?;
    Ok(response::success(projects, "Success"))
}

/// Creates a project owned by the caller.
///
/// The key is stored upper-cased. The caller becomes the project's admin and
/// the project starts with a default board.
///
/// ## Responses:
/// - `201 Created`: the project plus its `default_board`.
/// - `400 Bad Request`: invalid input or key already taken.
#[post("/projects")]
pub async fn create_project(
    pool: web::Data<SqlitePool>,
    user: AuthenticatedUser,
    body: web::Json<ProjectInput>,
) -> Result<HttpResponse, AppError> {
    body.validate()?;

    let repo = ProjectRepo::new(&pool);
    let key = body.key.to_uppercase();
    if repo.find_by_key(&key).await?.is_some() {
        return Err(AppError::BadRequest(DUPLICATE_KEY.into()));
    }

    let (project, default_board) = repo
        .create(&body.name, &key, body.description.as_deref(), user.id())
        .await
        .map_err(unique_violation(DUPLICATE_KEY))?;
    log::info!("Project {} ({}) created by user {}", project.id, project.key, user.id());

    Ok(response::created(
        CreatedProject {
            project,
            default_board,
        },
        "Project created",
    ))
}

#[get("/projects/{id}")]
pub async fn get_project(
    pool: web::Data<SqlitePool>,
    user: AuthenticatedUser,
    path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    let project_id = path.into_inner();
    AccessContext::new(&pool, user.id())
        .require_member(project_id)
        .await?;

    let repo = ProjectRepo::new(&pool);
    let project = repo
        .find_by_id(project_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Project not found".into()))?;

    let details = ProjectDetails {
        members: repo.members(project_id).await?,
        boards: BoardRepo::new(&pool).find_by_project_id(project_id).await?,
        labels: LabelRepo::new(&pool).find_by_project_id(project_id).await?,
        project,
    };
    Ok(response::success(details, "Success"))
}

#[patch("/projects/{id}")]
pub async fn update_project(
    pool: web::Data<SqlitePool>,
    user: AuthenticatedUser,
    path: web::Path<i64>,
    body: web::Json<ProjectUpdate>,
) -> Result<HttpResponse, AppError> {
    let project_id = path.into_inner();
    AccessContext::new(&pool, user.id())
        .require_admin(project_id)
        .await?;
    body.validate()?;

    let project = ProjectRepo::new(&pool)
        .update(project_id, &body)
        .await?
        .ok_or_else(|| AppError::NotFound("Project not found".into()))?;
    Ok(response::success(project, "Project updated"))
}

/// Deletes the project with its boards, tasks and labels.
#[delete("/projects/{id}")]
pub async fn delete_project(
    pool: web::Data<SqlitePool>,
    user: AuthenticatedUser,
    path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    let project_id = path.into_inner();
    AccessContext::new(&pool, user.id())
        .require_admin(project_id)
        .await?;

    if ProjectRepo::new(&pool).delete(project_id).await? == 0 {
        return Err(AppError::NotFound("Project not found".into()));
    }
    log::info!("Project {} deleted by user {}", project_id, user.id());
    Ok(response::message("Project deleted"))
}

/// Adds a user to the project, or changes the role of an existing member.
#[post("/projects/{id}/members")]
pub async fn add_member(
    pool: web::Data<SqlitePool>,
    user: AuthenticatedUser,
    path: web::Path<i64>,
    body: web::Json<AddMemberInput>,
) -> Result<HttpResponse, AppError> {
    let project_id = path.into_inner();
    AccessContext::new(&pool, user.id())
        .require_admin(project_id)
        .await?;
    ensure_user_exists(&pool, body.user_id).await?;

    ProjectRepo::new(&pool)
        .add_member(project_id, body.user_id, body.role)
        .await?;

    Ok(response::created(
        ProjectMember {
            project_id,
            user_id: body.user_id,
            role: body.role,
        },
        "Member added",
    ))
}

/// The owner cannot be removed.
#[delete("/projects/{id}/members/{user_id}")]
pub async fn remove_member(
    pool: web::Data<SqlitePool>,
    user: AuthenticatedUser,
    path: web::Path<(i64, i64)>,
) -> Result<HttpResponse, AppError> {
    let (project_id, member_id) = path.into_inner();
    AccessContext::new(&pool, user.id())
        .require_admin(project_id)
        .await?;

    let repo = ProjectRepo::new(&pool);
    let project = repo
        .find_by_id(project_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Project not found".into()))?;
    if project.owner_id == member_id {
        return Err(AppError::BadRequest("Cannot remove the project owner".into()));
    }

    if repo.remove_member(project_id, member_id).await? == 0 {
        return Err(AppError::NotFound("Member not found".into()));
    }
    Ok(response::message("Member removed"))
}
