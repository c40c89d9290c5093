use actix_web::{web, HttpResponse};
use shared_types::validation::{validate_color, validate_description, validate_project_name};
use shared_types::{CreateProjectRequest, MessageResponse, UpdateProjectRequest};
use std::sync::Arc;
use uuid::Uuid;

use crate::database::projects as db;
use crate::database::{tasks as tasks_db, Database};
use crate::handlers::ApiError;
use crate::helpers::auth::AuthenticatedUser;

const PROJECT_NOT_FOUND: &str = "Project not found";

fn not_found() -> ApiError {
    ApiError::NotFound(PROJECT_NOT_FOUND.to_string())
}

pub async fn list_projects(
    db: web::Data<Arc<Database>>,
    user: AuthenticatedUser,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, ApiError> {
    let user_id = path.into_inner();
    user.ensure_owns(user_id, PROJECT_NOT_FOUND)?;

    let projects = db::list_projects(db.async_connection.clone(), user_id).await?;
    Ok(HttpResponse::Ok().json(projects))
}

pub async fn create_project(
    db: web::Data<Arc<Database>>,
    user: AuthenticatedUser,
    path: web::Path<Uuid>,
    request: web::Json<CreateProjectRequest>,
) -> Result<HttpResponse, ApiError> {
    let user_id = path.into_inner();
    user.ensure_owns(user_id, "User not found")?;

    let req = request.into_inner();
    validate_project_name(&req.name)?;
    validate_description(req.description.as_deref())?;
    if let Some(color) = &req.color {
        validate_color(color)?;
    }

    let project = db::insert_project(db.async_connection.clone(), user_id, &req).await?;
    tracing::info!("Created project {} for user {}", project.id, user_id);

    Ok(HttpResponse::Created().json(project))
}

pub async fn get_project(
    db: web::Data<Arc<Database>>,
    user: AuthenticatedUser,
    path: web::Path<(Uuid, Uuid)>,
) -> Result<HttpResponse, ApiError> {
    let (user_id, project_id) = path.into_inner();
    user.ensure_owns(user_id, PROJECT_NOT_FOUND)?;

    let project = db::get_project(db.async_connection.clone(), user_id, project_id)
        .await?
        .ok_or_else(not_found)?;

    Ok(HttpResponse::Ok().json(project))
}

pub async fn update_project(
    db: web::Data<Arc<Database>>,
    user: AuthenticatedUser,
    path: web::Path<(Uuid, Uuid)>,
    request: web::Json<UpdateProjectRequest>,
) -> Result<HttpResponse, ApiError> {
    let (user_id, project_id) = path.into_inner();
    user.ensure_owns(user_id, PROJECT_NOT_FOUND)?;

    let req = request.into_inner();
    if let Some(name) = &req.name {
        validate_project_name(name)?;
    }
    validate_description(req.description.as_deref())?;
    if let Some(color) = &req.color {
        validate_color(color)?;
    }

    let project = db::update_project(db.async_connection.clone(), user_id, project_id, &req)
        .await?
        .ok_or_else(not_found)?;

    Ok(HttpResponse::Ok().json(project))
}

/// Tasks in the project are kept and detached
pub async fn delete_project(
    db: web::Data<Arc<Database>>,
    user: AuthenticatedUser,
    path: web::Path<(Uuid, Uuid)>,
) -> Result<HttpResponse, ApiError> {
    let (user_id, project_id) = path.into_inner();
    user.ensure_owns(user_id, PROJECT_NOT_FOUND)?;

    if !db::delete_project(db.async_connection.clone(), user_id, project_id).await? {
        return Err(not_found());
    }
    tracing::info!("Deleted project {} for user {}", project_id, user_id);

    Ok(HttpResponse::Ok().json(MessageResponse::new("Project deleted successfully")))
}

pub async fn list_project_tasks(
    db: web::Data<Arc<Database>>,
    user: AuthenticatedUser,
    path: web::Path<(Uuid, Uuid)>,
) -> Result<HttpResponse, ApiError> {
    let (user_id, project_id) = path.into_inner();
    user.ensure_owns(user_id, PROJECT_NOT_FOUND)?;

    db::get_project(db.async_connection.clone(), user_id, project_id)
        .await?
        .ok_or_else(not_found)?;

    let tasks = tasks_db::list_project_tasks(db.async_connection.clone(), project_id).await?;
    Ok(HttpResponse::Ok().json(tasks))
}

pub async fn get_project_progress(
    db: web::Data<Arc<Database>>,
    user: AuthenticatedUser,
    path: web::Path<(Uuid, Uuid)>,
) -> Result<HttpResponse, ApiError> {
    let (user_id, project_id) = path.into_inner();
    user.ensure_owns(user_id, PROJECT_NOT_FOUND)?;

    db::get_project(db.async_connection.clone(), user_id, project_id)
        .await?
        .ok_or_else(not_found)?;

    let progress = db::project_progress(db.async_connection.clone(), project_id).await?;
    Ok(HttpResponse::Ok().json(progress))
}
