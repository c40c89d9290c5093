use actix_web::{web, HttpResponse};
use serde::Deserialize;
use shared_types::validation::{validate_description, validate_title};
use shared_types::{CreateTaskRequest, TaskListResponse, UpdateTaskRequest};
use std::sync::Arc;
use uuid::Uuid;

use crate::database::tasks::{self as db, TaskQuery};
use crate::database::{projects as projects_db, Database};
use crate::handlers::ApiError;
use crate::helpers::auth::AuthenticatedUser;

const TASK_NOT_FOUND: &str = "Task not found";
const MAX_PAGE_SIZE: i64 = 500;

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    completed: Option<bool>,
    #[serde(default)]
    offset: i64,
    #[serde(default = "default_limit")]
    limit: i64,
}

fn default_limit() -> i64 {
    50
}

/// A task may only point at one of its owner's projects
async fn ensure_project_owned(
    db: &Database,
    user_id: Uuid,
    project_id: Option<Uuid>,
) -> Result<(), ApiError> {
    if let Some(project_id) = project_id {
        if projects_db::get_project(db.async_connection.clone(), user_id, project_id)
            .await?
            .is_none()
        {
            return Err(ApiError::Validation("Project does not exist".to_string()));
        }
    }
    Ok(())
}

pub async fn list_tasks(
    db: web::Data<Arc<Database>>,
    user: AuthenticatedUser,
    path: web::Path<Uuid>,
    query: web::Query<ListQuery>,
) -> Result<HttpResponse, ApiError> {
    let user_id = path.into_inner();
    user.ensure_owns(user_id, TASK_NOT_FOUND)?;

    let query = TaskQuery {
        completed: query.completed,
        offset: query.offset.max(0),
        limit: query.limit.clamp(1, MAX_PAGE_SIZE),
    };

    let (tasks, total) = db::list_tasks(db.async_connection.clone(), user_id, query).await?;

    Ok(HttpResponse::Ok().json(TaskListResponse {
        tasks,
        total,
        offset: query.offset,
        limit: query.limit,
    }))
}

pub async fn create_task(
    db: web::Data<Arc<Database>>,
    user: AuthenticatedUser,
    path: web::Path<Uuid>,
    request: web::Json<CreateTaskRequest>,
) -> Result<HttpResponse, ApiError> {
    let user_id = path.into_inner();
    user.ensure_owns(user_id, "User not found")?;

    let req = request.into_inner();
    validate_title(&req.title)?;
    validate_description(req.description.as_deref())?;
    ensure_project_owned(&db, user_id, req.project_id).await?;

    let task = db::insert_task(db.async_connection.clone(), user_id, &req).await?;

    Ok(HttpResponse::Created().json(task))
}

pub async fn get_task(
    db: web::Data<Arc<Database>>,
    user: AuthenticatedUser,
    path: web::Path<(Uuid, i64)>,
) -> Result<HttpResponse, ApiError> {
    let (user_id, task_id) = path.into_inner();
    user.ensure_owns(user_id, TASK_NOT_FOUND)?;

    let task = db::get_task(db.async_connection.clone(), user_id, task_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(TASK_NOT_FOUND.to_string()))?;

    Ok(HttpResponse::Ok().json(task))
}

/// Serves both PUT and PATCH; only the fields present are changed
pub async fn update_task(
    db: web::Data<Arc<Database>>,
    user: AuthenticatedUser,
    path: web::Path<(Uuid, i64)>,
    request: web::Json<UpdateTaskRequest>,
) -> Result<HttpResponse, ApiError> {
    let (user_id, task_id) = path.into_inner();
    user.ensure_owns(user_id, TASK_NOT_FOUND)?;

    let req = request.into_inner();
    if let Some(title) = &req.title {
        validate_title(title)?;
    }
    validate_description(req.description.as_deref())?;
    ensure_project_owned(&db, user_id, req.project_id).await?;

    let task = db::update_task(db.async_connection.clone(), user_id, task_id, &req)
        .await?
        .ok_or_else(|| ApiError::NotFound(TASK_NOT_FOUND.to_string()))?;

    Ok(HttpResponse::Ok().json(task))
}

pub async fn toggle_task(
    db: web::Data<Arc<Database>>,
    user: AuthenticatedUser,
    path: web::Path<(Uuid, i64)>,
) -> Result<HttpResponse, ApiError> {
    let (user_id, task_id) = path.into_inner();
    user.ensure_owns(user_id, TASK_NOT_FOUND)?;

    let task = db::toggle_task(db.async_connection.clone(), user_id, task_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(TASK_NOT_FOUND.to_string()))?;

    Ok(HttpResponse::Ok().json(task))
}

pub async fn delete_task(
    db: web::Data<Arc<Database>>,
    user: AuthenticatedUser,
    path: web::Path<(Uuid, i64)>,
) -> Result<HttpResponse, ApiError> {
    let (user_id, task_id) = path.into_inner();
    user.ensure_owns(user_id, TASK_NOT_FOUND)?;

    if !db::delete_task(db.async_connection.clone(), user_id, task_id).await? {
        return Err(ApiError::NotFound(TASK_NOT_FOUND.to_string()));
    }

    Ok(HttpResponse::NoContent().finish())
}

pub async fn get_task_stats(
    db: web::Data<Arc<Database>>,
    user: AuthenticatedUser,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, ApiError> {
    let user_id = path.into_inner();
    user.ensure_owns(user_id, "User not found")?;

    let stats = db::task_stats(db.async_connection.clone(), user_id).await?;

    Ok(HttpResponse::Ok().json(stats))
}

#[cfg(test)]
mod tests {
    use crate::handlers::test_support::{init_app, register};
    use actix_web::http::{header, StatusCode};
    use actix_web::test;
    use serde_json::json;
    use shared_types::{Task, TaskListResponse, TaskStats};

    #[actix_web::test]
    async fn test_create_list_toggle_stats() {
        let app = init_app!();
        let (user_id, bearer) = register!(app, "ada@example.com");

        let req = test::TestRequest::post()
            .uri(&format!("/api/{user_id}/tasks"))
            .insert_header((header::AUTHORIZATION, bearer.clone()))
            .set_json(json!({ "title": "Water plants", "due_date": "2026-05-01T09:00:00Z" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CREATED);
        let task: Task = test::read_body_json(resp).await;
        assert!(!task.completed);
        assert_eq!(task.user_id, user_id);

        let req = test::TestRequest::patch()
            .uri(&format!("/api/{user_id}/tasks/{}/toggle", task.id))
            .insert_header((header::AUTHORIZATION, bearer.clone()))
            .to_request();
        let toggled: Task = test::call_and_read_body_json(&app, req).await;
        assert!(toggled.completed);

        let req = test::TestRequest::get()
            .uri(&format!("/api/{user_id}/tasks?completed=true"))
            .insert_header((header::AUTHORIZATION, bearer.clone()))
            .to_request();
        let list: TaskListResponse = test::call_and_read_body_json(&app, req).await;
        assert_eq!(list.total, 1);
        assert_eq!(list.limit, 50);
        assert_eq!(list.tasks[0].id, task.id);

        let req = test::TestRequest::get()
            .uri(&format!("/api/{user_id}/tasks/stats"))
            .insert_header((header::AUTHORIZATION, bearer))
            .to_request();
        let stats: TaskStats = test::call_and_read_body_json(&app, req).await;
        assert_eq!(stats.completion_rate, 100);
    }

    #[actix_web::test]
    async fn test_validation_errors() {
        let app = init_app!();
        let (user_id, bearer) = register!(app, "ada@example.com");

        let req = test::TestRequest::post()
            .uri(&format!("/api/{user_id}/tasks"))
            .insert_header((header::AUTHORIZATION, bearer.clone()))
            .set_json(json!({ "title": "   " }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let req = test::TestRequest::post()
            .uri(&format!("/api/{user_id}/tasks"))
            .insert_header((header::AUTHORIZATION, bearer))
            .set_json(json!({ "title": "ok", "project_id": uuid::Uuid::new_v4() }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn test_other_users_path_is_not_found() {
        let app = init_app!();
        let (ada, ada_bearer) = register!(app, "ada@example.com");
        let (_, eve_bearer) = register!(app, "eve@example.com");

        let req = test::TestRequest::get()
            .uri(&format!("/api/{ada}/tasks"))
            .insert_header((header::AUTHORIZATION, eve_bearer))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);

        let req = test::TestRequest::get()
            .uri(&format!("/api/{ada}/tasks"))
            .insert_header((header::AUTHORIZATION, ada_bearer))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
    }

    #[actix_web::test]
    async fn test_update_then_delete() {
        let app = init_app!();
        let (user_id, bearer) = register!(app, "ada@example.com");

        let req = test::TestRequest::post()
            .uri(&format!("/api/{user_id}/tasks"))
            .insert_header((header::AUTHORIZATION, bearer.clone()))
            .set_json(json!({ "title": "Draft" }))
            .to_request();
        let task: Task = test::call_and_read_body_json(&app, req).await;

        let req = test::TestRequest::put()
            .uri(&format!("/api/{user_id}/tasks/{}", task.id))
            .insert_header((header::AUTHORIZATION, bearer.clone()))
            .set_json(json!({ "title": "Final", "description": "Ship it" }))
            .to_request();
        let updated: Task = test::call_and_read_body_json(&app, req).await;
        assert_eq!(updated.title, "Final");
        assert_eq!(updated.description.as_deref(), Some("Ship it"));
        assert!(updated.updated_at >= task.updated_at);

        let req = test::TestRequest::delete()
            .uri(&format!("/api/{user_id}/tasks/{}", task.id))
            .insert_header((header::AUTHORIZATION, bearer.clone()))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NO_CONTENT);

        let req = test::TestRequest::get()
            .uri(&format!("/api/{user_id}/tasks/{}", task.id))
            .insert_header((header::AUTHORIZATION, bearer))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }
}
