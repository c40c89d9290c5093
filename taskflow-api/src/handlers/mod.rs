pub mod auth;
pub mod health;
pub mod projects;
pub mod tasks;

use actix_web::http::{header, StatusCode};
use actix_web::{web, HttpResponse, ResponseError};
use shared_types::{ErrorResponse, ValidationError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    Unauthorized(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Conflict(String),
    #[error("{0}")]
    Internal(String),
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let mut response = HttpResponse::build(self.status_code());
        if let ApiError::Unauthorized(_) = self {
            response.insert_header((header::WWW_AUTHENTICATE, "Bearer"));
        }
        response.json(ErrorResponse::new(self.to_string()))
    }
}

impl From<ValidationError> for ApiError {
    fn from(e: ValidationError) -> Self {
        ApiError::Validation(e.to_string())
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(e: anyhow::Error) -> Self {
        tracing::error!("Internal error: {:#}", e);
        ApiError::Internal("Internal server error".to_string())
    }
}

/// Register every API route. Shared by the server binary and handler tests.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/", web::get().to(health::hello))
        .route("/api/health", web::get().to(health::health))
        .route("/api/auth/register", web::post().to(auth::register))
        .route("/api/auth/login", web::post().to(auth::login))
        .route("/api/auth/logout", web::post().to(auth::logout))
        .route("/api/auth/me", web::get().to(auth::me))
        .route("/api/auth/forgot-password", web::post().to(auth::forgot_password))
        .route("/api/auth/reset-password", web::post().to(auth::reset_password))
        .route("/api/{user_id}/tasks", web::get().to(tasks::list_tasks))
        .route("/api/{user_id}/tasks", web::post().to(tasks::create_task))
        .route("/api/{user_id}/tasks/stats", web::get().to(tasks::get_task_stats))
        .route("/api/{user_id}/tasks/{task_id}", web::get().to(tasks::get_task))
        .route("/api/{user_id}/tasks/{task_id}", web::put().to(tasks::update_task))
        .route("/api/{user_id}/tasks/{task_id}", web::patch().to(tasks::update_task))
        .route("/api/{user_id}/tasks/{task_id}", web::delete().to(tasks::delete_task))
        .route("/api/{user_id}/tasks/{task_id}/toggle", web::patch().to(tasks::toggle_task))
        .route("/api/{user_id}/projects", web::get().to(projects::list_projects))
        .route("/api/{user_id}/projects", web::post().to(projects::create_project))
        .route("/api/{user_id}/projects/{project_id}", web::get().to(projects::get_project))
        .route("/api/{user_id}/projects/{project_id}", web::put().to(projects::update_project))
        .route("/api/{user_id}/projects/{project_id}", web::delete().to(projects::delete_project))
        .route(
            "/api/{user_id}/projects/{project_id}/tasks",
            web::get().to(projects::list_project_tasks),
        )
        .route(
            "/api/{user_id}/projects/{project_id}/progress",
            web::get().to(projects::get_project_progress),
        );
}
