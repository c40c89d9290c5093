use serde::{Deserialize, Serialize};
use ts_rs::TS;

pub mod auth;
pub mod project;
pub mod task;
pub mod validation;

pub use auth::{
    ForgotPasswordRequest, LoginRequest, LoginResponse, MessageResponse, RegisterRequest,
    RegisterResponse, ResetPasswordRequest,
};
pub use project::{CreateProjectRequest, Project, ProjectProgress, UpdateProjectRequest};
pub use task::{CreateTaskRequest, Task, TaskListResponse, TaskStats, UpdateTaskRequest};
pub use validation::ValidationError;

/// Error response for API endpoints
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}

/// Health check body
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct HealthResponse {
    pub status: String,
    pub database: String,
}
