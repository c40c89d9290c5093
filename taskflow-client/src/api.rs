use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;
use shared_types::{
    CreateProjectRequest, CreateTaskRequest, ErrorResponse, ForgotPasswordRequest, HealthResponse,
    LoginRequest, LoginResponse, MessageResponse, Project, ProjectProgress, RegisterRequest,
    RegisterResponse, ResetPasswordRequest, Task, TaskListResponse, TaskStats,
    UpdateProjectRequest, UpdateTaskRequest,
};
use uuid::Uuid;

use crate::error::{ClientError, Result};
use crate::session::Session;

/// Largest page the server hands out
const PAGE_SIZE: i64 = 500;

#[derive(Debug, Clone, Default, Serialize)]
pub struct TaskQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offset: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<i64>,
}

/// Typed wrapper over the TaskFlow REST API
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let http = Client::builder()
            .user_agent(concat!("taskflow/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn user_url(&self, session: &Session, path: &str) -> String {
        self.url(&format!("/api/{}{}", session.user_id(), path))
    }

    async fn error_from(response: Response) -> ClientError {
        let status = response.status();
        let message = match response.json::<ErrorResponse>().await {
            Ok(body) => body.error,
            Err(_) => status
                .canonical_reason()
                .unwrap_or("Request failed")
                .to_string(),
        };
        ClientError::Api {
            status: status.as_u16(),
            message,
        }
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T> {
        let response = request.send().await?;
        if !response.status().is_success() {
            return Err(Self::error_from(response).await);
        }
        Ok(response.json().await?)
    }

    async fn send_empty(&self, request: RequestBuilder) -> Result<()> {
        let response = request.send().await?;
        if !response.status().is_success() {
            return Err(Self::error_from(response).await);
        }
        Ok(())
    }

    pub async fn health(&self) -> Result<HealthResponse> {
        self.send(self.http.get(self.url("/api/health"))).await
    }

    // Auth

    pub async fn register(&self, request: &RegisterRequest) -> Result<RegisterResponse> {
        self.send(self.http.post(self.url("/api/auth/register")).json(request))
            .await
    }

    pub async fn login(&self, request: &LoginRequest) -> Result<LoginResponse> {
        self.send(self.http.post(self.url("/api/auth/login")).json(request))
            .await
    }

    pub async fn logout(&self, session: &Session) -> Result<MessageResponse> {
        self.send(
            self.http
                .post(self.url("/api/auth/logout"))
                .bearer_auth(&session.access_token),
        )
        .await
    }

    pub async fn me(&self, session: &Session) -> Result<RegisterResponse> {
        self.send(
            self.http
                .get(self.url("/api/auth/me"))
                .bearer_auth(&session.access_token),
        )
        .await
    }

    pub async fn forgot_password(&self, email: &str) -> Result<MessageResponse> {
        let request = ForgotPasswordRequest {
            email: email.to_string(),
        };
        self.send(
            self.http
                .post(self.url("/api/auth/forgot-password"))
                .json(&request),
        )
        .await
    }

    pub async fn reset_password(&self, request: &ResetPasswordRequest) -> Result<MessageResponse> {
        self.send(
            self.http
                .post(self.url("/api/auth/reset-password"))
                .json(request),
        )
        .await
    }

    // Tasks

    pub async fn get_tasks(&self, session: &Session, query: &TaskQuery) -> Result<TaskListResponse> {
        self.send(
            self.http
                .get(self.user_url(session, "/tasks"))
                .bearer_auth(&session.access_token)
                .query(query),
        )
        .await
    }

    /// Walk every page of the task list
    pub async fn get_all_tasks(&self, session: &Session) -> Result<Vec<Task>> {
        let mut tasks = Vec::new();
        loop {
            let query = TaskQuery {
                completed: None,
                offset: Some(tasks.len() as i64),
                limit: Some(PAGE_SIZE),
            };
            let page = self.get_tasks(session, &query).await?;
            let fetched = page.tasks.len();
            tasks.extend(page.tasks);

            if fetched == 0 || tasks.len() as i64 >= page.total {
                break;
            }
        }
        Ok(tasks)
    }

    pub async fn get_task(&self, session: &Session, task_id: i64) -> Result<Task> {
        self.send(
            self.http
                .get(self.user_url(session, &format!("/tasks/{task_id}")))
                .bearer_auth(&session.access_token),
        )
        .await
    }

    pub async fn create_task(&self, session: &Session, request: &CreateTaskRequest) -> Result<Task> {
        self.send(
            self.http
                .post(self.user_url(session, "/tasks"))
                .bearer_auth(&session.access_token)
                .json(request),
        )
        .await
    }

    pub async fn update_task(
        &self,
        session: &Session,
        task_id: i64,
        request: &UpdateTaskRequest,
    ) -> Result<Task> {
        self.send(
            self.http
                .put(self.user_url(session, &format!("/tasks/{task_id}")))
                .bearer_auth(&session.access_token)
                .json(request),
        )
        .await
    }

    pub async fn toggle_task(&self, session: &Session, task_id: i64) -> Result<Task> {
        self.send(
            self.http
                .patch(self.user_url(session, &format!("/tasks/{task_id}/toggle")))
                .bearer_auth(&session.access_token),
        )
        .await
    }

    pub async fn delete_task(&self, session: &Session, task_id: i64) -> Result<()> {
        self.send_empty(
            self.http
                .delete(self.user_url(session, &format!("/tasks/{task_id}")))
                .bearer_auth(&session.access_token),
        )
        .await
    }

    pub async fn get_user_task_stats(&self, session: &Session) -> Result<TaskStats> {
        self.send(
            self.http
                .get(self.user_url(session, "/tasks/stats"))
                .bearer_auth(&session.access_token),
        )
        .await
    }

    // Projects

    pub async fn get_projects(&self, session: &Session) -> Result<Vec<Project>> {
        self.send(
            self.http
                .get(self.user_url(session, "/projects"))
                .bearer_auth(&session.access_token),
        )
        .await
    }

    pub async fn get_project(&self, session: &Session, project_id: Uuid) -> Result<Project> {
        self.send(
            self.http
                .get(self.user_url(session, &format!("/projects/{project_id}")))
                .bearer_auth(&session.access_token),
        )
        .await
    }

    pub async fn create_project(
        &self,
        session: &Session,
        request: &CreateProjectRequest,
    ) -> Result<Project> {
        self.send(
            self.http
                .post(self.user_url(session, "/projects"))
                .bearer_auth(&session.access_token)
                .json(request),
        )
        .await
    }

    pub async fn update_project(
        &self,
        session: &Session,
        project_id: Uuid,
        request: &UpdateProjectRequest,
    ) -> Result<Project> {
        self.send(
            self.http
                .put(self.user_url(session, &format!("/projects/{project_id}")))
                .bearer_auth(&session.access_token)
                .json(request),
        )
        .await
    }

    pub async fn delete_project(&self, session: &Session, project_id: Uuid) -> Result<MessageResponse> {
        self.send(
            self.http
                .delete(self.user_url(session, &format!("/projects/{project_id}")))
                .bearer_auth(&session.access_token),
        )
        .await
    }

    pub async fn get_project_tasks(&self, session: &Session, project_id: Uuid) -> Result<Vec<Task>> {
        self.send(
            self.http
                .get(self.user_url(session, &format!("/projects/{project_id}/tasks")))
                .bearer_auth(&session.access_token),
        )
        .await
    }

    pub async fn get_project_progress(
        &self,
        session: &Session,
        project_id: Uuid,
    ) -> Result<ProjectProgress> {
        self.send(
            self.http
                .get(self.user_url(session, &format!("/projects/{project_id}/progress")))
                .bearer_auth(&session.access_token),
        )
        .await
    }
}


#[cfg(test)]
mod tests {
    use super::test_support::*;
    use super::*;
    use mockito::Matcher;
    use serde_json::json;

    #[tokio::test]
    async fn test_login_decodes_response() {
        let mut server = mockito::Server::new_async().await;
        let user = session().user;
        let mock = server
            .mock("POST", "/api/auth/login")
            .match_body(Matcher::Json(json!({
                "email": "ada@example.com",
                "password": "password123"
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                json!({
                    "access_token": "abc",
                    "token_type": "bearer",
                    "user": &user,
                })
                .to_string(),
            )
            .create_async()
            .await;

        let client = ApiClient::new(server.url()).unwrap();
        let response = client
            .login(&LoginRequest {
                email: "ada@example.com".to_string(),
                password: "password123".to_string(),
            })
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(response.access_token, "abc");
        assert_eq!(response.user.id, user.id);
    }

    #[tokio::test]
    async fn test_bearer_token_is_attached() {
        let mut server = mockito::Server::new_async().await;
        let session = session();
        let mock = server
            .mock("GET", format!("/api/{}/tasks/stats", session.user_id()).as_str())
            .match_header("authorization", "Bearer test-token")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"total":4,"completed":1,"pending":3,"completion_rate":25}"#)
            .create_async()
            .await;

        let client = ApiClient::new(format!("{}/", server.url())).unwrap();
        let stats = client.get_user_task_stats(&session).await.unwrap();

        mock.assert_async().await;
        assert_eq!(stats.completion_rate, 25);
    }

    #[tokio::test]
    async fn test_error_body_becomes_api_error() {
        let mut server = mockito::Server::new_async().await;
        let session = session();
        server
            .mock("GET", format!("/api/{}/tasks/9", session.user_id()).as_str())
            .with_status(404)
            .with_header("content-type", "application/json")
            .with_body(r#"{"error":"Task not found"}"#)
            .create_async()
            .await;

        let client = ApiClient::new(server.url()).unwrap();
        let err = client.get_task(&session, 9).await.unwrap_err();

        match err {
            ClientError::Api { status, message } => {
                assert_eq!(status, 404);
                assert_eq!(message, "Task not found");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_non_json_error_uses_reason_phrase() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/api/health")
            .with_status(502)
            .with_body("upstream down")
            .create_async()
            .await;

        let client = ApiClient::new(server.url()).unwrap();
        let err = client.health().await.unwrap_err();

        assert_eq!(err.to_string(), "Bad Gateway");
    }

    #[tokio::test]
    async fn test_get_all_tasks_walks_pages() {
        let mut server = mockito::Server::new_async().await;
        let session = session();
        let path = format!("/api/{}/tasks", session.user_id());

        let first: Vec<_> = (1..=PAGE_SIZE).map(|id| task_json(id, "t", false, None)).collect();
        server
            .mock("GET", path.as_str())
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("offset".into(), "0".into()),
                Matcher::UrlEncoded("limit".into(), PAGE_SIZE.to_string()),
            ]))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                json!({ "tasks": first, "total": PAGE_SIZE + 1, "offset": 0, "limit": PAGE_SIZE })
                    .to_string(),
            )
            .create_async()
            .await;
        server
            .mock("GET", path.as_str())
            .match_query(Matcher::UrlEncoded("offset".into(), PAGE_SIZE.to_string()))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                json!({
                    "tasks": [task_json(PAGE_SIZE + 1, "last", true, None)],
                    "total": PAGE_SIZE + 1,
                    "offset": PAGE_SIZE,
                    "limit": PAGE_SIZE,
                })
                .to_string(),
            )
            .create_async()
            .await;

        let client = ApiClient::new(server.url()).unwrap();
        let tasks = client.get_all_tasks(&session).await.unwrap();

        assert_eq!(tasks.len() as i64, PAGE_SIZE + 1);
        assert_eq!(tasks.last().unwrap().title, "last");
    }

    #[tokio::test]
    async fn test_delete_task_accepts_no_content() {
        let mut server = mockito::Server::new_async().await;
        let session = session();
        let mock = server
            .mock("DELETE", format!("/api/{}/tasks/3", session.user_id()).as_str())
            .with_status(204)
            .create_async()
            .await;

        let client = ApiClient::new(server.url()).unwrap();
        client.delete_task(&session, 3).await.unwrap();

        mock.assert_async().await;
    }
}
