use actix_web::{web, HttpResponse, Responder};
use shared_types::HealthResponse;
use std::sync::Arc;

use crate::database::Database;

pub async fn hello() -> impl Responder {
    HttpResponse::Ok().json(serde_json::json!({
        "message": "TaskFlow API"
    }))
}

pub async fn health(db: web::Data<Arc<Database>>) -> impl Responder {
    // Test database connection
    match db.async_connection.lock().await {
        Ok(_) => HttpResponse::Ok().json(HealthResponse {
            status: "healthy".to_string(),
            database: "connected".to_string(),
        }),
        Err(e) => {
            tracing::error!("Health check failed: {}", e);
            HttpResponse::InternalServerError().json(HealthResponse {
                status: "unhealthy".to_string(),
                database: "disconnected".to_string(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::handlers::test_support::init_app;
    use actix_web::test;

    #[actix_web::test]
    async fn test_health_reports_database() {
        let app = init_app!();

        let req = test::TestRequest::get().uri("/api/health").to_request();
        let body: shared_types::HealthResponse = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body.status, "healthy");
        assert_eq!(body.database, "connected");
    }
}
