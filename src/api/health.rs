use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use serde::Serialize;
use serde_json::{json, Value};
use sqlx::PgPool;
use std::time::Instant;

use crate::api::middleware::AppState;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: String,
    pub version: String,
    pub database: ServiceHealth,
}

#[derive(Debug, Serialize)]
pub struct ServiceHealth {
    pub status: String,
    pub response_time_ms: u128,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ServiceHealth {
    fn is_healthy(&self) -> bool {
        self.status == "healthy"
    }
}

async fn root() -> Json<Value> {
    Json(json!({ "message": "Chapter management API is running" }))
}

/// 200 when the database answers, 503 otherwise
pub async fn health_check(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let database = check_database(&state.pool).await;

    let (status_code, status) = if database.is_healthy() {
        (StatusCode::OK, "healthy")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "unhealthy")
    };

    tracing::info!(
        status,
        duration_ms = database.response_time_ms,
        "Health check completed"
    );

    (
        status_code,
        Json(HealthResponse {
            status: status.to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            database,
        }),
    )
}

async fn check_database(pool: &PgPool) -> ServiceHealth {
    let start = Instant::now();

    match sqlx::query("SELECT 1").execute(pool).await {
        Ok(_) => ServiceHealth {
            status: "healthy".to_string(),
            response_time_ms: start.elapsed().as_millis(),
            error: None,
        },
        Err(e) => {
            tracing::error!(error = %e, "Database health check failed");
            ServiceHealth {
                status: "unhealthy".to_string(),
                response_time_ms: start.elapsed().as_millis(),
                error: Some(format!("Database error: {}", e)),
            }
        }
    }
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health_check))
}
