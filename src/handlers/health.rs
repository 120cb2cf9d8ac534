use axum::{extract::State, response::Json};
use serde_json::{json, Value};

use crate::{ApiResponse, AppState};

/// Service status: version and environment, no dependency checks
#[utoipa::path(
    get,
    path = "/api/status",
    tag = "Health",
    responses((status = 200, description = "Service status", body = ApiResponse<Value>))
)]
pub async fn api_status() -> Json<ApiResponse<Value>> {
    let status_data = json!({
        "status": "ok",
        "service": "washline-api",
        "version": env!("CARGO_PKG_VERSION"),
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "environment": std::env::var("APP_ENVIRONMENT").unwrap_or_else(|_| "development".to_string()),
    });

    Json(ApiResponse::success(status_data))
}

/// Readiness: pings the database
#[utoipa::path(
    get,
    path = "/api/health",
    tag = "Health",
    responses((status = 200, description = "Health check result", body = ApiResponse<Value>))
)]
pub async fn health_check(State(state): State<AppState>) -> Json<ApiResponse<Value>> {
    let db_status = match state.db.ping().await {
        Ok(()) => "healthy",
        Err(_) => "unhealthy",
    };

    let health_data = json!({
        "status": db_status,
        "checks": { "database": db_status },
        "timestamp": chrono::Utc::now().to_rfc3339(),
    });

    Json(ApiResponse::success(health_data))
}
