//! Health check handler

use axum::Json;
use chrono::Utc;

use super::super::types::HealthResponse;

/// Build hash baked in by the build script
pub const GIT_HASH: &str = env!("GIT_HASH");

/// GET /health
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: GIT_HASH.to_string(),
        timestamp: Utc::now(),
    })
}
