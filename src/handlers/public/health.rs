// handlers/public/health.rs - GET /health handler

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::json;

use crate::state::AppState;

/// GET /health - Liveness plus a storage ping; 503 when storage is unreachable
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let now = chrono::Utc::now();

    match state.drinks.health_check().await {
        Ok(_) => (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "status": "ok",
                "timestamp": now,
                "database": "ok"
            })),
        ),
        Err(e) => {
            tracing::warn!("Health check failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "success": false,
                    "status": "degraded",
                    "timestamp": now,
                    "database": "unavailable"
                })),
            )
        }
    }
}
