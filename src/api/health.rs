use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use serde_json::json;
use tracing::error;

use crate::app_state::AppState;

/// Defines health check routes
pub fn health_routes() -> Router<AppState> {
    Router::new()
        .route("/health/live", get(liveness_check)) // ✅ Liveness check
        .route("/health/ready", get(readiness_check)) // ✅ Readiness check
}

/// **Liveness Check (Basic Check)**
/// - ✅ Verifies that the API is running
/// - ❌ Does NOT touch the store
async fn liveness_check() -> Json<serde_json::Value> {
    Json(json!({ "success": true, "message": "API is live" }))
}

/// **Readiness Check (Store Connectivity Check)**
/// - ✅ Pings the document store
/// - ❌ Returns `503` if the store is unreachable
async fn readiness_check(
    State(state): State<AppState>,
) -> Result<Json<serde_json::Value>, (StatusCode, Json<serde_json::Value>)> {
    state.store.ping().await.map_err(|e| {
        error!("Readiness check failed: {}", e);
        (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({ "success": false, "error": "Store unavailable", "details": e.to_string() })),
        )
    })?;

    Ok(Json(json!({ "success": true, "message": "API is ready" })))
}
