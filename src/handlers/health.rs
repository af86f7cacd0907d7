use axum::Json;
use axum::extract::State;
use axum::response::IntoResponse;
use std::sync::Arc;

use crate::state::AppState;

// health handler
pub async fn health_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let status = if state.db.ping() { "healthy" } else { "degraded" };
    Json(serde_json::json!({
        "status": status,
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}
