use axum::{response::IntoResponse, Json};

/// Liveness only; does not touch the stores.
pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}
