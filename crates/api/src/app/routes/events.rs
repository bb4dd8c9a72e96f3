//! Event tracking endpoint.
//!
//! Accepts stock updates, audits and movements for downstream analytics. The
//! event is appended to the log before the response is sent; delivery to
//! subscribers is best-effort.

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Extension},
    http::StatusCode,
    response::IntoResponse,
    Json,
};

use stockroom_events::InventoryEvent;

use crate::app::services::AppServices;
use crate::app::{dto, errors};

/// POST /events
pub async fn track_event(
    Extension(services): Extension<Arc<AppServices>>,
    body: Result<Json<InventoryEvent>, JsonRejection>,
) -> axum::response::Response {
    let Json(event) = match body {
        Ok(b) => b,
        Err(rejection) => return errors::json_rejection_to_response(rejection),
    };

    match services.record_event(event) {
        Ok(recorded) => (
            StatusCode::OK,
            Json(dto::InventoryEventResponse {
                success: true,
                event_id: recorded.event_id.to_string(),
                timestamp: recorded.received_at,
                message: "Inventory event tracked successfully",
            }),
        )
            .into_response(),
        Err(e) => errors::inventory_error_to_response(e),
    }
}
