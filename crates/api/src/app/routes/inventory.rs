use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};

use stockroom_core::{ProductId, ReservationId};

use crate::app::services::AppServices;
use crate::app::{dto, errors};

pub fn router() -> Router {
    Router::new()
        .route("/reserve", post(reserve_inventory))
        .route("/release", post(release_inventory))
        .route("/reservations/:reservation_id", get(get_reservation))
        .route("/:product_id", get(get_inventory))
}

pub async fn get_inventory(
    Extension(services): Extension<Arc<AppServices>>,
    Path(product_id): Path<String>,
) -> axum::response::Response {
    match services.get_inventory(&ProductId::new(product_id)) {
        Ok(record) => (StatusCode::OK, Json(dto::StockRecordView::from(record))).into_response(),
        Err(e) => errors::inventory_error_to_response(e),
    }
}

pub async fn reserve_inventory(
    Extension(services): Extension<Arc<AppServices>>,
    body: Result<Json<dto::ReserveInventoryRequest>, JsonRejection>,
) -> axum::response::Response {
    let Json(body) = match body {
        Ok(b) => b,
        Err(rejection) => return errors::json_rejection_to_response(rejection),
    };

    let result = body.into_command().and_then(|cmd| services.reserve(cmd));
    match result {
        Ok(outcome) => (StatusCode::OK, Json(dto::InventoryResponse::from(outcome))).into_response(),
        Err(e) => errors::inventory_error_to_response(e),
    }
}

pub async fn release_inventory(
    Extension(services): Extension<Arc<AppServices>>,
    body: Result<Json<dto::ReleaseInventoryRequest>, JsonRejection>,
) -> axum::response::Response {
    let Json(body) = match body {
        Ok(b) => b,
        Err(rejection) => return errors::json_rejection_to_response(rejection),
    };

    let result = body.into_command().and_then(|cmd| services.release(cmd));
    match result {
        Ok(outcome) => (StatusCode::OK, Json(dto::InventoryResponse::from(outcome))).into_response(),
        Err(e) => errors::inventory_error_to_response(e),
    }
}

pub async fn get_reservation(
    Extension(services): Extension<Arc<AppServices>>,
    Path(reservation_id): Path<String>,
) -> axum::response::Response {
    match services.get_reservation(&ReservationId::new(reservation_id)) {
        Ok(r) => (StatusCode::OK, Json(dto::ReservationView::from(r))).into_response(),
        Err(e) => errors::inventory_error_to_response(e),
    }
}
