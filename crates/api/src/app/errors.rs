use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use tower::BoxError;
use tracing::error;

use stockroom_core::{ErrorClass, InventoryError};

use crate::app::dto::ErrorResponse;

pub fn json_error(
    status: StatusCode,
    code: &'static str,
    error: &'static str,
    message: impl Into<String>,
) -> axum::response::Response {
    (status, Json(ErrorResponse::new(error, code, message))).into_response()
}

pub fn inventory_error_to_response(err: InventoryError) -> axum::response::Response {
    let status = match err.class() {
        ErrorClass::InvalidRequest => StatusCode::BAD_REQUEST,
        ErrorClass::NotFound => StatusCode::NOT_FOUND,
        ErrorClass::Conflict => StatusCode::CONFLICT,
        ErrorClass::Internal => StatusCode::INTERNAL_SERVER_ERROR,
    };

    let title = match &err {
        InventoryError::InvalidRequest(_) => "Invalid request",
        InventoryError::MissingField(_) => "Missing required field",
        InventoryError::ProductNotFound(_) => "Product not found",
        InventoryError::InsufficientStock { .. } => "Insufficient inventory",
        InventoryError::InsufficientReserved { .. } => "Insufficient reserved inventory",
        InventoryError::ReservationNotFound(_) => "Reservation not found",
        InventoryError::ReservationConflict(_) => "Reservation conflict",
        InventoryError::Internal(_) => "Internal error",
    };

    let mut body = match &err {
        // Storage details stay in the logs.
        InventoryError::Internal(detail) => {
            error!(detail = %detail, "internal failure");
            ErrorResponse::new(title, err.code(), "an internal error occurred")
        }
        other => ErrorResponse::new(title, err.code(), other.to_string()),
    };

    match err {
        InventoryError::InsufficientStock { available, .. } => body.available = Some(available),
        InventoryError::InsufficientReserved { reserved, .. } => body.reserved = Some(reserved),
        _ => {}
    }

    (status, Json(body)).into_response()
}

pub fn json_rejection_to_response(rejection: JsonRejection) -> axum::response::Response {
    json_error(
        StatusCode::BAD_REQUEST,
        "INVALID_REQUEST",
        "Invalid request body",
        format!("The request body is malformed: {}", rejection.body_text()),
    )
}

/// Error handler for the tower middleware stack (timeouts, overload).
pub async fn handle_middleware_error(err: BoxError) -> axum::response::Response {
    if err.is::<tower::timeout::error::Elapsed>() {
        return json_error(
            StatusCode::REQUEST_TIMEOUT,
            "REQUEST_TIMEOUT",
            "Request timed out",
            "the request did not complete in time",
        );
    }
    error!(error = %err, "unhandled middleware error");
    json_error(
        StatusCode::INTERNAL_SERVER_ERROR,
        "INTERNAL_ERROR",
        "Internal error",
        "an internal error occurred",
    )
}
