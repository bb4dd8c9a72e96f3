//! Inventory error model.

use thiserror::Error;

use crate::id::{ProductId, ReservationId};

/// Result type used across the reservation service.
pub type InventoryResult<T> = Result<T, InventoryError>;

/// Broad classification of an [`InventoryError`].
///
/// Callers use this to decide whether a failure is their own fault, a business
/// conflict they must resolve, or an internal failure that may be retried.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ErrorClass {
    /// Malformed, missing or non-positive input. Never retried by the server.
    InvalidRequest,
    /// The referenced product or reservation does not exist.
    NotFound,
    /// Business conflict (not enough stock, not enough reserved, duplicate id).
    Conflict,
    /// Storage or runtime failure. The only class eligible for transparent retry.
    Internal,
}

/// Inventory-level error.
///
/// Every failure is a synchronous return value; a failed reserve/release leaves
/// the ledger and the reservation registry exactly as they were.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum InventoryError {
    /// A value failed validation (e.g. non-positive quantity).
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// A required field was absent or empty.
    #[error("missing field: {0}")]
    MissingField(&'static str),

    /// No stock record exists for the product.
    #[error("product not found: {0}")]
    ProductNotFound(ProductId),

    /// Not enough available units to satisfy a reservation.
    #[error("insufficient stock: {available} available, {requested} requested")]
    InsufficientStock { available: u64, requested: u64 },

    /// Not enough reserved units to satisfy a release.
    #[error("insufficient reserved stock: {reserved} reserved, {requested} requested")]
    InsufficientReserved { reserved: u64, requested: u64 },

    /// A release referenced a reservation id that was never registered.
    #[error("reservation not found: {0}")]
    ReservationNotFound(ReservationId),

    /// A reservation id is already in use for a different hold.
    #[error("reservation conflict: {0}")]
    ReservationConflict(String),

    /// Storage or runtime failure. The message is for logs only.
    #[error("internal failure: {0}")]
    Internal(String),
}

impl InventoryError {
    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidRequest(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::ReservationConflict(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    pub fn class(&self) -> ErrorClass {
        match self {
            Self::InvalidRequest(_) | Self::MissingField(_) => ErrorClass::InvalidRequest,
            Self::ProductNotFound(_) | Self::ReservationNotFound(_) => ErrorClass::NotFound,
            Self::InsufficientStock { .. }
            | Self::InsufficientReserved { .. }
            | Self::ReservationConflict(_) => ErrorClass::Conflict,
            Self::Internal(_) => ErrorClass::Internal,
        }
    }

    /// Stable wire code (e.g. `INSUFFICIENT_INVENTORY`).
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidRequest(_) => "INVALID_REQUEST",
            Self::MissingField(_) => "MISSING_FIELD",
            Self::ProductNotFound(_) => "PRODUCT_NOT_FOUND",
            Self::InsufficientStock { .. } => "INSUFFICIENT_INVENTORY",
            Self::InsufficientReserved { .. } => "INSUFFICIENT_RESERVED",
            Self::ReservationNotFound(_) => "RESERVATION_NOT_FOUND",
            Self::ReservationConflict(_) => "RESERVATION_CONFLICT",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    pub fn is_retryable(&self) -> bool {
        self.class() == ErrorClass::Internal
    }
}
