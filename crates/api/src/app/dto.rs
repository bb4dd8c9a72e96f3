use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use stockroom_core::{InventoryError, InventoryResult, OrderId, ProductId, ReservationId};
use stockroom_infra::{ReleaseOutcome, ReservationOutcome};
use stockroom_inventory::{
    ReleaseStock, Reservation, ReservationStatus, ReserveStock, StockRecord,
};

// -------------------------
// Request DTOs
// -------------------------

/// Missing fields deserialize to defaults so the engine can report them as
/// `MISSING_FIELD` rather than a generic parse failure.
#[derive(Debug, Deserialize)]
pub struct ReserveInventoryRequest {
    #[serde(default)]
    pub product_id: String,
    #[serde(default)]
    pub quantity: Option<i64>,
    #[serde(default)]
    pub order_id: Option<String>,
    #[serde(default)]
    pub reservation_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ReleaseInventoryRequest {
    #[serde(default)]
    pub product_id: String,
    #[serde(default)]
    pub quantity: Option<i64>,
    #[serde(default)]
    pub reservation_id: Option<String>,
}

impl ReserveInventoryRequest {
    pub fn into_command(self) -> InventoryResult<ReserveStock> {
        Ok(ReserveStock {
            product_id: ProductId::new(self.product_id),
            quantity: self.quantity.ok_or(InventoryError::MissingField("quantity"))?,
            order_id: self
                .order_id
                .filter(|s| !s.trim().is_empty())
                .map(OrderId::new),
            reservation_id: self.reservation_id.map(ReservationId::new),
        })
    }
}

impl ReleaseInventoryRequest {
    pub fn into_command(self) -> InventoryResult<ReleaseStock> {
        Ok(ReleaseStock {
            product_id: ProductId::new(self.product_id),
            quantity: self.quantity.ok_or(InventoryError::MissingField("quantity"))?,
            reservation_id: self.reservation_id.map(ReservationId::new),
        })
    }
}

// -------------------------
// Response DTOs
// -------------------------

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: &'static str,
    pub code: &'static str,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub available: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reserved: Option<u64>,
}

impl ErrorResponse {
    pub fn new(error: &'static str, code: &'static str, message: impl Into<String>) -> Self {
        Self {
            error,
            code,
            message: message.into(),
            available: None,
            reserved: None,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct InventoryResponse {
    pub success: bool,
    pub product_id: ProductId,
    pub available: u64,
    pub reserved: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reservation_id: Option<ReservationId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reservation_remaining: Option<u64>,
    pub message: &'static str,
    pub timestamp: DateTime<Utc>,
}

impl From<ReservationOutcome> for InventoryResponse {
    fn from(outcome: ReservationOutcome) -> Self {
        Self {
            success: true,
            product_id: outcome.product_id,
            available: outcome.levels.available,
            reserved: outcome.levels.reserved,
            reservation_id: Some(outcome.reservation_id),
            reservation_remaining: None,
            message: if outcome.replayed {
                "Reservation already applied"
            } else {
                "Inventory reserved successfully"
            },
            timestamp: Utc::now(),
        }
    }
}

impl From<ReleaseOutcome> for InventoryResponse {
    fn from(outcome: ReleaseOutcome) -> Self {
        Self {
            success: true,
            product_id: outcome.product_id,
            available: outcome.levels.available,
            reserved: outcome.levels.reserved,
            reservation_id: None,
            reservation_remaining: outcome.reservation_remaining,
            message: "Inventory released successfully",
            timestamp: Utc::now(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct StockRecordView {
    pub product_id: ProductId,
    pub available: u64,
    pub reserved: u64,
    pub total: u64,
    pub warehouse_id: String,
    pub reorder_point: u64,
    pub reorder_quantity: u64,
    pub needs_reorder: bool,
    pub last_updated: DateTime<Utc>,
}

impl From<StockRecord> for StockRecordView {
    fn from(r: StockRecord) -> Self {
        Self {
            needs_reorder: r.needs_reorder(),
            available: r.available(),
            reserved: r.reserved(),
            total: r.total(),
            warehouse_id: r.warehouse_id().to_string(),
            reorder_point: r.reorder_point(),
            reorder_quantity: r.reorder_quantity(),
            last_updated: r.last_updated(),
            product_id: r.product_id().clone(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ReservationView {
    pub reservation_id: ReservationId,
    pub product_id: ProductId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_id: Option<OrderId>,
    pub quantity: u64,
    pub remaining: u64,
    pub status: ReservationStatus,
    pub updated_at: DateTime<Utc>,
}

impl From<Reservation> for ReservationView {
    fn from(r: Reservation) -> Self {
        Self {
            reservation_id: r.id().clone(),
            product_id: r.product_id().clone(),
            order_id: r.order_id().cloned(),
            quantity: r.quantity(),
            remaining: r.remaining(),
            status: r.status(),
            updated_at: r.updated_at(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct InventoryEventResponse {
    pub success: bool,
    pub event_id: String,
    pub timestamp: DateTime<Utc>,
    pub message: &'static str,
}
