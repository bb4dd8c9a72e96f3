use serde::{Deserialize, Serialize};

use stockroom_core::{InventoryError, InventoryResult, OrderId, ProductId, ReservationId};

/// Command: ReserveStock.
///
/// `quantity` is signed so that zero and negative requests can be rejected as
/// invalid input rather than failing to parse.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReserveStock {
    pub product_id: ProductId,
    pub quantity: i64,
    pub order_id: Option<OrderId>,
    pub reservation_id: Option<ReservationId>,
}

/// Command: ReleaseStock.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReleaseStock {
    pub product_id: ProductId,
    pub quantity: i64,
    pub reservation_id: Option<ReservationId>,
}

impl ReserveStock {
    /// Client-supplied reservation id, ignoring blank values.
    pub fn requested_reservation_id(&self) -> Option<&ReservationId> {
        self.reservation_id.as_ref().filter(|id| !id.is_blank())
    }
}

impl ReleaseStock {
    pub fn requested_reservation_id(&self) -> Option<&ReservationId> {
        self.reservation_id.as_ref().filter(|id| !id.is_blank())
    }
}

/// Validate a requested quantity (`>= 1`) and narrow it to an unsigned count.
pub fn validate_quantity(quantity: i64) -> InventoryResult<u64> {
    if quantity < 1 {
        return Err(InventoryError::invalid(format!(
            "quantity must be at least 1, got {quantity}"
        )));
    }
    Ok(quantity as u64)
}
