use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use stockroom_core::{InventoryError, InventoryResult, OrderId, ProductId, ReservationId};

/// Lifecycle of a registered reservation.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReservationStatus {
    /// Claimed in the registry; the ledger mutation has not completed yet.
    Pending,
    /// Units are held on the ledger.
    Active,
    /// Every held unit has been returned.
    Released,
}

/// An explicit hold of `quantity` units of one product for one order.
///
/// `remaining` tracks how much of the hold has not been released yet, which is
/// what makes double-release detectable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reservation {
    id: ReservationId,
    product_id: ProductId,
    order_id: Option<OrderId>,
    quantity: u64,
    remaining: u64,
    status: ReservationStatus,
    updated_at: DateTime<Utc>,
}

impl Reservation {
    pub fn pending(
        id: ReservationId,
        product_id: ProductId,
        order_id: Option<OrderId>,
        quantity: u64,
        at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            product_id,
            order_id,
            quantity,
            remaining: quantity,
            status: ReservationStatus::Pending,
            updated_at: at,
        }
    }

    pub fn id(&self) -> &ReservationId {
        &self.id
    }

    pub fn product_id(&self) -> &ProductId {
        &self.product_id
    }

    pub fn order_id(&self) -> Option<&OrderId> {
        self.order_id.as_ref()
    }

    pub fn quantity(&self) -> u64 {
        self.quantity
    }

    pub fn remaining(&self) -> u64 {
        self.remaining
    }

    pub fn status(&self) -> ReservationStatus {
        self.status
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    pub fn activate(&mut self, at: DateTime<Utc>) {
        self.status = ReservationStatus::Active;
        self.updated_at = at;
    }

    /// True when a replayed reserve call describes this same hold.
    pub fn is_replay_of(&self, product_id: &ProductId, quantity: u64) -> bool {
        self.status == ReservationStatus::Active
            && &self.product_id == product_id
            && self.quantity == quantity
    }

    /// Take `quantity` units off the outstanding hold.
    pub fn release(
        &mut self,
        product_id: &ProductId,
        quantity: u64,
        at: DateTime<Utc>,
    ) -> InventoryResult<u64> {
        if &self.product_id != product_id {
            return Err(InventoryError::invalid(format!(
                "reservation {} holds product {}, not {}",
                self.id, self.product_id, product_id
            )));
        }
        if self.status == ReservationStatus::Pending {
            return Err(InventoryError::conflict(format!(
                "reservation {} is still being processed",
                self.id
            )));
        }
        if quantity == 0 || self.remaining < quantity {
            return Err(InventoryError::InsufficientReserved {
                reserved: self.remaining,
                requested: quantity,
            });
        }

        self.remaining -= quantity;
        if self.remaining == 0 {
            self.status = ReservationStatus::Released;
        }
        self.updated_at = at;
        Ok(self.remaining)
    }

    /// Undo a [`release`](Self::release) whose ledger step failed.
    pub fn restore(&mut self, quantity: u64, at: DateTime<Utc>) {
        self.remaining = (self.remaining + quantity).min(self.quantity);
        if self.remaining > 0 {
            self.status = ReservationStatus::Active;
        }
        self.updated_at = at;
    }
}
