use std::sync::Arc;

use chrono::{DateTime, Utc};
use thiserror::Error;

use stockroom_core::{InventoryError, ProductId, ReservationId};
use stockroom_inventory::Reservation;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RegistryError {
    #[error("reservation not found: {0}")]
    NotFound(ReservationId),

    /// The reservation exists but the requested transition is not allowed.
    #[error(transparent)]
    Rejected(InventoryError),

    #[error("reservation registry unavailable: {0}")]
    Unavailable(String),
}

impl From<RegistryError> for InventoryError {
    fn from(value: RegistryError) -> Self {
        match value {
            RegistryError::NotFound(id) => InventoryError::ReservationNotFound(id),
            RegistryError::Rejected(err) => err,
            RegistryError::Unavailable(msg) => InventoryError::Internal(msg),
        }
    }
}

/// Outcome of trying to claim a reservation id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Claim {
    /// The id was free and now holds the pending reservation.
    Claimed,
    /// The id was already registered; the existing entry is returned untouched.
    Existing(Reservation),
}

/// Storage contract for reservation records.
///
/// Every method is atomic per reservation id. `claim` is the only way to
/// create an entry, so two callers racing on the same id see exactly one
/// `Claim::Claimed`.
pub trait ReservationRegistry: Send + Sync {
    fn claim(&self, reservation: Reservation) -> Result<Claim, RegistryError>;

    /// Mark a pending reservation as holding units on the ledger.
    fn activate(&self, id: &ReservationId, at: DateTime<Utc>) -> Result<(), RegistryError>;

    /// Drop a pending claim whose ledger step failed.
    fn abandon(&self, id: &ReservationId) -> Result<(), RegistryError>;

    /// Take `quantity` off the outstanding hold, returning the updated entry.
    fn begin_release(
        &self,
        id: &ReservationId,
        product_id: &ProductId,
        quantity: u64,
        at: DateTime<Utc>,
    ) -> Result<Reservation, RegistryError>;

    /// Give back `quantity` after a failed ledger release.
    fn restore(&self, id: &ReservationId, quantity: u64, at: DateTime<Utc>) -> Result<(), RegistryError>;

    fn get(&self, id: &ReservationId) -> Result<Option<Reservation>, RegistryError>;
}

impl<S> ReservationRegistry for Arc<S>
where
    S: ReservationRegistry + ?Sized,
{
    fn claim(&self, reservation: Reservation) -> Result<Claim, RegistryError> {
        (**self).claim(reservation)
    }

    fn activate(&self, id: &ReservationId, at: DateTime<Utc>) -> Result<(), RegistryError> {
        (**self).activate(id, at)
    }

    fn abandon(&self, id: &ReservationId) -> Result<(), RegistryError> {
        (**self).abandon(id)
    }

    fn begin_release(
        &self,
        id: &ReservationId,
        product_id: &ProductId,
        quantity: u64,
        at: DateTime<Utc>,
    ) -> Result<Reservation, RegistryError> {
        (**self).begin_release(id, product_id, quantity, at)
    }

    fn restore(&self, id: &ReservationId, quantity: u64, at: DateTime<Utc>) -> Result<(), RegistryError> {
        (**self).restore(id, quantity, at)
    }

    fn get(&self, id: &ReservationId) -> Result<Option<Reservation>, RegistryError> {
        (**self).get(id)
    }
}
