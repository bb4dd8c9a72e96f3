use std::sync::Arc;

use chrono::{DateTime, Utc};
use thiserror::Error;

use stockroom_core::{InventoryError, ProductId};
use stockroom_inventory::{Hold, StockLevels, StockRecord};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LedgerError {
    #[error("no stock record for product {0}")]
    NotFound(ProductId),

    #[error("insufficient stock: {available} available, {requested} requested")]
    InsufficientStock { available: u64, requested: u64 },

    #[error("insufficient reserved stock: {reserved} reserved, {requested} requested")]
    InsufficientReserved { reserved: u64, requested: u64 },

    #[error("invalid stock record: {0}")]
    Invalid(String),

    /// The backing store could not serve the request (lock poisoned, connection lost, ...).
    #[error("ledger unavailable: {0}")]
    Unavailable(String),
}

impl From<InventoryError> for LedgerError {
    fn from(value: InventoryError) -> Self {
        match value {
            InventoryError::InsufficientStock { available, requested } => {
                LedgerError::InsufficientStock { available, requested }
            }
            InventoryError::InsufficientReserved { reserved, requested } => {
                LedgerError::InsufficientReserved { reserved, requested }
            }
            InventoryError::ProductNotFound(id) => LedgerError::NotFound(id),
            InventoryError::Internal(msg) => LedgerError::Unavailable(msg),
            other => LedgerError::Invalid(other.to_string()),
        }
    }
}

impl From<LedgerError> for InventoryError {
    fn from(value: LedgerError) -> Self {
        match value {
            LedgerError::NotFound(id) => InventoryError::ProductNotFound(id),
            LedgerError::InsufficientStock { available, requested } => {
                InventoryError::InsufficientStock { available, requested }
            }
            LedgerError::InsufficientReserved { reserved, requested } => {
                InventoryError::InsufficientReserved { reserved, requested }
            }
            LedgerError::Invalid(msg) => InventoryError::InvalidRequest(msg),
            LedgerError::Unavailable(msg) => InventoryError::Internal(msg),
        }
    }
}

/// Injectable storage contract for stock records.
///
/// `at` is supplied by the caller so that timestamping happens outside the
/// critical section.
///
/// ## Atomicity
///
/// `reserve` and `release` are read-modify-write transactions on one product:
/// either both counters move by `quantity`, or the record is left exactly as
/// it was and an error is returned. No reader may observe a half-applied move.
///
/// ## Holds
///
/// Units reserved with [`Hold::Tracked`] belong to registry reservations and
/// can only be released with [`Hold::Tracked`]. An untracked release draws
/// from `reserved - tracked` and fails with `InsufficientReserved` reporting
/// that pool when it is too small.
pub trait StockLedger: Send + Sync {
    /// Owned snapshot of one record, or `None` when the product is unknown.
    fn get(&self, product_id: &ProductId) -> Result<Option<StockRecord>, LedgerError>;

    /// Move `quantity` units from available to reserved.
    fn reserve(
        &self,
        product_id: &ProductId,
        quantity: u64,
        hold: Hold,
        at: DateTime<Utc>,
    ) -> Result<StockLevels, LedgerError>;

    /// Move `quantity` units from reserved back to available.
    fn release(
        &self,
        product_id: &ProductId,
        quantity: u64,
        hold: Hold,
        at: DateTime<Utc>,
    ) -> Result<StockLevels, LedgerError>;

    /// Insert or replace a record (seeding, restocking from an external system).
    fn upsert(&self, record: StockRecord) -> Result<(), LedgerError>;

    /// Snapshot of every record, ordered by product id.
    fn list(&self) -> Result<Vec<StockRecord>, LedgerError>;
}

impl<S> StockLedger for Arc<S>
where
    S: StockLedger + ?Sized,
{
    fn get(&self, product_id: &ProductId) -> Result<Option<StockRecord>, LedgerError> {
        (**self).get(product_id)
    }

    fn reserve(
        &self,
        product_id: &ProductId,
        quantity: u64,
        hold: Hold,
        at: DateTime<Utc>,
    ) -> Result<StockLevels, LedgerError> {
        (**self).reserve(product_id, quantity, hold, at)
    }

    fn release(
        &self,
        product_id: &ProductId,
        quantity: u64,
        hold: Hold,
        at: DateTime<Utc>,
    ) -> Result<StockLevels, LedgerError> {
        (**self).release(product_id, quantity, hold, at)
    }

    fn upsert(&self, record: StockRecord) -> Result<(), LedgerError> {
        (**self).upsert(record)
    }

    fn list(&self) -> Result<Vec<StockRecord>, LedgerError> {
        (**self).list()
    }
}
