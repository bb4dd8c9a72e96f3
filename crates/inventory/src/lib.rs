//! Inventory domain module.
//!
//! This crate contains the business rules for stock and reservations,
//! implemented purely as deterministic domain logic (no IO, no locking, no HTTP).
//! Callers own synchronisation; see `stockroom-infra` for the ledger.

pub mod command;
pub mod reservation;
pub mod stock;

pub use command::{ReleaseStock, ReserveStock, validate_quantity};
pub use reservation::{Reservation, ReservationStatus};
pub use stock::{Hold, StockLevels, StockRecord};
