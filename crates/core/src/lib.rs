//! Shared building blocks for the inventory reservation service.
//!
//! This crate holds the error taxonomy and the strongly-typed identifiers used
//! by every other crate. It has no infrastructure concerns.

pub mod error;
pub mod id;

pub use error::{ErrorClass, InventoryError, InventoryResult};
pub use id::{EventId, OrderId, ProductId, ReservationId};
