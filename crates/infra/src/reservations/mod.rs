//! Explicit reservation registry.
//!
//! Tracks every hold created by a successful reserve call so that releases are
//! checked against a real outstanding reservation and double-release is caught.

pub mod in_memory;
pub mod r#trait;

pub use in_memory::InMemoryReservationRegistry;
pub use r#trait::{Claim, RegistryError, ReservationRegistry};
