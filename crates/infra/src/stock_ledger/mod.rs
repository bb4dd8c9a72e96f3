//! Stock ledger: the single source of truth for per-product quantities.
//!
//! The ledger exposes three primitives (`get`, `reserve`, `release`) plus
//! seeding. Implementations must serialize every mutation on a given product
//! and must never let two products block one another. No caller ever holds a
//! reference to a record across calls; reads return owned snapshots.

pub mod in_memory;
pub mod r#trait;

pub use in_memory::InMemoryStockLedger;
pub use r#trait::{LedgerError, StockLedger};
