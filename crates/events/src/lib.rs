//! Inventory-change events and the pub/sub mechanics used to hand them to
//! downstream consumers (analytics, audit).

pub mod bus;
pub mod event;
pub mod in_memory_bus;

pub use bus::{EventBus, Subscription};
pub use event::{InventoryEvent, RecordedEvent};
pub use in_memory_bus::{InMemoryBusError, InMemoryEventBus};
