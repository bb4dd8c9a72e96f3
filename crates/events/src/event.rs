use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};

use stockroom_core::{EventId, InventoryError, InventoryResult, ProductId};

/// An inventory event as submitted for tracking (stock update, audit, movement).
///
/// Every field except `event_type` is optional on the wire; an absent
/// `event_type` deserializes to an empty string and is rejected by
/// [`InventoryEvent::validate`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InventoryEvent {
    #[serde(default)]
    pub event_type: String,
    #[serde(default)]
    pub product_id: Option<ProductId>,
    #[serde(default)]
    pub quantity: i64,
    #[serde(default)]
    pub timestamp: Option<DateTime<Utc>>,
    #[serde(default)]
    pub properties: Map<String, JsonValue>,
}

impl InventoryEvent {
    pub fn new(event_type: impl Into<String>) -> Self {
        Self {
            event_type: event_type.into(),
            product_id: None,
            quantity: 0,
            timestamp: None,
            properties: Map::new(),
        }
    }

    pub fn for_product(mut self, product_id: ProductId, quantity: i64) -> Self {
        self.product_id = Some(product_id);
        self.quantity = quantity;
        self
    }

    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<JsonValue>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }

    pub fn validate(&self) -> InventoryResult<()> {
        if self.event_type.trim().is_empty() {
            return Err(InventoryError::MissingField("event_type"));
        }
        Ok(())
    }
}

/// A tracked event as stored in the append-only log. Write-once.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordedEvent {
    pub event_id: EventId,
    /// Position in the log, starting at 1.
    pub sequence: u64,
    pub event_type: String,
    pub product_id: Option<ProductId>,
    pub quantity: i64,
    /// Business time: client-supplied, or the receive time when absent.
    pub timestamp: DateTime<Utc>,
    pub received_at: DateTime<Utc>,
    pub properties: Map<String, JsonValue>,
}

impl RecordedEvent {
    pub fn from_submitted(
        event: InventoryEvent,
        event_id: EventId,
        sequence: u64,
        received_at: DateTime<Utc>,
    ) -> Self {
        Self {
            event_id,
            sequence,
            timestamp: event.timestamp.unwrap_or(received_at),
            event_type: event.event_type,
            product_id: event.product_id,
            quantity: event.quantity,
            received_at,
            properties: event.properties,
        }
    }
}
