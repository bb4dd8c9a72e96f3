//! Append-only log of tracked inventory events.
//!
//! The log assigns a monotonically increasing sequence number on append.
//! Entries are never mutated or deleted. Downstream consumers poll with
//! [`EventLog::read_after`] or subscribe through the recorder's bus.

pub mod in_memory;

use std::sync::Arc;

use chrono::{DateTime, Utc};
use thiserror::Error;

use stockroom_core::{EventId, InventoryError};
use stockroom_events::{InventoryEvent, RecordedEvent};

pub use in_memory::InMemoryEventLog;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EventLogError {
    #[error("event log unavailable: {0}")]
    Unavailable(String),
}

impl From<EventLogError> for InventoryError {
    fn from(value: EventLogError) -> Self {
        match value {
            EventLogError::Unavailable(msg) => InventoryError::Internal(msg),
        }
    }
}

pub trait EventLog: Send + Sync {
    /// Append one event; sequence assignment and append are a single step.
    fn append(
        &self,
        event: InventoryEvent,
        event_id: EventId,
        received_at: DateTime<Utc>,
    ) -> Result<RecordedEvent, EventLogError>;

    /// Up to `limit` entries with a sequence strictly greater than `after`.
    fn read_after(&self, after: u64, limit: usize) -> Result<Vec<RecordedEvent>, EventLogError>;

    fn len(&self) -> Result<u64, EventLogError>;
}

impl<S> EventLog for Arc<S>
where
    S: EventLog + ?Sized,
{
    fn append(
        &self,
        event: InventoryEvent,
        event_id: EventId,
        received_at: DateTime<Utc>,
    ) -> Result<RecordedEvent, EventLogError> {
        (**self).append(event, event_id, received_at)
    }

    fn read_after(&self, after: u64, limit: usize) -> Result<Vec<RecordedEvent>, EventLogError> {
        (**self).read_after(after, limit)
    }

    fn len(&self) -> Result<u64, EventLogError> {
        (**self).len()
    }
}
