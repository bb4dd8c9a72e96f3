use std::sync::RwLock;

use chrono::{DateTime, Utc};

use stockroom_core::EventId;
use stockroom_events::{InventoryEvent, RecordedEvent};

use super::{EventLog, EventLogError};

/// In-memory append-only event log.
///
/// Intended for tests/dev. Not optimized for performance.
#[derive(Debug, Default)]
pub struct InMemoryEventLog {
    entries: RwLock<Vec<RecordedEvent>>,
}

impl InMemoryEventLog {
    pub fn new() -> Self {
        Self::default()
    }
}

impl EventLog for InMemoryEventLog {
    fn append(
        &self,
        event: InventoryEvent,
        event_id: EventId,
        received_at: DateTime<Utc>,
    ) -> Result<RecordedEvent, EventLogError> {
        let mut entries = self
            .entries
            .write()
            .map_err(|_| EventLogError::Unavailable("event log lock poisoned".to_string()))?;

        let sequence = entries.len() as u64 + 1;
        let recorded = RecordedEvent::from_submitted(event, event_id, sequence, received_at);
        entries.push(recorded.clone());
        Ok(recorded)
    }

    fn read_after(&self, after: u64, limit: usize) -> Result<Vec<RecordedEvent>, EventLogError> {
        let entries = self
            .entries
            .read()
            .map_err(|_| EventLogError::Unavailable("event log lock poisoned".to_string()))?;

        // Sequences are dense and 1-based, so entry `n` sits at index `n - 1`.
        let start = usize::try_from(after).unwrap_or(usize::MAX).min(entries.len());
        Ok(entries[start..].iter().take(limit).cloned().collect())
    }

    fn len(&self) -> Result<u64, EventLogError> {
        self.entries
            .read()
            .map(|e| e.len() as u64)
            .map_err(|_| EventLogError::Unavailable("event log lock poisoned".to_string()))
    }
}
