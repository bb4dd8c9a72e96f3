//! Event recorder: validate, append, then fan out.
//!
//! The log append is the commit point. Publishing to the bus happens after
//! and is best-effort; subscribers that miss a message can catch up from the
//! log with [`EventLog::read_after`].

use chrono::Utc;
use tracing::{debug, instrument, warn};

use stockroom_core::{EventId, InventoryResult, OrderId};
use stockroom_events::{EventBus, InventoryEvent, RecordedEvent};

use crate::event_log::EventLog;
use crate::reservation_engine::{ReleaseOutcome, ReservationOutcome};

pub const STOCK_RESERVED: &str = "stock_reserved";
pub const STOCK_RELEASED: &str = "stock_released";

#[derive(Debug)]
pub struct EventRecorder<G, B> {
    log: G,
    bus: B,
}

impl<G, B> EventRecorder<G, B>
where
    G: EventLog,
    B: EventBus<RecordedEvent>,
{
    pub fn new(log: G, bus: B) -> Self {
        Self { log, bus }
    }

    pub fn log(&self) -> &G {
        &self.log
    }

    pub fn bus(&self) -> &B {
        &self.bus
    }

    /// Accept an event for tracking. Returns the stored entry.
    #[instrument(skip(self, event), fields(event_type = %event.event_type))]
    pub fn record(&self, event: InventoryEvent) -> InventoryResult<RecordedEvent> {
        event.validate()?;

        let recorded = self.log.append(event, EventId::generate(), Utc::now())?;
        debug!(event_id = %recorded.event_id, sequence = recorded.sequence, "event recorded");

        if let Err(e) = self.bus.publish(recorded.clone()) {
            warn!(event_id = %recorded.event_id, error = ?e, "failed to publish recorded event");
        }
        Ok(recorded)
    }
}

/// Audit entry for a successful reservation.
pub fn reserved_event(outcome: &ReservationOutcome, order_id: Option<&OrderId>) -> InventoryEvent {
    let event = InventoryEvent::new(STOCK_RESERVED)
        .for_product(outcome.product_id.clone(), to_signed(outcome.quantity))
        .with_property("reservation_id", outcome.reservation_id.as_str())
        .with_property("available", outcome.levels.available)
        .with_property("reserved", outcome.levels.reserved);
    match order_id {
        Some(order_id) => event.with_property("order_id", order_id.as_str()),
        None => event,
    }
}

/// Audit entry for a successful release.
pub fn released_event(outcome: &ReleaseOutcome) -> InventoryEvent {
    let event = InventoryEvent::new(STOCK_RELEASED)
        .for_product(outcome.product_id.clone(), to_signed(outcome.quantity))
        .with_property("available", outcome.levels.available)
        .with_property("reserved", outcome.levels.reserved);
    match &outcome.reservation_id {
        Some(id) => event.with_property("reservation_id", id.as_str()),
        None => event,
    }
}

fn to_signed(quantity: u64) -> i64 {
    i64::try_from(quantity).unwrap_or(i64::MAX)
}
