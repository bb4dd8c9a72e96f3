//! Service wiring: stores, engine, recorder, and the background event consumer.

use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, warn};

use stockroom_core::{InventoryResult, ProductId, ReservationId};
use stockroom_events::{EventBus, InMemoryEventBus, InventoryEvent, RecordedEvent};
use stockroom_infra::event_log::{EventLog, InMemoryEventLog};
use stockroom_infra::event_recorder::{self, EventRecorder};
use stockroom_infra::reservations::{InMemoryReservationRegistry, ReservationRegistry};
use stockroom_infra::stock_ledger::{InMemoryStockLedger, StockLedger};
use stockroom_infra::{AppConfig, ReleaseOutcome, ReservationEngine, ReservationOutcome};
use stockroom_inventory::{ReleaseStock, Reservation, ReserveStock, StockRecord};

pub type Engine = ReservationEngine<Arc<dyn StockLedger>, Arc<dyn ReservationRegistry>>;
pub type Recorder = EventRecorder<Arc<dyn EventLog>, Arc<InMemoryEventBus<RecordedEvent>>>;

pub struct AppServices {
    engine: Engine,
    recorder: Recorder,
}

impl AppServices {
    pub fn new(engine: Engine, recorder: Recorder) -> Self {
        Self { engine, recorder }
    }

    /// In-memory stores seeded with `records`.
    pub fn in_memory(config: &AppConfig, records: Vec<StockRecord>) -> Self {
        let ledger: Arc<dyn StockLedger> = Arc::new(InMemoryStockLedger::with_records(records));
        let registry: Arc<dyn ReservationRegistry> = Arc::new(InMemoryReservationRegistry::new());
        let engine = ReservationEngine::new(ledger, registry).with_release_policy(config.release_policy);

        let log: Arc<dyn EventLog> = Arc::new(InMemoryEventLog::new());
        let recorder = EventRecorder::new(log, Arc::new(InMemoryEventBus::new()));

        Self::new(engine, recorder)
    }

    pub fn get_inventory(&self, product_id: &ProductId) -> InventoryResult<StockRecord> {
        self.engine.get_inventory(product_id)
    }

    pub fn get_reservation(&self, id: &ReservationId) -> InventoryResult<Reservation> {
        self.engine.get_reservation(id)
    }

    /// Reserve, then record a `stock_reserved` audit event (replays are not re-recorded).
    pub fn reserve(&self, cmd: ReserveStock) -> InventoryResult<ReservationOutcome> {
        let order_id = cmd.order_id.clone();
        let outcome = self.engine.reserve_inventory(cmd)?;
        if !outcome.replayed {
            self.audit(event_recorder::reserved_event(&outcome, order_id.as_ref()));
        }
        Ok(outcome)
    }

    pub fn release(&self, cmd: ReleaseStock) -> InventoryResult<ReleaseOutcome> {
        let outcome = self.engine.release_inventory(cmd)?;
        self.audit(event_recorder::released_event(&outcome));
        Ok(outcome)
    }

    pub fn record_event(&self, event: InventoryEvent) -> InventoryResult<RecordedEvent> {
        self.recorder.record(event)
    }

    pub fn event_count(&self) -> u64 {
        self.recorder.log().len().unwrap_or(0)
    }

    // Audit failures never undo a committed reserve/release.
    fn audit(&self, event: InventoryEvent) {
        if let Err(e) = self.recorder.record(event) {
            warn!(error = %e, "failed to record audit event");
        }
    }

    /// Background subscriber: bus -> debug log (stand-in for the analytics sink).
    ///
    /// Must be called from within a Tokio runtime. The worker exits once the
    /// bus (and with it every sender) is dropped.
    pub fn spawn_event_logger(&self) {
        let sub = self.recorder.bus().subscribe();
        tokio::task::spawn_blocking(move || {
            while let Ok(event) = sub.recv() {
                debug!(
                    event_id = %event.event_id,
                    sequence = event.sequence,
                    event_type = %event.event_type,
                    lag_ms = (Utc::now() - event.received_at).num_milliseconds(),
                    "inventory event recorded"
                );
            }
        });
    }
}
