//! Reservation engine (application-level orchestration).
//!
//! Orchestrates reserve/release requests against the stock ledger and the
//! reservation registry:
//!
//! ```text
//! ReserveStock
//!   ↓
//! 1. Validate quantity (>= 1) and product id
//!   ↓
//! 2. Look up the product on the ledger (ProductNotFound if absent)
//!   ↓
//! 3. Claim the reservation id in the registry (idempotent replay / conflict)
//!   ↓
//! 4. Ledger reserve (atomic per product)
//!   ↓
//! 5. Activate the reservation, or abandon the claim if step 4 failed
//! ```
//!
//! Releases run the same way in reverse: the registry hold is decremented
//! first and restored if the ledger step fails, so a failed call leaves both
//! stores as they were.
//!
//! Registry-backed units are reserved as [`Hold::Tracked`]. A release without
//! a reservation id is [`Hold::Untracked`] and can only return units no
//! reservation accounts for.
//!
//! The engine keeps no quantities of its own; every count it returns was read
//! from the ledger in the same call. Timestamps and generated ids are produced
//! before any ledger call so nothing slow happens inside a product's critical
//! section.

use chrono::Utc;
use serde::Serialize;
use tracing::{error, info, instrument, warn};

use stockroom_core::{InventoryError, InventoryResult, ProductId, ReservationId};
use stockroom_inventory::{
    Hold, ReleaseStock, Reservation, ReserveStock, StockLevels, StockRecord, validate_quantity,
};

use crate::reservations::{Claim, ReservationRegistry};
use crate::stock_ledger::StockLedger;

/// Bound on regenerating a server-side id that collided with an existing one.
const MAX_ID_ATTEMPTS: usize = 8;

/// What to do with releases that carry no reservation id.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum ReleasePolicy {
    /// Release against the product counters only (legacy clients).
    #[default]
    AllowUntracked,
    /// Every release must name a registered reservation.
    RequireReservation,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReservationOutcome {
    pub product_id: ProductId,
    pub reservation_id: ReservationId,
    pub quantity: u64,
    pub levels: StockLevels,
    /// True when this call replayed an earlier identical reservation.
    pub replayed: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReleaseOutcome {
    pub product_id: ProductId,
    pub reservation_id: Option<ReservationId>,
    pub quantity: u64,
    pub levels: StockLevels,
    /// Units still held by the reservation after this release.
    pub reservation_remaining: Option<u64>,
}

#[derive(Debug)]
pub struct ReservationEngine<L, R> {
    ledger: L,
    registry: R,
    policy: ReleasePolicy,
}

impl<L, R> ReservationEngine<L, R> {
    pub fn new(ledger: L, registry: R) -> Self {
        Self {
            ledger,
            registry,
            policy: ReleasePolicy::default(),
        }
    }

    pub fn with_release_policy(mut self, policy: ReleasePolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn ledger(&self) -> &L {
        &self.ledger
    }

    pub fn registry(&self) -> &R {
        &self.registry
    }
}

impl<L, R> ReservationEngine<L, R>
where
    L: StockLedger,
    R: ReservationRegistry,
{
    /// Read one stock record. Never mutates.
    pub fn get_inventory(&self, product_id: &ProductId) -> InventoryResult<StockRecord> {
        self.ledger
            .get(product_id)?
            .ok_or_else(|| InventoryError::ProductNotFound(product_id.clone()))
    }

    pub fn get_reservation(&self, id: &ReservationId) -> InventoryResult<Reservation> {
        self.registry
            .get(id)?
            .ok_or_else(|| InventoryError::ReservationNotFound(id.clone()))
    }

    #[instrument(
        skip(self, cmd),
        fields(product_id = %cmd.product_id, quantity = cmd.quantity, order_id = ?cmd.order_id)
    )]
    pub fn reserve_inventory(&self, cmd: ReserveStock) -> InventoryResult<ReservationOutcome> {
        let quantity = validate_quantity(cmd.quantity)?;
        if cmd.product_id.is_blank() {
            return Err(InventoryError::MissingField("product_id"));
        }
        self.get_inventory(&cmd.product_id)?;

        let now = Utc::now();
        let client_id = cmd.requested_reservation_id().cloned();
        let reservation_id = match client_id {
            Some(id) => match self.claim(id, &cmd, quantity, now, true)? {
                ClaimOutcome::Claimed(id) => id,
                ClaimOutcome::Replay(outcome) => return Ok(outcome),
                ClaimOutcome::Collided => {
                    return Err(InventoryError::internal("reservation id collision"));
                }
            },
            None => self.claim_generated(&cmd, quantity, now)?,
        };

        let levels = match self.ledger.reserve(&cmd.product_id, quantity, Hold::Tracked, now) {
            Ok(levels) => levels,
            Err(e) => {
                if let Err(abandon_err) = self.registry.abandon(&reservation_id) {
                    error!(%reservation_id, error = %abandon_err, "failed to drop pending reservation");
                }
                let err = InventoryError::from(e);
                info!(error = %err, "reservation rejected by ledger");
                return Err(err);
            }
        };

        if let Err(e) = self.registry.activate(&reservation_id, now) {
            // Units are held but the registry cannot track them: give them back.
            error!(%reservation_id, error = %e, "failed to activate reservation; compensating");
            if let Err(undo) = self.ledger.release(&cmd.product_id, quantity, Hold::Tracked, Utc::now()) {
                error!(%reservation_id, error = %undo, "compensating release failed");
            }
            if let Err(abandon_err) = self.registry.abandon(&reservation_id) {
                error!(%reservation_id, error = %abandon_err, "failed to drop pending reservation");
            }
            return Err(e.into());
        }

        info!(%reservation_id, available = levels.available, reserved = levels.reserved, "inventory reserved");
        Ok(ReservationOutcome {
            product_id: cmd.product_id,
            reservation_id,
            quantity,
            levels,
            replayed: false,
        })
    }

    #[instrument(
        skip(self, cmd),
        fields(product_id = %cmd.product_id, quantity = cmd.quantity, reservation_id = ?cmd.reservation_id)
    )]
    pub fn release_inventory(&self, cmd: ReleaseStock) -> InventoryResult<ReleaseOutcome> {
        let quantity = validate_quantity(cmd.quantity)?;
        if cmd.product_id.is_blank() {
            return Err(InventoryError::MissingField("product_id"));
        }
        self.get_inventory(&cmd.product_id)?;

        let now = Utc::now();
        let Some(reservation_id) = cmd.requested_reservation_id().cloned() else {
            if self.policy == ReleasePolicy::RequireReservation {
                return Err(InventoryError::MissingField("reservation_id"));
            }
            let levels = self.ledger.release(&cmd.product_id, quantity, Hold::Untracked, now)?;
            info!(available = levels.available, reserved = levels.reserved, "untracked release applied");
            return Ok(ReleaseOutcome {
                product_id: cmd.product_id,
                reservation_id: None,
                quantity,
                levels,
                reservation_remaining: None,
            });
        };

        let held = self
            .registry
            .begin_release(&reservation_id, &cmd.product_id, quantity, now)?;

        let levels = match self.ledger.release(&cmd.product_id, quantity, Hold::Tracked, now) {
            Ok(levels) => levels,
            Err(e) => {
                if let Err(restore_err) = self.registry.restore(&reservation_id, quantity, now) {
                    error!(%reservation_id, error = %restore_err, "failed to restore reservation hold");
                }
                let err = InventoryError::from(e);
                warn!(%reservation_id, error = %err, "ledger refused release of a tracked reservation");
                return Err(err);
            }
        };

        info!(
            %reservation_id,
            remaining = held.remaining(),
            available = levels.available,
            reserved = levels.reserved,
            "inventory released"
        );
        Ok(ReleaseOutcome {
            product_id: cmd.product_id,
            reservation_id: Some(reservation_id),
            quantity,
            levels,
            reservation_remaining: Some(held.remaining()),
        })
    }

    fn claim_generated(
        &self,
        cmd: &ReserveStock,
        quantity: u64,
        now: chrono::DateTime<Utc>,
    ) -> InventoryResult<ReservationId> {
        for _ in 0..MAX_ID_ATTEMPTS {
            if let ClaimOutcome::Claimed(id) =
                self.claim(ReservationId::generate(), cmd, quantity, now, false)?
            {
                return Ok(id);
            }
        }
        Err(InventoryError::internal(
            "could not allocate a unique reservation id",
        ))
    }

    fn claim(
        &self,
        id: ReservationId,
        cmd: &ReserveStock,
        quantity: u64,
        now: chrono::DateTime<Utc>,
        client_supplied: bool,
    ) -> InventoryResult<ClaimOutcome> {
        let pending = Reservation::pending(
            id.clone(),
            cmd.product_id.clone(),
            cmd.order_id.clone(),
            quantity,
            now,
        );

        match self.registry.claim(pending)? {
            Claim::Claimed => Ok(ClaimOutcome::Claimed(id)),
            Claim::Existing(existing) if client_supplied => {
                if existing.is_replay_of(&cmd.product_id, quantity) {
                    let current = self.get_inventory(&cmd.product_id)?;
                    info!(reservation_id = %id, "replayed reservation; ledger untouched");
                    return Ok(ClaimOutcome::Replay(ReservationOutcome {
                        product_id: cmd.product_id.clone(),
                        reservation_id: id,
                        quantity,
                        levels: current.levels(),
                        replayed: true,
                    }));
                }
                warn!(reservation_id = %id, status = ?existing.status(), "reservation id already in use");
                Err(InventoryError::conflict(format!(
                    "reservation {id} already exists for product {} with quantity {}",
                    existing.product_id(),
                    existing.quantity()
                )))
            }
            // Generated id collided: report it so the caller draws a new one.
            Claim::Existing(_) => Ok(ClaimOutcome::Collided),
        }
    }
}

enum ClaimOutcome {
    Claimed(ReservationId),
    Replay(ReservationOutcome),
    Collided,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::DateTime;
    use std::sync::{Arc, Barrier};
    use std::thread;

    use stockroom_core::OrderId;
    use stockroom_inventory::ReservationStatus;

    use crate::reservations::{InMemoryReservationRegistry, RegistryError};
    use crate::stock_ledger::{InMemoryStockLedger, LedgerError};

    type Engine = ReservationEngine<Arc<InMemoryStockLedger>, Arc<InMemoryReservationRegistry>>;

    fn engine_with(records: &[(&str, u64, u64)]) -> Engine {
        let ledger = InMemoryStockLedger::with_records(records.iter().map(|(id, a, r)| {
            StockRecord::new(ProductId::new(*id), *a, *r, Utc::now()).unwrap()
        }));
        ReservationEngine::new(Arc::new(ledger), Arc::new(InMemoryReservationRegistry::new()))
    }

    fn reserve(product: &str, quantity: i64, reservation_id: Option<&str>) -> ReserveStock {
        ReserveStock {
            product_id: ProductId::new(product),
            quantity,
            order_id: Some(OrderId::new("order-1")),
            reservation_id: reservation_id.map(ReservationId::new),
        }
    }

    fn release(product: &str, quantity: i64, reservation_id: Option<&str>) -> ReleaseStock {
        ReleaseStock {
            product_id: ProductId::new(product),
            quantity,
            reservation_id: reservation_id.map(ReservationId::new),
        }
    }

    #[test]
    fn reserve_overreserve_release_scenario() {
        let engine = engine_with(&[("p1", 100, 0)]);

        let ok = engine.reserve_inventory(reserve("p1", 30, None)).unwrap();
        assert_eq!(ok.levels, StockLevels { available: 70, reserved: 30 });
        assert!(ok.reservation_id.as_str().starts_with("res-"));

        let err = engine.reserve_inventory(reserve("p1", 80, None)).unwrap_err();
        assert_eq!(err, InventoryError::InsufficientStock { available: 70, requested: 80 });
        assert_eq!(engine.get_inventory(&ProductId::new("p1")).unwrap().levels(),
            StockLevels { available: 70, reserved: 30 });

        let rel = engine
            .release_inventory(release("p1", 30, Some(ok.reservation_id.as_str())))
            .unwrap();
        assert_eq!(rel.levels, StockLevels { available: 100, reserved: 0 });
        assert_eq!(rel.reservation_remaining, Some(0));
    }

    #[test]
    fn failed_reserve_does_not_leave_a_registry_entry() {
        let engine = engine_with(&[("p1", 5, 0)]);
        engine.reserve_inventory(reserve("p1", 6, Some("res-big"))).unwrap_err();

        assert!(engine.registry().is_empty());
        let err = engine.get_reservation(&ReservationId::new("res-big")).unwrap_err();
        assert!(matches!(err, InventoryError::ReservationNotFound(_)));
    }

    #[test]
    fn unknown_product_is_not_found_and_ledger_untouched() {
        let engine = engine_with(&[("p1", 100, 0)]);
        let err = engine.reserve_inventory(reserve("p404", 1, None)).unwrap_err();

        assert_eq!(err, InventoryError::ProductNotFound(ProductId::new("p404")));
        assert_eq!(engine.ledger().len(), 1);
        assert!(engine.registry().is_empty());
    }

    #[test]
    fn non_positive_quantities_fail_before_the_ledger() {
        let engine = engine_with(&[("p1", 100, 0)]);
        for q in [0, -1, -100] {
            let err = engine.reserve_inventory(reserve("p1", q, None)).unwrap_err();
            assert!(matches!(err, InventoryError::InvalidRequest(_)));
            let err = engine.release_inventory(release("p1", q, None)).unwrap_err();
            assert!(matches!(err, InventoryError::InvalidRequest(_)));
        }
        let rec = engine.get_inventory(&ProductId::new("p1")).unwrap();
        assert_eq!(rec.levels(), StockLevels { available: 100, reserved: 0 });
    }

    #[test]
    fn client_reservation_id_is_echoed_and_replays_are_idempotent() {
        let engine = engine_with(&[("p1", 10, 0)]);

        let first = engine.reserve_inventory(reserve("p1", 4, Some("res-client"))).unwrap();
        assert_eq!(first.reservation_id, ReservationId::new("res-client"));
        assert!(!first.replayed);

        let again = engine.reserve_inventory(reserve("p1", 4, Some("res-client"))).unwrap();
        assert!(again.replayed);
        assert_eq!(again.levels, StockLevels { available: 6, reserved: 4 });
    }

    #[test]
    fn reusing_a_reservation_id_for_a_different_hold_conflicts() {
        let engine = engine_with(&[("p1", 10, 0), ("p2", 10, 0)]);
        engine.reserve_inventory(reserve("p1", 4, Some("res-client"))).unwrap();

        let err = engine.reserve_inventory(reserve("p1", 5, Some("res-client"))).unwrap_err();
        assert!(matches!(err, InventoryError::ReservationConflict(_)));
        let err = engine.reserve_inventory(reserve("p2", 4, Some("res-client"))).unwrap_err();
        assert!(matches!(err, InventoryError::ReservationConflict(_)));

        let p2 = engine.get_inventory(&ProductId::new("p2")).unwrap();
        assert_eq!(p2.reserved(), 0);
    }

    #[test]
    fn double_release_is_rejected_and_counters_stay_put() {
        let engine = engine_with(&[("p1", 10, 0)]);
        let res = engine.reserve_inventory(reserve("p1", 5, None)).unwrap();
        let id = res.reservation_id.as_str();

        engine.release_inventory(release("p1", 5, Some(id))).unwrap();
        let err = engine.release_inventory(release("p1", 5, Some(id))).unwrap_err();

        assert_eq!(err, InventoryError::InsufficientReserved { reserved: 0, requested: 5 });
        let rec = engine.get_inventory(&ProductId::new("p1")).unwrap();
        assert_eq!(rec.levels(), StockLevels { available: 10, reserved: 0 });
    }

    #[test]
    fn partial_releases_drain_the_reservation() {
        let engine = engine_with(&[("p1", 10, 0)]);
        let res = engine.reserve_inventory(reserve("p1", 6, None)).unwrap();
        let id = res.reservation_id.as_str();

        let first = engine.release_inventory(release("p1", 2, Some(id))).unwrap();
        assert_eq!(first.reservation_remaining, Some(4));

        let err = engine.release_inventory(release("p1", 5, Some(id))).unwrap_err();
        assert_eq!(err, InventoryError::InsufficientReserved { reserved: 4, requested: 5 });

        engine.release_inventory(release("p1", 4, Some(id))).unwrap();
        let stored = engine.get_reservation(&res.reservation_id).unwrap();
        assert_eq!(stored.status(), ReservationStatus::Released);
    }

    #[test]
    fn release_of_unknown_reservation_is_not_found() {
        let engine = engine_with(&[("p1", 10, 5)]);
        let err = engine.release_inventory(release("p1", 1, Some("res-nope"))).unwrap_err();
        assert_eq!(err, InventoryError::ReservationNotFound(ReservationId::new("res-nope")));
    }

    #[test]
    fn release_against_wrong_product_is_invalid() {
        let engine = engine_with(&[("p1", 10, 0), ("p2", 10, 5)]);
        let res = engine.reserve_inventory(reserve("p1", 3, None)).unwrap();

        let err = engine
            .release_inventory(release("p2", 3, Some(res.reservation_id.as_str())))
            .unwrap_err();
        assert!(matches!(err, InventoryError::InvalidRequest(_)));
        assert_eq!(engine.get_inventory(&ProductId::new("p2")).unwrap().reserved(), 5);
    }

    #[test]
    fn untracked_release_follows_counters_only() {
        let engine = engine_with(&[("p1", 100, 5)]);
        let rel = engine.release_inventory(release("p1", 5, None)).unwrap();
        assert_eq!(rel.levels, StockLevels { available: 105, reserved: 0 });

        let err = engine.release_inventory(release("p1", 1, None)).unwrap_err();
        assert_eq!(err, InventoryError::InsufficientReserved { reserved: 0, requested: 1 });
    }

    #[test]
    fn strict_policy_requires_a_reservation_id() {
        let engine = engine_with(&[("p1", 100, 5)])
            .with_release_policy(ReleasePolicy::RequireReservation);
        let err = engine.release_inventory(release("p1", 5, Some("  "))).unwrap_err();
        assert_eq!(err, InventoryError::MissingField("reservation_id"));
    }

    #[test]
    fn untracked_release_cannot_drain_tracked_reservations() {
        let engine = engine_with(&[("p1", 10, 0)]);
        let a = engine.reserve_inventory(reserve("p1", 5, Some("res-a"))).unwrap();
        let b = engine.reserve_inventory(reserve("p1", 5, Some("res-b"))).unwrap();

        let err = engine.release_inventory(release("p1", 5, None)).unwrap_err();
        assert_eq!(err, InventoryError::InsufficientReserved { reserved: 0, requested: 5 });
        let rec = engine.get_inventory(&ProductId::new("p1")).unwrap();
        assert_eq!(rec.levels(), StockLevels { available: 0, reserved: 10 });

        engine.release_inventory(release("p1", 5, Some(a.reservation_id.as_str()))).unwrap();
        let last = engine
            .release_inventory(release("p1", 5, Some(b.reservation_id.as_str())))
            .unwrap();
        assert_eq!(last.levels, StockLevels { available: 10, reserved: 0 });
    }

    #[test]
    fn untracked_release_only_takes_seeded_holds() {
        let engine = engine_with(&[("p1", 10, 3)]);
        engine.reserve_inventory(reserve("p1", 4, None)).unwrap();

        let err = engine.release_inventory(release("p1", 4, None)).unwrap_err();
        assert_eq!(err, InventoryError::InsufficientReserved { reserved: 3, requested: 4 });
        let rel = engine.release_inventory(release("p1", 3, None)).unwrap();
        assert_eq!(rel.levels, StockLevels { available: 9, reserved: 4 });
    }

    /// Ledger whose releases always fail, as a lost backing store would.
    struct FailingReleaseLedger(InMemoryStockLedger);

    impl StockLedger for FailingReleaseLedger {
        fn get(&self, product_id: &ProductId) -> Result<Option<StockRecord>, LedgerError> {
            self.0.get(product_id)
        }

        fn reserve(
            &self,
            product_id: &ProductId,
            quantity: u64,
            hold: Hold,
            at: DateTime<Utc>,
        ) -> Result<StockLevels, LedgerError> {
            self.0.reserve(product_id, quantity, hold, at)
        }

        fn release(
            &self,
            _product_id: &ProductId,
            _quantity: u64,
            _hold: Hold,
            _at: DateTime<Utc>,
        ) -> Result<StockLevels, LedgerError> {
            Err(LedgerError::Unavailable("db down".to_string()))
        }

        fn upsert(&self, record: StockRecord) -> Result<(), LedgerError> {
            self.0.upsert(record)
        }

        fn list(&self) -> Result<Vec<StockRecord>, LedgerError> {
            self.0.list()
        }
    }

    #[test]
    fn registry_hold_is_restored_when_the_ledger_fails() {
        let ledger = InMemoryStockLedger::with_records([
            StockRecord::new(ProductId::new("p1"), 10, 0, Utc::now()).unwrap(),
        ]);
        let engine = ReservationEngine::new(
            FailingReleaseLedger(ledger),
            InMemoryReservationRegistry::new(),
        );
        let res = engine.reserve_inventory(reserve("p1", 4, None)).unwrap();

        let err = engine
            .release_inventory(release("p1", 4, Some(res.reservation_id.as_str())))
            .unwrap_err();
        assert!(matches!(err, InventoryError::Internal(_)));

        let stored = engine.get_reservation(&res.reservation_id).unwrap();
        assert_eq!(stored.remaining(), 4);
        assert_eq!(stored.status(), ReservationStatus::Active);
        let rec = engine.get_inventory(&ProductId::new("p1")).unwrap();
        assert_eq!(rec.levels(), StockLevels { available: 6, reserved: 4 });
    }

    /// Registry that accepts claims but cannot activate or drop them.
    struct StuckRegistry(InMemoryReservationRegistry);

    impl ReservationRegistry for StuckRegistry {
        fn claim(&self, reservation: Reservation) -> Result<Claim, RegistryError> {
            self.0.claim(reservation)
        }

        fn activate(&self, _id: &ReservationId, _at: DateTime<Utc>) -> Result<(), RegistryError> {
            Err(RegistryError::Unavailable("registry down".to_string()))
        }

        fn abandon(&self, _id: &ReservationId) -> Result<(), RegistryError> {
            Err(RegistryError::Unavailable("registry down".to_string()))
        }

        fn begin_release(
            &self,
            id: &ReservationId,
            product_id: &ProductId,
            quantity: u64,
            at: DateTime<Utc>,
        ) -> Result<Reservation, RegistryError> {
            self.0.begin_release(id, product_id, quantity, at)
        }

        fn restore(&self, id: &ReservationId, quantity: u64, at: DateTime<Utc>) -> Result<(), RegistryError> {
            self.0.restore(id, quantity, at)
        }

        fn get(&self, id: &ReservationId) -> Result<Option<Reservation>, RegistryError> {
            self.0.get(id)
        }
    }

    #[test]
    fn failed_activation_gives_units_back_even_if_the_claim_cannot_be_dropped() {
        let ledger = InMemoryStockLedger::with_records([
            StockRecord::new(ProductId::new("p1"), 10, 0, Utc::now()).unwrap(),
        ]);
        let engine = ReservationEngine::new(ledger, StuckRegistry(InMemoryReservationRegistry::new()));

        let err = engine.reserve_inventory(reserve("p1", 4, Some("res-stuck"))).unwrap_err();
        assert!(matches!(err, InventoryError::Internal(_)));

        let rec = engine.get_inventory(&ProductId::new("p1")).unwrap();
        assert_eq!(rec.levels(), StockLevels { available: 10, reserved: 0 });
        assert_eq!(rec.tracked(), 0);
    }

    #[test]
    fn exactly_one_of_two_concurrent_sixty_unit_reservations_wins() {
        let engine = Arc::new(engine_with(&[("p1", 100, 0)]));
        let barrier = Arc::new(Barrier::new(2));

        let handles: Vec<_> = (0..2)
            .map(|_| {
                let engine = engine.clone();
                let barrier = barrier.clone();
                thread::spawn(move || {
                    barrier.wait();
                    engine.reserve_inventory(reserve("p1", 60, None))
                })
            })
            .collect();

        let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
        assert!(results.iter().any(|r| matches!(r, Err(InventoryError::InsufficientStock { .. }))));

        let rec = engine.get_inventory(&ProductId::new("p1")).unwrap();
        assert_eq!(rec.available(), 40);
        assert_eq!(engine.registry().active_count(), 1);
    }

    #[test]
    fn concurrent_duplicate_client_ids_reserve_once() {
        let engine = Arc::new(engine_with(&[("p1", 100, 0)]));
        let barrier = Arc::new(Barrier::new(6));

        let handles: Vec<_> = (0..6)
            .map(|_| {
                let engine = engine.clone();
                let barrier = barrier.clone();
                thread::spawn(move || {
                    barrier.wait();
                    engine.reserve_inventory(reserve("p1", 10, Some("res-dup")))
                })
            })
            .collect();

        for h in handles {
            // Losers either replay or see the claim still pending; none mutate.
            match h.join().unwrap() {
                Ok(_) | Err(InventoryError::ReservationConflict(_)) => {}
                Err(other) => panic!("unexpected error: {other}"),
            }
        }

        let rec = engine.get_inventory(&ProductId::new("p1")).unwrap();
        assert_eq!(rec.reserved(), 10);
    }

    #[test]
    fn get_inventory_does_not_mutate() {
        let engine = engine_with(&[("p1", 7, 3)]);
        let a = engine.get_inventory(&ProductId::new("p1")).unwrap();
        let b = engine.get_inventory(&ProductId::new("p1")).unwrap();
        assert_eq!(a, b);
    }
}
