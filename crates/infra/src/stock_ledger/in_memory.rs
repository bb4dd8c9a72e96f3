use std::collections::HashMap;
use std::sync::{Arc, Mutex, RwLock};

use chrono::{DateTime, Utc};

use stockroom_core::{InventoryResult, ProductId};
use stockroom_inventory::{Hold, StockLevels, StockRecord};

use super::r#trait::{LedgerError, StockLedger};

type Slot = Arc<Mutex<StockRecord>>;

/// In-memory stock ledger with one lock per product.
///
/// The outer `RwLock` only guards the product index and is held just long
/// enough to clone a slot handle; mutations take the product's own `Mutex`, so
/// reservations on different products never wait on each other.
#[derive(Debug, Default)]
pub struct InMemoryStockLedger {
    slots: RwLock<HashMap<ProductId, Slot>>,
}

impl InMemoryStockLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_records(records: impl IntoIterator<Item = StockRecord>) -> Self {
        let slots = records
            .into_iter()
            .map(|r| (r.product_id().clone(), Arc::new(Mutex::new(r))))
            .collect();
        Self {
            slots: RwLock::new(slots),
        }
    }

    pub fn len(&self) -> usize {
        self.slots.read().map(|s| s.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn slot(&self, product_id: &ProductId) -> Result<Slot, LedgerError> {
        let slots = self
            .slots
            .read()
            .map_err(|_| LedgerError::Unavailable("product index lock poisoned".to_string()))?;
        slots
            .get(product_id)
            .cloned()
            .ok_or_else(|| LedgerError::NotFound(product_id.clone()))
    }

    fn mutate(
        &self,
        product_id: &ProductId,
        apply: impl FnOnce(&mut StockRecord) -> InventoryResult<StockLevels>,
    ) -> Result<StockLevels, LedgerError> {
        let slot = self.slot(product_id)?;
        let mut record = slot
            .lock()
            .map_err(|_| LedgerError::Unavailable(format!("stock lock poisoned for {product_id}")))?;
        apply(&mut record).map_err(LedgerError::from)
    }
}

impl StockLedger for InMemoryStockLedger {
    fn get(&self, product_id: &ProductId) -> Result<Option<StockRecord>, LedgerError> {
        let slot = match self.slot(product_id) {
            Ok(slot) => slot,
            Err(LedgerError::NotFound(_)) => return Ok(None),
            Err(e) => return Err(e),
        };
        let record = slot
            .lock()
            .map_err(|_| LedgerError::Unavailable(format!("stock lock poisoned for {product_id}")))?;
        Ok(Some(record.clone()))
    }

    fn reserve(
        &self,
        product_id: &ProductId,
        quantity: u64,
        hold: Hold,
        at: DateTime<Utc>,
    ) -> Result<StockLevels, LedgerError> {
        self.mutate(product_id, |record| record.reserve(quantity, hold, at))
    }

    fn release(
        &self,
        product_id: &ProductId,
        quantity: u64,
        hold: Hold,
        at: DateTime<Utc>,
    ) -> Result<StockLevels, LedgerError> {
        self.mutate(product_id, |record| record.release(quantity, hold, at))
    }

    fn upsert(&self, record: StockRecord) -> Result<(), LedgerError> {
        if !record.is_consistent() {
            return Err(LedgerError::Invalid(format!(
                "counters of {} do not sum to total",
                record.product_id()
            )));
        }

        let mut slots = self
            .slots
            .write()
            .map_err(|_| LedgerError::Unavailable("product index lock poisoned".to_string()))?;

        match slots.get(record.product_id()) {
            Some(slot) => {
                let mut current = slot.lock().map_err(|_| {
                    LedgerError::Unavailable(format!("stock lock poisoned for {}", record.product_id()))
                })?;
                *current = record;
            }
            None => {
                slots.insert(record.product_id().clone(), Arc::new(Mutex::new(record)));
            }
        }
        Ok(())
    }

    fn list(&self) -> Result<Vec<StockRecord>, LedgerError> {
        let handles: Vec<Slot> = {
            let slots = self
                .slots
                .read()
                .map_err(|_| LedgerError::Unavailable("product index lock poisoned".to_string()))?;
            slots.values().cloned().collect()
        };

        let mut records = Vec::with_capacity(handles.len());
        for slot in handles {
            let record = slot
                .lock()
                .map_err(|_| LedgerError::Unavailable("stock lock poisoned".to_string()))?;
            records.push(record.clone());
        }
        records.sort_by(|a, b| a.product_id().cmp(b.product_id()));
        Ok(records)
    }
}
