use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use stockroom_core::{InventoryError, InventoryResult, ProductId};

/// Counters after a successful mutation.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockLevels {
    pub available: u64,
    pub reserved: u64,
}

/// Whose units a reserve/release moves.
///
/// `Tracked` units belong to reservations in the registry; `Untracked` units
/// are counter-only holds (seeded stock, clients that send no reservation id).
/// An untracked release can never take units out of the tracked share.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Hold {
    Tracked,
    Untracked,
}

/// Authoritative per-product quantity record.
///
/// `total == available + reserved` and `tracked <= reserved` hold for every
/// value of this type: the fields are private, records are only built through
/// [`StockRecord::new`], and every mutation moves units between the counters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StockRecord {
    product_id: ProductId,
    available: u64,
    reserved: u64,
    total: u64,
    #[serde(skip)]
    tracked: u64,
    warehouse_id: String,
    reorder_point: u64,
    reorder_quantity: u64,
    last_updated: DateTime<Utc>,
}

impl StockRecord {
    /// Build a record from its two counters; `total` is derived.
    pub fn new(
        product_id: ProductId,
        available: u64,
        reserved: u64,
        at: DateTime<Utc>,
    ) -> InventoryResult<Self> {
        if product_id.is_blank() {
            return Err(InventoryError::MissingField("product_id"));
        }
        let total = available
            .checked_add(reserved)
            .ok_or_else(|| InventoryError::invalid("stock total overflows"))?;

        Ok(Self {
            product_id,
            available,
            reserved,
            total,
            tracked: 0,
            warehouse_id: String::new(),
            reorder_point: 0,
            reorder_quantity: 0,
            last_updated: at,
        })
    }

    pub fn with_warehouse(mut self, warehouse_id: impl Into<String>) -> Self {
        self.warehouse_id = warehouse_id.into();
        self
    }

    pub fn with_reorder(mut self, reorder_point: u64, reorder_quantity: u64) -> Self {
        self.reorder_point = reorder_point;
        self.reorder_quantity = reorder_quantity;
        self
    }

    pub fn product_id(&self) -> &ProductId {
        &self.product_id
    }

    pub fn available(&self) -> u64 {
        self.available
    }

    pub fn reserved(&self) -> u64 {
        self.reserved
    }

    pub fn total(&self) -> u64 {
        self.total
    }

    /// Reserved units held by registered reservations.
    pub fn tracked(&self) -> u64 {
        self.tracked
    }

    /// Reserved units an untracked release may draw from.
    pub fn untracked(&self) -> u64 {
        self.reserved - self.tracked
    }

    pub fn warehouse_id(&self) -> &str {
        &self.warehouse_id
    }

    pub fn reorder_point(&self) -> u64 {
        self.reorder_point
    }

    pub fn reorder_quantity(&self) -> u64 {
        self.reorder_quantity
    }

    pub fn last_updated(&self) -> DateTime<Utc> {
        self.last_updated
    }

    pub fn levels(&self) -> StockLevels {
        StockLevels {
            available: self.available,
            reserved: self.reserved,
        }
    }

    /// Advisory only: nothing reorders automatically.
    pub fn needs_reorder(&self) -> bool {
        self.available <= self.reorder_point
    }

    /// Move `quantity` units from available to reserved.
    ///
    /// Fails with `InsufficientStock` (and leaves the record untouched) when
    /// `quantity` is zero or exceeds `available`.
    pub fn reserve(
        &mut self,
        quantity: u64,
        hold: Hold,
        at: DateTime<Utc>,
    ) -> InventoryResult<StockLevels> {
        if quantity == 0 || self.available < quantity {
            return Err(InventoryError::InsufficientStock {
                available: self.available,
                requested: quantity,
            });
        }

        self.available -= quantity;
        self.reserved += quantity;
        if hold == Hold::Tracked {
            self.tracked += quantity;
        }
        self.last_updated = at;
        Ok(self.levels())
    }

    /// Move `quantity` units from reserved back to available.
    ///
    /// Fails with `InsufficientReserved` (and leaves the record untouched) when
    /// `quantity` is zero or exceeds the reserved share named by `hold`. The
    /// error reports that share, not the whole `reserved` counter.
    pub fn release(
        &mut self,
        quantity: u64,
        hold: Hold,
        at: DateTime<Utc>,
    ) -> InventoryResult<StockLevels> {
        let releasable = match hold {
            Hold::Tracked => self.tracked,
            Hold::Untracked => self.untracked(),
        };
        if quantity == 0 || releasable < quantity {
            return Err(InventoryError::InsufficientReserved {
                reserved: releasable,
                requested: quantity,
            });
        }

        self.reserved -= quantity;
        if hold == Hold::Tracked {
            self.tracked -= quantity;
        }
        self.available += quantity;
        self.last_updated = at;
        Ok(self.levels())
    }

    /// Check the counter invariant. Always true for records built through this API.
    pub fn is_consistent(&self) -> bool {
        self.available.checked_add(self.reserved) == Some(self.total) && self.tracked <= self.reserved
    }
}
