//! Initial stock records: the built-in demo catalogue, or a JSON seed file.

use chrono::{DateTime, Utc};
use serde::Deserialize;

use stockroom_core::{InventoryError, InventoryResult, ProductId};
use stockroom_inventory::StockRecord;

/// One entry of a seed file.
///
/// `total` may be omitted; when present it must equal `available + reserved`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct StockSeed {
    pub product_id: ProductId,
    pub available: u64,
    #[serde(default)]
    pub reserved: u64,
    #[serde(default)]
    pub total: Option<u64>,
    #[serde(default)]
    pub warehouse_id: String,
    #[serde(default)]
    pub reorder_point: u64,
    #[serde(default)]
    pub reorder_quantity: u64,
}

impl StockSeed {
    pub fn into_record(self, at: DateTime<Utc>) -> InventoryResult<StockRecord> {
        let record = StockRecord::new(self.product_id, self.available, self.reserved, at)?
            .with_warehouse(self.warehouse_id)
            .with_reorder(self.reorder_point, self.reorder_quantity);
        if let Some(total) = self.total {
            if total != record.total() {
                return Err(InventoryError::invalid(format!(
                    "seed for {}: total {total} != available {} + reserved {}",
                    record.product_id(),
                    record.available(),
                    record.reserved()
                )));
            }
        }
        Ok(record)
    }
}

/// Parse a JSON array of [`StockSeed`] entries into validated records.
///
/// Duplicate product ids are rejected rather than silently overwritten.
pub fn parse_seed_json(json: &str, at: DateTime<Utc>) -> InventoryResult<Vec<StockRecord>> {
    let seeds: Vec<StockSeed> = serde_json::from_str(json)
        .map_err(|e| InventoryError::invalid(format!("malformed seed file: {e}")))?;

    let mut records: Vec<StockRecord> = Vec::with_capacity(seeds.len());
    for seed in seeds {
        let record = seed.into_record(at)?;
        if records.iter().any(|r| r.product_id() == record.product_id()) {
            return Err(InventoryError::invalid(format!(
                "duplicate product in seed file: {}",
                record.product_id()
            )));
        }
        records.push(record);
    }
    Ok(records)
}

/// Demo catalogue loaded when no seed file is configured.
pub fn demo_catalogue(at: DateTime<Utc>) -> InventoryResult<Vec<StockRecord>> {
    let entries = [
        ("product-123", 100, 5, "warehouse-001", 20, 50),
        ("product-456", 250, 10, "warehouse-001", 50, 100),
        ("product-789", 50, 2, "warehouse-002", 10, 30),
    ];
    entries
        .into_iter()
        .map(|(id, available, reserved, warehouse, point, qty)| -> InventoryResult<StockRecord> {
            Ok(StockRecord::new(ProductId::new(id), available, reserved, at)?
                .with_warehouse(warehouse)
                .with_reorder(point, qty))
        })
        .collect()
}
