//! Shared builders for the integration tests and benchmarks.

use std::sync::Arc;

use chrono::{TimeZone, Utc};
use pl_01_persistence::{FarmStore, FarmStoreConfig, FarmStoreDependencies, ManualClock, MemoryOpener};
use serde_json::json;
use shared_schema::Document;

/// In-memory store without demonstration data.
pub type TestStore = FarmStore<MemoryOpener, Arc<ManualClock>>;

/// Clock frozen at 2024-12-15 08:00 UTC.
pub fn frozen_clock() -> Arc<ManualClock> {
    Arc::new(ManualClock::new(
        Utc.with_ymd_and_hms(2024, 12, 15, 8, 0, 0)
            .single()
            .unwrap_or_else(Utc::now),
    ))
}

pub fn empty_store() -> (TestStore, Arc<ManualClock>) {
    let clock = frozen_clock();
    let store = FarmStore::new(
        FarmStoreDependencies {
            opener: MemoryOpener,
            time_source: clock.clone(),
        },
        FarmStoreConfig::default().with_seed_demo_data(false),
    );
    (store, clock)
}

/// An inventory record in the stored shape.
pub fn item(id: i64, qty: f64, min_stock: f64, price: f64) -> Document {
    let value = json!({
        "id": id,
        "name": format!("Item {}", id),
        "sku": format!("SKU-{:04}", id),
        "category": if id % 2 == 0 { "feed" } else { "medicine" },
        "qty": qty,
        "unit": "kg",
        "minStock": min_stock,
        "maxStock": min_stock * 10.0,
        "price": price,
        "supplier": "Local mill",
        "lastUpdated": "2024-12-15T08:00:00.000Z",
    });
    match value {
        serde_json::Value::Object(doc) => doc,
        _ => Document::new(),
    }
}
