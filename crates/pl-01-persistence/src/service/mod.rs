//! # Farm Store Service
//!
//! The document store implementing `FarmStoreApi`.
//!
//! ## Architecture
//!
//! This service:
//! 1. Opens its backend lazily, once, through a `StoreOpener`
//! 2. Records the schema and seeds a fresh database on first open
//! 3. Serializes access to the backend with a read/write lock; each
//!    operation holds the lock for its whole read-modify-write
//! 4. Writes every multi-record change as one atomic batch

mod api;
mod backup;
mod dashboard;
mod finance;
mod flocks;
mod helpers;
mod inventory;
mod quality;
mod records;

use crate::adapters::storage::{FileOpener, MemoryOpener};
use crate::adapters::time::SystemTimeSource;
use crate::domain::errors::StoreError;
use crate::domain::keyspace::{self, SchemaMetadata};
use crate::domain::query::primary_key_of;
use crate::ports::outbound::{BatchOperation, KeyValueStore, StoreOpener, TimeSource};
use helpers::{insert_ops, reindex_ops};
use parking_lot::RwLock;
use serde_json::json;
use shared_schema::{format_timestamp, Document, StoreName};
use std::path::PathBuf;
use std::sync::atomic::{AtomicI64, Ordering};
use tokio::sync::OnceCell;

/// Tunables of the farm store.
#[derive(Debug, Clone, PartialEq)]
pub struct FarmStoreConfig {
    /// Seed two demonstration feed items when the database is first created.
    pub seed_demo_data: bool,
    /// Horizon for the "expiring soon" count in the inventory summary.
    pub expiry_warning_days: i64,
    /// Window of the dashboard's trailing financial summary.
    pub dashboard_lookback_days: i64,
    /// Transactions listed under the dashboard's recent activity.
    pub recent_activity_limit: usize,
    /// Price per feed unit used to estimate a flock's feed cost.
    pub estimated_feed_price: f64,
}

impl Default for FarmStoreConfig {
    fn default() -> Self {
        Self {
            seed_demo_data: true,
            expiry_warning_days: 30,
            dashboard_lookback_days: 30,
            recent_activity_limit: 10,
            estimated_feed_price: 2.5,
        }
    }
}

impl FarmStoreConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_seed_demo_data(mut self, seed: bool) -> Self {
        self.seed_demo_data = seed;
        self
    }

    pub fn with_expiry_warning_days(mut self, days: i64) -> Self {
        self.expiry_warning_days = days;
        self
    }

    pub fn with_dashboard_lookback_days(mut self, days: i64) -> Self {
        self.dashboard_lookback_days = days;
        self
    }

    pub fn with_recent_activity_limit(mut self, limit: usize) -> Self {
        self.recent_activity_limit = limit;
        self
    }

    pub fn with_estimated_feed_price(mut self, price: f64) -> Self {
        self.estimated_feed_price = price;
        self
    }
}

/// Dependencies for FarmStore
pub struct FarmStoreDependencies<O, TS> {
    pub opener: O,
    pub time_source: TS,
}

/// The farm document store.
pub struct FarmStore<O, TS>
where
    O: StoreOpener,
    TS: TimeSource,
{
    opener: O,
    pub(crate) time_source: TS,
    pub(crate) config: FarmStoreConfig,
    /// Opened backend. Empty until the first successful `initialize`.
    backend: OnceCell<RwLock<O::Store>>,
    /// Last identifier handed out by `next_id`.
    last_id: AtomicI64,
}

impl<O, TS> FarmStore<O, TS>
where
    O: StoreOpener,
    TS: TimeSource,
{
    pub fn new(deps: FarmStoreDependencies<O, TS>, config: FarmStoreConfig) -> Self {
        Self {
            opener: deps.opener,
            time_source: deps.time_source,
            config,
            backend: OnceCell::new(),
            last_id: AtomicI64::new(0),
        }
    }

    pub fn config(&self) -> &FarmStoreConfig {
        &self.config
    }

    /// Whether the backend has been opened.
    pub fn is_initialized(&self) -> bool {
        self.backend.initialized()
    }

    /// The opened backend, opening it on first use.
    ///
    /// Concurrent first callers wait on the same open. A failed open leaves
    /// the cell empty, so the next call tries again.
    pub(crate) async fn backend(&self) -> Result<&RwLock<O::Store>, StoreError> {
        self.backend
            .get_or_try_init(|| async { self.open_backend() })
            .await
    }

    fn open_backend(&self) -> Result<RwLock<O::Store>, StoreError> {
        let location = self.opener.describe();
        let mut kv = self.opener.open().map_err(|e| {
            tracing::error!("[pl-01] ❌ Failed to open database at {}: {}", location, e);
            StoreError::StorageUnavailable {
                message: e.to_string(),
            }
        })?;
        self.ensure_schema(&mut kv)?;
        tracing::info!("[pl-01] ✅ Database ready ({})", location);
        Ok(RwLock::new(kv))
    }

    /// Record the schema on a fresh database, or upgrade an older one.
    fn ensure_schema(&self, kv: &mut O::Store) -> Result<(), StoreError> {
        let now = format_timestamp(self.time_source.now());
        let existing = kv
            .get(&keyspace::schema_key())?
            .map(|raw| serde_json::from_slice::<SchemaMetadata>(&raw))
            .transpose()?;

        match existing {
            None => {
                tracing::info!(
                    "[pl-01] 🔄 Creating database schema v{}",
                    shared_schema::SCHEMA_VERSION
                );
                let mut ops = vec![BatchOperation::put(
                    keyspace::schema_key(),
                    serde_json::to_vec(&SchemaMetadata::current(now.clone()))?,
                )];
                if self.config.seed_demo_data {
                    for item in demo_inventory(&now) {
                        let key = primary_key_of(StoreName::Inventory, &item)?;
                        ops.extend(insert_ops(StoreName::Inventory, &key, &item)?);
                    }
                }
                kv.atomic_batch_write(ops)?;
            }
            Some(meta) if !meta.is_current() || !meta.indexed => {
                tracing::info!(
                    "[pl-01] 🔄 Upgrading database schema v{} -> v{} and rebuilding indexes",
                    meta.version,
                    shared_schema::SCHEMA_VERSION
                );
                let mut upgraded = SchemaMetadata::current(meta.created_at);
                upgraded.upgraded_at = Some(now);
                let mut ops = reindex_ops(&*kv)?;
                ops.push(BatchOperation::put(
                    keyspace::schema_key(),
                    serde_json::to_vec(&upgraded)?,
                ));
                kv.atomic_batch_write(ops)?;
            }
            Some(_) => {}
        }
        Ok(())
    }

    /// Next record identifier: the current time in milliseconds, bumped past
    /// the last one handed out so that ids never repeat within a process.
    pub(crate) fn next_id(&self) -> i64 {
        let now = self.time_source.now().timestamp_millis();
        let mut last = self.last_id.load(Ordering::Acquire);
        loop {
            let candidate = now.max(last + 1);
            match self.last_id.compare_exchange_weak(
                last,
                candidate,
                Ordering::AcqRel,
                Ordering::Acquire,
            ) {
                Ok(_) => return candidate,
                Err(actual) => last = actual,
            }
        }
    }

    pub(crate) fn now_iso(&self) -> String {
        format_timestamp(self.time_source.now())
    }
}

impl FarmStore<MemoryOpener, SystemTimeSource> {
    /// Ephemeral store with default configuration.
    pub fn in_memory() -> Self {
        Self::new(
            FarmStoreDependencies {
                opener: MemoryOpener,
                time_source: SystemTimeSource,
            },
            FarmStoreConfig::default(),
        )
    }
}

impl FarmStore<FileOpener, SystemTimeSource> {
    /// File-backed store in `data_dir`.
    pub fn open_dir(data_dir: impl Into<PathBuf>, config: FarmStoreConfig) -> Self {
        Self::new(
            FarmStoreDependencies {
                opener: FileOpener::new(data_dir),
                time_source: SystemTimeSource,
            },
            config,
        )
    }
}

/// Demonstration stock written into a newly created database.
fn demo_inventory(now: &str) -> Vec<Document> {
    let items = [
        json!({
            "id": 1,
            "name": "Starter feed",
            "sku": "FED-001",
            "category": "feed",
            "qty": 2000,
            "unit": "kg",
            "minStock": 500,
            "maxStock": 3000,
            "price": 2.5,
            "supplier": "United Feed Co.",
            "location": "Warehouse A",
            "batchNumber": "BATCH-2024-001",
            "expiryDate": "2024-12-31",
            "lastUpdated": now,
        }),
        json!({
            "id": 2,
            "name": "Finisher feed",
            "sku": "FED-002",
            "category": "feed",
            "qty": 1500,
            "unit": "kg",
            "minStock": 400,
            "maxStock": 2500,
            "price": 2.3,
            "supplier": "United Feed Co.",
            "location": "Warehouse A",
            "batchNumber": "BATCH-2024-002",
            "expiryDate": "2024-12-31",
            "lastUpdated": now,
        }),
    ];
    items
        .into_iter()
        .filter_map(|value| match value {
            serde_json::Value::Object(map) => Some(map),
            _ => None,
        })
        .collect()
}
