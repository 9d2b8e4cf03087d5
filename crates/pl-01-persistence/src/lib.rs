//! # Farm Persistence Layer (pl-01)
//!
//! Embedded document store for the farm records: flocks, inventory,
//! transactions, health and environment data, quality checks and issues,
//! notifications, users and settings.
//!
//! ## Architecture
//!
//! ```text
//! State container / renderers
//!            │  FarmStoreApi (async)
//!            ▼
//!      FarmStore ── domain/ (keyspace, query, summaries, validation)
//!            │  KeyValueStore (bytes, atomic batches)
//!            ▼
//!  InMemoryKVStore │ FileBackedKVStore │ RocksDbStore
//! ```
//!
//! ## Guarantees
//!
//! | Guarantee | Description |
//! |-----------|-------------|
//! | Lazy, shared open | The backend is opened once; concurrent first callers share it |
//! | Retry on failure | A failed open surfaces as `StorageUnavailable` and is retried next call |
//! | Non-negative stock | Quantity updates below zero are rejected before any write |
//! | Valid records | Writes to typed stores must decode as the store's entity and keep its invariants |
//! | Stored indexes | Index entries are written in the same batch as their record; indexed reads scan only them |
//! | Atomic composites | Stock movements, paired transactions, failed checks and restores write one batch |
//! | Unique ids | Generated ids are strictly increasing within a process |
//!
//! ## Crate Structure (Hexagonal Architecture)
//!
//! - `domain/` - Errors, key layout, index selection, aggregate figures
//! - `ports/` - `FarmStoreApi` (inbound), `KeyValueStore`/`StoreOpener`/`TimeSource` (outbound)
//! - `adapters/` - Storage backends, process lock, clocks
//! - `service/` - `FarmStore`
//!
//! ## Usage
//!
//! ```ignore
//! use pl_01_persistence::{FarmStore, FarmStoreConfig};
//!
//! let store = FarmStore::open_dir("./data", FarmStoreConfig::default());
//! store.initialize().await?;
//! let low = store.get_low_stock_items().await?;
//! ```

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod service;

pub use adapters::{
    FileBackedKVStore, FileOpener, InMemoryKVStore, ManualClock, MemoryOpener, SystemTimeSource,
};
pub use domain::errors::{KVStoreError, StoreError};
pub use domain::validation::{decode_records, validate_record};
pub use domain::summaries::{
    ComplianceReport, DashboardStats, FinancialSummary, FlockPerformance, InventorySummary,
    Snapshot,
};
pub use ports::inbound::FarmStoreApi;
pub use ports::outbound::{BatchOperation, KeyValueStore, StoreOpener, TimeSource};
pub use service::{FarmStore, FarmStoreConfig, FarmStoreDependencies};

/// Farm store over the single-file backend and the wall clock.
pub type FileFarmStore = FarmStore<FileOpener, SystemTimeSource>;

/// Ephemeral farm store.
pub type MemoryFarmStore = FarmStore<MemoryOpener, SystemTimeSource>;
