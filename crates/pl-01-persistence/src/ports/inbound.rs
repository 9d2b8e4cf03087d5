//! # Inbound Ports (Driving Ports)
//!
//! The primary API of the farm document store.
//!
//! Every operation initializes the store on first use. Reads of a missing
//! record return `None`; only domain operations that need a record report
//! `RecordNotFound`.

use crate::domain::errors::StoreError;
use crate::domain::summaries::{
    ComplianceReport, DashboardStats, FinancialSummary, FlockPerformance, InventorySummary,
    Snapshot,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use shared_schema::{
    Budget, Document, Flock, FlockStatus, IndexKey, InventoryItem, KeyRange, QualityCheck,
    QualityCheckDraft, QualityIssue, RecordKey, StoreName, Transaction, TransactionDraft,
};

/// Primary API of the farm document store.
#[async_trait]
pub trait FarmStoreApi: Send + Sync {
    // -------------------------------------------------------------------------
    // Lifecycle
    // -------------------------------------------------------------------------

    /// Open the backend, record the schema and seed a fresh database.
    ///
    /// Idempotent. Concurrent callers share one pending initialization.
    ///
    /// ## Errors
    ///
    /// - `StorageUnavailable`: the backend could not be opened (retried on
    ///   the next call)
    async fn initialize(&self) -> Result<(), StoreError>;

    // -------------------------------------------------------------------------
    // Generic CRUD
    // -------------------------------------------------------------------------

    /// Insert a record. Fails with `DuplicateKey` if its key exists, and
    /// with `InvalidRecord` if it does not fit the store's entity.
    async fn add(&self, store: StoreName, record: Document) -> Result<RecordKey, StoreError>;

    /// Insert or replace a record. Validated like `add`.
    async fn put(&self, store: StoreName, record: Document) -> Result<RecordKey, StoreError>;

    async fn get(&self, store: StoreName, key: &RecordKey) -> Result<Option<Document>, StoreError>;

    /// All records, optionally filtered by an index and a range over it.
    ///
    /// Without an index, records are in primary-key order and `range`
    /// applies to the primary key. With one, only the stored index entries
    /// inside `range` are read, and records come back in index order.
    /// Records without a value for the index are not listed.
    async fn get_all(
        &self,
        store: StoreName,
        index: Option<&str>,
        range: Option<KeyRange>,
    ) -> Result<Vec<Document>, StoreError>;

    /// Remove a record. Returns `true` whether or not it existed.
    async fn delete(&self, store: StoreName, key: &RecordKey) -> Result<bool, StoreError>;

    /// Number of records, or of records whose `index` value equals `key`.
    async fn count(
        &self,
        store: StoreName,
        index: Option<&str>,
        key: Option<IndexKey>,
    ) -> Result<usize, StoreError>;

    // -------------------------------------------------------------------------
    // Inventory
    // -------------------------------------------------------------------------

    /// Apply `delta` to an item's quantity and record an audit transaction.
    ///
    /// ## Errors
    ///
    /// - `RecordNotFound`: no such item
    /// - `NegativeQuantity`: the result would be below zero (nothing written)
    async fn update_inventory_quantity(
        &self,
        item_id: &RecordKey,
        delta: f64,
        reason: &str,
    ) -> Result<InventoryItem, StoreError>;

    /// Items with `qty <= minStock`.
    async fn get_low_stock_items(&self) -> Result<Vec<InventoryItem>, StoreError>;

    /// Items expiring between now and `within_days` from now.
    async fn get_expiring_items(&self, within_days: i64) -> Result<Vec<InventoryItem>, StoreError>;

    async fn get_inventory_value(&self) -> Result<f64, StoreError>;

    async fn get_inventory_summary(&self) -> Result<InventorySummary, StoreError>;

    // -------------------------------------------------------------------------
    // Finance
    // -------------------------------------------------------------------------

    /// Totals over transactions dated within `[start, end]`.
    async fn get_financial_summary(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<FinancialSummary, StoreError>;

    /// Persist a transaction together with the stock movement it implies.
    ///
    /// The transaction, the item update and its audit record are written in
    /// one atomic batch.
    async fn add_financial_transaction(
        &self,
        draft: TransactionDraft,
    ) -> Result<Transaction, StoreError>;

    async fn get_budget(&self) -> Result<Option<Budget>, StoreError>;

    async fn set_budget(&self, income: f64, expenses: f64) -> Result<Budget, StoreError>;

    // -------------------------------------------------------------------------
    // Flocks
    // -------------------------------------------------------------------------

    async fn get_active_flocks(&self) -> Result<Vec<Flock>, StoreError>;

    async fn get_flocks_by_status(&self, status: FlockStatus) -> Result<Vec<Flock>, StoreError>;

    /// Feed, mortality and age figures, or `None` if the flock is unknown.
    async fn get_flock_performance(
        &self,
        flock_id: &RecordKey,
    ) -> Result<Option<FlockPerformance>, StoreError>;

    // -------------------------------------------------------------------------
    // Quality
    // -------------------------------------------------------------------------

    /// Persist a check; a failed check also opens a high-severity issue.
    async fn record_quality_check(
        &self,
        draft: QualityCheckDraft,
    ) -> Result<QualityCheck, StoreError>;

    async fn resolve_quality_issue(&self, issue_id: &RecordKey)
        -> Result<QualityIssue, StoreError>;

    async fn get_compliance(&self) -> Result<ComplianceReport, StoreError>;

    // -------------------------------------------------------------------------
    // Dashboard and backup
    // -------------------------------------------------------------------------

    async fn get_dashboard_stats(&self) -> Result<DashboardStats, StoreError>;

    /// Export every declared store.
    async fn backup(&self) -> Result<Snapshot, StoreError>;

    /// Replace the contents of every declared store with `snapshot`.
    ///
    /// The snapshot is validated first; on error nothing is changed.
    async fn restore(&self, snapshot: Snapshot) -> Result<(), StoreError>;
}
