//! # Farm Store API Implementation
//!
//! Implements `FarmStoreApi` by delegating to the inherent operations.

use super::*;
use crate::domain::summaries::{
    ComplianceReport, DashboardStats, FinancialSummary, FlockPerformance, InventorySummary,
    Snapshot,
};
use crate::ports::inbound::FarmStoreApi;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use shared_schema::{
    Budget, Flock, FlockStatus, IndexKey, InventoryItem, KeyRange, QualityCheck,
    QualityCheckDraft, QualityIssue, RecordKey, Transaction, TransactionDraft,
};

#[async_trait]
impl<O, TS> FarmStoreApi for FarmStore<O, TS>
where
    O: StoreOpener,
    TS: TimeSource,
{
    async fn initialize(&self) -> Result<(), StoreError> {
        FarmStore::initialize(self).await
    }

    async fn add(&self, store: StoreName, record: Document) -> Result<RecordKey, StoreError> {
        FarmStore::add(self, store, record).await
    }

    async fn put(&self, store: StoreName, record: Document) -> Result<RecordKey, StoreError> {
        FarmStore::put(self, store, record).await
    }

    async fn get(&self, store: StoreName, key: &RecordKey) -> Result<Option<Document>, StoreError> {
        FarmStore::get(self, store, key).await
    }

    async fn get_all(
        &self,
        store: StoreName,
        index: Option<&str>,
        range: Option<KeyRange>,
    ) -> Result<Vec<Document>, StoreError> {
        FarmStore::get_all(self, store, index, range).await
    }

    async fn delete(&self, store: StoreName, key: &RecordKey) -> Result<bool, StoreError> {
        FarmStore::delete(self, store, key).await
    }

    async fn count(
        &self,
        store: StoreName,
        index: Option<&str>,
        key: Option<IndexKey>,
    ) -> Result<usize, StoreError> {
        FarmStore::count(self, store, index, key).await
    }

    async fn update_inventory_quantity(
        &self,
        item_id: &RecordKey,
        delta: f64,
        reason: &str,
    ) -> Result<InventoryItem, StoreError> {
        FarmStore::update_inventory_quantity(self, item_id, delta, reason).await
    }

    async fn get_low_stock_items(&self) -> Result<Vec<InventoryItem>, StoreError> {
        FarmStore::get_low_stock_items(self).await
    }

    async fn get_expiring_items(&self, within_days: i64) -> Result<Vec<InventoryItem>, StoreError> {
        FarmStore::get_expiring_items(self, within_days).await
    }

    async fn get_inventory_value(&self) -> Result<f64, StoreError> {
        FarmStore::get_inventory_value(self).await
    }

    async fn get_inventory_summary(&self) -> Result<InventorySummary, StoreError> {
        FarmStore::get_inventory_summary(self).await
    }

    async fn get_financial_summary(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<FinancialSummary, StoreError> {
        FarmStore::get_financial_summary(self, start, end).await
    }

    async fn add_financial_transaction(
        &self,
        draft: TransactionDraft,
    ) -> Result<Transaction, StoreError> {
        FarmStore::add_financial_transaction(self, draft).await
    }

    async fn get_budget(&self) -> Result<Option<Budget>, StoreError> {
        FarmStore::get_budget(self).await
    }

    async fn set_budget(&self, income: f64, expenses: f64) -> Result<Budget, StoreError> {
        FarmStore::set_budget(self, income, expenses).await
    }

    async fn get_active_flocks(&self) -> Result<Vec<Flock>, StoreError> {
        FarmStore::get_active_flocks(self).await
    }

    async fn get_flocks_by_status(&self, status: FlockStatus) -> Result<Vec<Flock>, StoreError> {
        FarmStore::get_flocks_by_status(self, status).await
    }

    async fn get_flock_performance(
        &self,
        flock_id: &RecordKey,
    ) -> Result<Option<FlockPerformance>, StoreError> {
        FarmStore::get_flock_performance(self, flock_id).await
    }

    async fn record_quality_check(
        &self,
        draft: QualityCheckDraft,
    ) -> Result<QualityCheck, StoreError> {
        FarmStore::record_quality_check(self, draft).await
    }

    async fn resolve_quality_issue(
        &self,
        issue_id: &RecordKey,
    ) -> Result<QualityIssue, StoreError> {
        FarmStore::resolve_quality_issue(self, issue_id).await
    }

    async fn get_compliance(&self) -> Result<ComplianceReport, StoreError> {
        FarmStore::get_compliance(self).await
    }

    async fn get_dashboard_stats(&self) -> Result<DashboardStats, StoreError> {
        FarmStore::get_dashboard_stats(self).await
    }

    async fn backup(&self) -> Result<Snapshot, StoreError> {
        FarmStore::backup(self).await
    }

    async fn restore(&self, snapshot: Snapshot) -> Result<(), StoreError> {
        FarmStore::restore(self, snapshot).await
    }
}
