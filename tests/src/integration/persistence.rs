//! # Persistence Flows
//!
//! The single-file backend across process-like restarts, and snapshots
//! moved between backends.

#[cfg(test)]
mod tests {
    use chrono::Duration;
    use serde_json::json;

    use pl_01_persistence::{FarmStoreApi, FarmStoreConfig, FileFarmStore, StoreError, TimeSource};
    use shared_schema::{Document, RecordKey, StoreName, TransactionDraft, TransactionKind};

    use crate::fixtures::{empty_store, item};

    fn doc(value: serde_json::Value) -> Document {
        value.as_object().cloned().unwrap()
    }

    fn unseeded() -> FarmStoreConfig {
        FarmStoreConfig::default().with_seed_demo_data(false)
    }

    #[tokio::test]
    async fn test_records_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();

        {
            let store = FileFarmStore::open_dir(dir.path(), unseeded());
            store.add(StoreName::Inventory, item(1, 80.0, 10.0, 3.0)).await.unwrap();
            store
                .add(
                    StoreName::Flocks,
                    doc(json!({"id": 4, "status": "active", "count": 950, "initialCount": 1000})),
                )
                .await
                .unwrap();
            store
                .update_inventory_quantity(&RecordKey::Int(1), -30.0, "feeding")
                .await
                .unwrap();
        }

        let store = FileFarmStore::open_dir(dir.path(), unseeded());
        let flocks = store.get_active_flocks().await.unwrap();
        assert_eq!(flocks.len(), 1);
        assert_eq!(store.get_inventory_value().await.unwrap(), 150.0);
        assert_eq!(store.count(StoreName::Transactions, None, None).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_demo_stock_seeded_only_on_creation() {
        let dir = tempfile::tempdir().unwrap();

        {
            let store = FileFarmStore::open_dir(dir.path(), FarmStoreConfig::default());
            store.initialize().await.unwrap();
            assert_eq!(store.count(StoreName::Inventory, None, None).await.unwrap(), 2);
            store.delete(StoreName::Inventory, &RecordKey::Int(1)).await.unwrap();
        }

        let store = FileFarmStore::open_dir(dir.path(), FarmStoreConfig::default());
        store.initialize().await.unwrap();
        assert_eq!(store.count(StoreName::Inventory, None, None).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_held_directory_is_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let first = FileFarmStore::open_dir(dir.path(), unseeded());
        first.initialize().await.unwrap();

        let second = FileFarmStore::open_dir(dir.path(), unseeded());
        let err = second.initialize().await.unwrap_err();
        assert!(matches!(err, StoreError::StorageUnavailable { .. }));

        drop(first);
        second.initialize().await.unwrap();
    }

    #[tokio::test]
    async fn test_backup_moves_between_backends() {
        let dir = tempfile::tempdir().unwrap();
        let file_store = FileFarmStore::open_dir(dir.path(), FarmStoreConfig::default());
        file_store.set_budget(5000.0, 3000.0).await.unwrap();
        file_store
            .add_financial_transaction(
                TransactionDraft::new(TransactionKind::Sale, 120.0).with_category("eggs"),
            )
            .await
            .unwrap();
        let snapshot = file_store.backup().await.unwrap();

        let (memory_store, _) = empty_store();
        memory_store
            .add(StoreName::Inventory, item(77, 1.0, 1.0, 1.0))
            .await
            .unwrap();
        memory_store.restore(snapshot.clone()).await.unwrap();

        assert_eq!(memory_store.backup().await.unwrap(), snapshot);
        assert!(memory_store
            .get(StoreName::Inventory, &RecordKey::Int(77))
            .await
            .unwrap()
            .is_none());
        assert_eq!(memory_store.get_budget().await.unwrap().unwrap().income, 5000.0);
    }

    #[tokio::test]
    async fn test_financial_summary_of_income_and_expense() {
        let (store, clock) = empty_store();
        store
            .add_financial_transaction(TransactionDraft::new(TransactionKind::Income, 100.0))
            .await
            .unwrap();
        store
            .add_financial_transaction(
                TransactionDraft::new(TransactionKind::Expense, 40.0).with_category("feed"),
            )
            .await
            .unwrap();

        let now = clock.now();
        let summary = store
            .get_financial_summary(now - Duration::days(1), now + Duration::days(1))
            .await
            .unwrap();
        assert_eq!(summary.total_income, 100.0);
        assert_eq!(summary.total_expenses, 40.0);
        assert_eq!(summary.net_profit, 60.0);
        assert_eq!(summary.by_category.get("feed"), Some(&40.0));

        let before = store
            .get_financial_summary(now - Duration::days(10), now - Duration::days(5))
            .await
            .unwrap();
        assert_eq!(before.net_profit, 0.0);
    }
}
