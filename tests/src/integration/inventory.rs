//! # Inventory Properties
//!
//! Stock behaviour over randomly generated items and movements.
//!
//! - Accepted movements sum exactly into the stored quantity
//! - Rejected movements leave the quantity and the audit trail untouched
//! - Low-stock selection equals the `qty <= minStock` subset

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;
    use std::sync::Arc;

    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    use pl_01_persistence::{FarmStoreApi, StoreError};
    use shared_schema::{
        from_document, InventoryItem, KeyRange, RecordKey, StoreName, TransactionDraft,
        TransactionKind,
    };

    use crate::fixtures::{empty_store, item};

    async fn stored_qty(store: &dyn FarmStoreApi, id: i64) -> f64 {
        let doc = store
            .get(StoreName::Inventory, &RecordKey::Int(id))
            .await
            .unwrap()
            .unwrap();
        from_document::<InventoryItem>(&doc).unwrap().qty
    }

    #[tokio::test]
    async fn test_random_movements_conserve_quantity() {
        let (store, _) = empty_store();
        store.add(StoreName::Inventory, item(1, 100.0, 20.0, 1.5)).await.unwrap();

        let mut rng = StdRng::seed_from_u64(0x5eed);
        let mut expected = 100.0;
        let mut accepted = 0;

        for _ in 0..300 {
            let delta = f64::from(rng.gen_range(-60..=60_i32));
            let result = store
                .update_inventory_quantity(&RecordKey::Int(1), delta, "random")
                .await;

            if expected + delta < 0.0 {
                assert!(
                    matches!(result, Err(StoreError::NegativeQuantity { .. })),
                    "delta {} from {} should be rejected",
                    delta,
                    expected
                );
            } else {
                assert_eq!(result.unwrap().qty, expected + delta);
                expected += delta;
                accepted += 1;
            }
            assert_eq!(stored_qty(&store, 1).await, expected);
        }

        let audits = store
            .count(StoreName::Transactions, Some("type"), Some("inventory".into()))
            .await
            .unwrap();
        assert_eq!(audits, accepted);
    }

    #[tokio::test]
    async fn test_concurrent_movements_on_many_items() {
        let (store, _) = empty_store();
        let store = Arc::new(store);
        for id in 1..=5 {
            store
                .add(StoreName::Inventory, item(id, 1000.0, 10.0, 1.0))
                .await
                .unwrap();
        }

        let mut rng = StdRng::seed_from_u64(7);
        let moves: Vec<(i64, f64)> = (0..100)
            .map(|_| (rng.gen_range(1..=5), f64::from(rng.gen_range(-20..=20_i32))))
            .collect();

        let handles: Vec<_> = moves
            .iter()
            .map(|&(id, delta)| {
                let store = store.clone();
                tokio::spawn(async move {
                    store
                        .update_inventory_quantity(&RecordKey::Int(id), delta, "sync")
                        .await
                })
            })
            .collect();
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        for id in 1..=5 {
            let net: f64 = moves.iter().filter(|(i, _)| *i == id).map(|(_, d)| d).sum();
            assert_eq!(stored_qty(store.as_ref(), id).await, 1000.0 + net);
        }
    }

    #[tokio::test]
    async fn test_low_stock_matches_filter_for_random_sets() {
        let mut rng = StdRng::seed_from_u64(42);

        for round in 0..5 {
            let (store, _) = empty_store();
            let mut expected = BTreeSet::new();

            for id in 1..=40 {
                let qty = f64::from(rng.gen_range(0..100_i32));
                let min_stock = f64::from(rng.gen_range(0..100_i32));
                if qty <= min_stock {
                    expected.insert(id);
                }
                store
                    .add(StoreName::Inventory, item(id, qty, min_stock, 1.0))
                    .await
                    .unwrap();
            }

            let low: BTreeSet<i64> = store
                .get_low_stock_items()
                .await
                .unwrap()
                .into_iter()
                .filter_map(|item| match item.id {
                    RecordKey::Int(id) => Some(id),
                    RecordKey::Text(_) => None,
                })
                .collect();
            assert_eq!(low, expected, "round {}", round);
        }
    }

    #[tokio::test]
    async fn test_documented_item_scenario() {
        let (store, _) = empty_store();
        store.add(StoreName::Inventory, item(1, 2000.0, 500.0, 2.5)).await.unwrap();

        assert_eq!(store.get_inventory_value().await.unwrap(), 5000.0);
        let err = store
            .update_inventory_quantity(&RecordKey::Int(1), -2500.0, "usage")
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::NegativeQuantity { .. }));
        assert_eq!(stored_qty(&store, 1).await, 2000.0);
        assert!(store.get_low_stock_items().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_purchase_restocks_item() {
        let (store, _) = empty_store();
        store.add(StoreName::Inventory, item(9, 40.0, 50.0, 2.5)).await.unwrap();
        assert_eq!(store.get_low_stock_items().await.unwrap().len(), 1);

        let tx = store
            .add_financial_transaction(
                TransactionDraft::new(TransactionKind::Purchase, 25.0).with_item(9, 10.0),
            )
            .await
            .unwrap();
        assert_eq!(tx.kind, TransactionKind::Purchase);

        assert_eq!(stored_qty(&store, 9).await, 50.0);
        let purchases = store
            .get_all(
                StoreName::Transactions,
                Some("type"),
                Some(KeyRange::only("purchase")),
            )
            .await
            .unwrap();
        assert_eq!(purchases.len(), 1);
        // Still at the threshold.
        assert_eq!(store.get_low_stock_items().await.unwrap().len(), 1);
    }
}
