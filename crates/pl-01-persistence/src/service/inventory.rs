//! # Farm Store Service - Inventory
//!
//! Stock movements and inventory figures. A movement always writes the
//! updated item and its audit transaction together.

use super::helpers::{put_ops, read_doc, scan_store};
use super::*;
use crate::domain::summaries::{self, InventorySummary};
use crate::domain::validation::decode_records;
use serde_json::Value;
use shared_schema::{from_document, to_document, InventoryItem, RecordKey, Transaction, TransactionKind};

/// Author recorded on audit transactions.
const AUDIT_USER: &str = "system";

impl<O, TS> FarmStore<O, TS>
where
    O: StoreOpener,
    TS: TimeSource,
{
    pub async fn update_inventory_quantity(
        &self,
        item_id: &RecordKey,
        delta: f64,
        reason: &str,
    ) -> Result<InventoryItem, StoreError> {
        let backend = self.backend().await?;
        // Held across read-modify-write so concurrent movements cannot lose updates.
        let mut kv = backend.write();

        let (ops, item) = self.stock_movement(&*kv, item_id, delta, reason)?;
        kv.atomic_batch_write(ops)?;
        drop(kv);

        tracing::info!(
            item = %item_id,
            delta,
            reason,
            "[pl-01] 📦 Stock of '{}' now {}",
            item.name,
            item.qty
        );
        Ok(item)
    }

    /// Batch operations moving `item_id` by `delta`: the updated item and an
    /// audit transaction. Nothing is written here.
    ///
    /// ## Errors
    ///
    /// - `RecordNotFound`: no such item
    /// - `InvalidRecord`: the stored item has no numeric quantity
    /// - `NegativeQuantity`: the movement would take stock below zero
    pub(crate) fn stock_movement<K: KeyValueStore + ?Sized>(
        &self,
        kv: &K,
        item_id: &RecordKey,
        delta: f64,
        reason: &str,
    ) -> Result<(Vec<BatchOperation>, InventoryItem), StoreError> {
        if !delta.is_finite() {
            return Err(StoreError::InvalidRecord(format!(
                "quantity change must be a finite number, got {delta}"
            )));
        }
        let mut doc = read_doc(kv, StoreName::Inventory, item_id)?.ok_or_else(|| {
            StoreError::RecordNotFound {
                store: StoreName::Inventory,
                key: item_id.clone(),
            }
        })?;

        let previous_qty = doc.get("qty").and_then(Value::as_f64).ok_or_else(|| {
            StoreError::InvalidRecord(format!(
                "inventory item {} has no numeric quantity to move",
                item_id
            ))
        })?;
        let new_qty = previous_qty + delta;
        if new_qty < 0.0 {
            tracing::warn!(
                item = %item_id,
                previous_qty,
                delta,
                "[pl-01] Rejected stock movement below zero"
            );
            return Err(StoreError::NegativeQuantity {
                item_id: item_id.clone(),
                current: previous_qty,
                delta,
            });
        }

        let now = self.now_iso();
        doc.insert("qty".into(), Value::from(new_qty));
        doc.insert("lastUpdated".into(), Value::from(now.clone()));
        let item: InventoryItem = from_document(&doc)?;

        let audit = Transaction {
            id: RecordKey::Int(self.next_id()),
            kind: TransactionKind::Inventory,
            subtype: Some(reason.to_string()),
            amount: 0.0,
            quantity: None,
            category: None,
            description: None,
            date: now,
            created_at: None,
            item_id: Some(item_id.clone()),
            item_name: Some(item.name.clone()),
            change: Some(delta),
            previous_qty: Some(previous_qty),
            new_qty: Some(new_qty),
            flock_id: None,
            user_id: Some(AUDIT_USER.to_string()),
        };

        let mut ops = put_ops(kv, StoreName::Inventory, item_id, &doc)?;
        ops.extend(put_ops(
            kv,
            StoreName::Transactions,
            &audit.id,
            &to_document(&audit)?,
        )?);
        Ok((ops, item))
    }

    /// Every inventory item, decoded.
    pub(crate) async fn inventory_items(&self) -> Result<Vec<InventoryItem>, StoreError> {
        let backend = self.backend().await?;
        let records = scan_store(&*backend.read(), StoreName::Inventory)?;
        decode_records(
            StoreName::Inventory,
            records.into_iter().map(|(_, doc)| doc),
        )
    }

    pub async fn get_low_stock_items(&self) -> Result<Vec<InventoryItem>, StoreError> {
        let mut items = self.inventory_items().await?;
        items.retain(InventoryItem::is_low_stock);
        Ok(items)
    }

    pub async fn get_expiring_items(
        &self,
        within_days: i64,
    ) -> Result<Vec<InventoryItem>, StoreError> {
        let items = self.inventory_items().await?;
        Ok(summaries::expiring_within(
            items,
            self.time_source.now(),
            within_days,
        ))
    }

    pub async fn get_inventory_value(&self) -> Result<f64, StoreError> {
        Ok(summaries::inventory_value(&self.inventory_items().await?))
    }

    pub async fn get_inventory_summary(&self) -> Result<InventorySummary, StoreError> {
        let items = self.inventory_items().await?;
        Ok(InventorySummary::compute(
            &items,
            self.time_source.now(),
            self.config.expiry_warning_days,
        ))
    }
}
