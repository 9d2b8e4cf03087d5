//! # Farm Store Service - Finance
//!
//! Transactions, financial summaries and the monthly budget.

use super::helpers::{index_scan, put_ops, read_doc};
use super::*;
use crate::domain::summaries::FinancialSummary;
use crate::domain::validation::decode_records;
use chrono::{DateTime, Utc};
use serde_json::Value;
use shared_schema::{
    from_document, to_document, Budget, KeyRange, RecordKey, Transaction, TransactionDraft,
};

/// Settings entry holding the budget.
pub(crate) const BUDGET_KEY: &str = "budget";

impl<O, TS> FarmStore<O, TS>
where
    O: StoreOpener,
    TS: TimeSource,
{
    /// Transactions dated within `[start, end]`, in date order, read through
    /// the `date` index.
    pub(crate) fn transactions_between<K: KeyValueStore + ?Sized>(
        kv: &K,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Transaction>, StoreError> {
        let range = KeyRange::bound(format_timestamp(start), format_timestamp(end));
        let docs = index_scan(kv, StoreName::Transactions, "date", Some(&range))?;
        decode_records(StoreName::Transactions, docs)
    }

    pub async fn get_financial_summary(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<FinancialSummary, StoreError> {
        let backend = self.backend().await?;
        let transactions = Self::transactions_between(&*backend.read(), start, end)?;
        Ok(FinancialSummary::from_transactions(&transactions))
    }

    pub async fn add_financial_transaction(
        &self,
        draft: TransactionDraft,
    ) -> Result<Transaction, StoreError> {
        if !draft.amount.is_finite() {
            return Err(StoreError::InvalidRecord(format!(
                "amount must be a finite number, got {}",
                draft.amount
            )));
        }
        if draft.item_id.is_some() && draft.quantity.is_none() {
            return Err(StoreError::InvalidRecord(
                "a transaction linked to an item needs a quantity".to_string(),
            ));
        }

        let now = self.now_iso();
        let mut doc = to_document(&draft)?;
        // A caller-supplied id is kept; otherwise one is generated.
        if !doc.get("id").is_some_and(|v| !v.is_null()) {
            doc.insert("id".into(), Value::from(self.next_id()));
        }
        doc.insert("date".into(), Value::from(now.clone()));
        doc.insert("createdAt".into(), Value::from(now));
        let key = primary_key_of(StoreName::Transactions, &doc)?;
        let transaction: Transaction = from_document(&doc)?;

        let backend = self.backend().await?;
        let mut kv = backend.write();
        if kv.exists(&keyspace::record_key(StoreName::Transactions, &key))? {
            return Err(StoreError::DuplicateKey {
                store: StoreName::Transactions,
                key,
            });
        }

        let mut ops = put_ops(&*kv, StoreName::Transactions, &key, &doc)?;
        if let (Some(item_id), Some(delta)) = (draft.item_id.as_ref(), draft.stock_delta()) {
            let (movement, _) = self.stock_movement(&*kv, item_id, delta, draft.kind.as_str())?;
            ops.extend(movement);
        }
        kv.atomic_batch_write(ops)?;
        drop(kv);

        tracing::info!(
            id = %key,
            kind = %transaction.kind,
            amount = transaction.amount,
            "[pl-01] 💰 Recorded transaction"
        );
        Ok(transaction)
    }

    pub async fn get_budget(&self) -> Result<Option<Budget>, StoreError> {
        let backend = self.backend().await?;
        let doc = read_doc(&*backend.read(), StoreName::Settings, &RecordKey::from(BUDGET_KEY))?;
        doc.map(|d| from_document(&d).map_err(StoreError::from))
            .transpose()
    }

    pub async fn set_budget(&self, income: f64, expenses: f64) -> Result<Budget, StoreError> {
        let budget = Budget {
            income,
            expenses,
            updated_at: Some(self.now_iso()),
        };
        let mut doc = to_document(&budget)?;
        doc.insert("key".into(), Value::from(BUDGET_KEY));

        let backend = self.backend().await?;
        let mut kv = backend.write();
        let ops = put_ops(&*kv, StoreName::Settings, &RecordKey::from(BUDGET_KEY), &doc)?;
        kv.atomic_batch_write(ops)?;
        Ok(budget)
    }
}
