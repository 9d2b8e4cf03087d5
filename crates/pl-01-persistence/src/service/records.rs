//! # Farm Store Service - Generic CRUD
//!
//! Store-agnostic operations over JSON documents.

use super::helpers::{
    delete_ops, index_count, index_scan, insert_ops, put_ops, read_doc, scan_store,
};
use super::*;
use crate::domain::query::filter_by_primary_key;
use crate::domain::validation::validate_record;
use shared_schema::{IndexKey, KeyRange, RecordKey};

impl<O, TS> FarmStore<O, TS>
where
    O: StoreOpener,
    TS: TimeSource,
{
    /// Open the backend if needed. See `FarmStoreApi::initialize`.
    pub async fn initialize(&self) -> Result<(), StoreError> {
        self.backend().await.map(|_| ())
    }

    pub async fn add(&self, store: StoreName, record: Document) -> Result<RecordKey, StoreError> {
        let key = primary_key_of(store, &record)?;
        validate_record(store, &record)?;
        let backend = self.backend().await?;
        let mut kv = backend.write();

        if kv.exists(&keyspace::record_key(store, &key))? {
            return Err(StoreError::DuplicateKey { store, key });
        }
        kv.atomic_batch_write(insert_ops(store, &key, &record)?)?;
        tracing::debug!(store = %store, key = %key, "[pl-01] Added record");
        Ok(key)
    }

    pub async fn put(&self, store: StoreName, record: Document) -> Result<RecordKey, StoreError> {
        let key = primary_key_of(store, &record)?;
        validate_record(store, &record)?;
        let backend = self.backend().await?;
        let mut kv = backend.write();
        let ops = put_ops(&*kv, store, &key, &record)?;
        kv.atomic_batch_write(ops)?;
        tracing::debug!(store = %store, key = %key, "[pl-01] Stored record");
        Ok(key)
    }

    pub async fn get(
        &self,
        store: StoreName,
        key: &RecordKey,
    ) -> Result<Option<Document>, StoreError> {
        let backend = self.backend().await?;
        let kv = backend.read();
        read_doc(&*kv, store, key)
    }

    pub async fn get_all(
        &self,
        store: StoreName,
        index: Option<&str>,
        range: Option<KeyRange>,
    ) -> Result<Vec<Document>, StoreError> {
        let backend = self.backend().await?;
        let kv = backend.read();
        match index {
            Some(index) => index_scan(&*kv, store, index, range.as_ref()),
            None => Ok(filter_by_primary_key(
                scan_store(&*kv, store)?,
                range.as_ref(),
            )),
        }
    }

    pub async fn delete(&self, store: StoreName, key: &RecordKey) -> Result<bool, StoreError> {
        let backend = self.backend().await?;
        let mut kv = backend.write();
        let ops = delete_ops(&*kv, store, key)?;
        if !ops.is_empty() {
            kv.atomic_batch_write(ops)?;
        }
        tracing::debug!(store = %store, key = %key, "[pl-01] Deleted record");
        Ok(true)
    }

    pub async fn count(
        &self,
        store: StoreName,
        index: Option<&str>,
        key: Option<IndexKey>,
    ) -> Result<usize, StoreError> {
        let backend = self.backend().await?;
        let kv = backend.read();
        match index {
            // Without a key, records lacking an indexable value are not counted.
            Some(index) => index_count(&*kv, store, index, key.map(KeyRange::only).as_ref()),
            None => Ok(kv.prefix_scan(&keyspace::store_prefix(store))?.len()),
        }
    }
}
