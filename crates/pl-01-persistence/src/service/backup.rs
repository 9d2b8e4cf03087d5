//! # Farm Store Service - Backup and Restore

use super::helpers::{insert_ops, scan_store};
use super::*;
use crate::domain::summaries::Snapshot;
use crate::domain::validation::validate_record;
use std::collections::BTreeSet;
use std::str::FromStr;

impl<O, TS> FarmStore<O, TS>
where
    O: StoreOpener,
    TS: TimeSource,
{
    /// Export every declared store. Stores without records export as empty.
    pub async fn backup(&self) -> Result<Snapshot, StoreError> {
        let backend = self.backend().await?;
        let kv = backend.read();

        let mut snapshot = Snapshot::new();
        for store in StoreName::ALL {
            let docs = scan_store(&*kv, store)?
                .into_iter()
                .map(|(_, doc)| doc)
                .collect();
            snapshot.insert(store.as_str().to_string(), docs);
        }
        drop(kv);

        let total: usize = snapshot.values().map(Vec::len).sum();
        tracing::info!("[pl-01] 💾 Backup exported {} records", total);
        Ok(snapshot)
    }

    /// Replace all stores with the contents of `snapshot`, atomically.
    ///
    /// Stores absent from the snapshot end up empty.
    ///
    /// ## Errors
    ///
    /// - `UnknownStore`: the snapshot names a store outside the schema
    /// - `MissingKey`: a record lacks its store's key
    /// - `DuplicateKey`: a store lists the same key twice
    /// - `InvalidRecord`: a record fails the checks `add` applies
    pub async fn restore(&self, snapshot: Snapshot) -> Result<(), StoreError> {
        let mut puts = Vec::new();
        for (name, docs) in &snapshot {
            let store = StoreName::from_str(name)?;
            let mut seen = BTreeSet::new();
            for doc in docs {
                let key = primary_key_of(store, doc)?;
                validate_record(store, doc)?;
                puts.extend(insert_ops(store, &key, doc)?);
                if !seen.insert(key.clone()) {
                    return Err(StoreError::DuplicateKey { store, key });
                }
            }
        }

        let backend = self.backend().await?;
        let mut kv = backend.write();

        let mut ops = Vec::new();
        for store in StoreName::ALL {
            ops.extend(
                kv.prefix_scan(&keyspace::store_prefix(store))?
                    .into_iter()
                    .map(|(key, _)| BatchOperation::delete(key)),
            );
        }
        let cleared = ops.len();
        ops.extend(
            kv.prefix_scan(keyspace::INDEX_PREFIX)?
                .into_iter()
                .map(|(key, _)| BatchOperation::delete(key)),
        );
        let restored: usize = snapshot.values().map(Vec::len).sum();
        ops.extend(puts);
        kv.atomic_batch_write(ops)?;
        drop(kv);

        tracing::info!(
            "[pl-01] 🔄 Restore replaced {} records with {}",
            cleared,
            restored
        );
        Ok(())
    }
}
