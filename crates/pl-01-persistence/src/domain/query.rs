//! # Record Selection
//!
//! Key extraction and index checks. Indexed reads go through the stored
//! index entries (see `keyspace`); a bare range applies to the primary key
//! and filters records already returned in primary-key order.

use crate::domain::errors::StoreError;
use shared_schema::{Document, KeyRange, RecordKey, StoreName};

/// Primary key of `doc` under `store`'s key path.
pub fn primary_key_of(store: StoreName, doc: &Document) -> Result<RecordKey, StoreError> {
    let key_path = store.key_path();
    let value = doc
        .get(key_path)
        .ok_or(StoreError::MissingKey { store, key_path })?;
    if value.is_null() {
        return Err(StoreError::MissingKey { store, key_path });
    }
    Ok(RecordKey::from_value(value, key_path)?)
}

/// Reject index names the store does not declare.
pub fn check_index(store: StoreName, index: &str) -> Result<(), StoreError> {
    if store.has_index(index) {
        Ok(())
    } else {
        Err(StoreError::UnknownIndex {
            store,
            index: index.to_string(),
        })
    }
}

/// Keep the records whose primary key lies in `range`.
pub fn filter_by_primary_key(
    records: Vec<(RecordKey, Document)>,
    range: Option<&KeyRange>,
) -> Vec<Document> {
    records
        .into_iter()
        .filter(|(key, _)| range.map_or(true, |r| r.contains(&key.as_index_key())))
        .map(|(_, doc)| doc)
        .collect()
}
