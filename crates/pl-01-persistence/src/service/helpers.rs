//! # Farm Store Service - Helpers
//!
//! Record encoding, index maintenance and lock-scoped reads shared by the
//! operations. All of these take the backend by reference, so callers decide
//! which lock they hold around them.
//!
//! Every write goes through `insert_ops`, `put_ops` or `delete_ops`, which
//! emit the record change and its index entries as one list of batch
//! operations.

use crate::domain::errors::StoreError;
use crate::domain::keyspace;
use crate::domain::query::check_index;
use crate::ports::outbound::{BatchOperation, KeyValueStore};
use shared_schema::{Document, IndexKey, KeyRange, RecordKey, StoreName};
use std::collections::BTreeSet;

pub(crate) fn encode(doc: &Document) -> Result<Vec<u8>, StoreError> {
    Ok(serde_json::to_vec(doc)?)
}

pub(crate) fn decode(raw: &[u8]) -> Result<Document, StoreError> {
    Ok(serde_json::from_slice(raw)?)
}

/// Index entry keys of `doc`: one per declared index holding an indexable
/// value.
pub(crate) fn index_entries(store: StoreName, key: &RecordKey, doc: &Document) -> Vec<Vec<u8>> {
    store
        .indexes()
        .iter()
        .filter_map(|index| {
            let value = doc.get(*index).and_then(IndexKey::from_value)?;
            Some(keyspace::index_entry_key(store, index, &value, key))
        })
        .collect()
}

/// Write `doc` under `key`, assuming nothing is stored there yet.
pub(crate) fn insert_ops(
    store: StoreName,
    key: &RecordKey,
    doc: &Document,
) -> Result<Vec<BatchOperation>, StoreError> {
    let pointer = key.encode();
    let mut ops = vec![BatchOperation::put(
        keyspace::record_key(store, key),
        encode(doc)?,
    )];
    ops.extend(
        index_entries(store, key, doc)
            .into_iter()
            .map(|entry| BatchOperation::put(entry, pointer.clone())),
    );
    Ok(ops)
}

/// Replace whatever is stored under `key` with `doc`, dropping the index
/// entries of the previous version that no longer apply.
pub(crate) fn put_ops<K: KeyValueStore + ?Sized>(
    kv: &K,
    store: StoreName,
    key: &RecordKey,
    doc: &Document,
) -> Result<Vec<BatchOperation>, StoreError> {
    let fresh: BTreeSet<Vec<u8>> = index_entries(store, key, doc).into_iter().collect();
    let mut ops: Vec<BatchOperation> = match read_doc(kv, store, key)? {
        Some(previous) => index_entries(store, key, &previous)
            .into_iter()
            .filter(|entry| !fresh.contains(entry))
            .map(BatchOperation::delete)
            .collect(),
        None => Vec::new(),
    };
    ops.extend(insert_ops(store, key, doc)?);
    Ok(ops)
}

/// Remove the record under `key` and its index entries. Empty when there is
/// no such record.
pub(crate) fn delete_ops<K: KeyValueStore + ?Sized>(
    kv: &K,
    store: StoreName,
    key: &RecordKey,
) -> Result<Vec<BatchOperation>, StoreError> {
    let Some(previous) = read_doc(kv, store, key)? else {
        return Ok(Vec::new());
    };
    let mut ops = vec![BatchOperation::delete(keyspace::record_key(store, key))];
    ops.extend(
        index_entries(store, key, &previous)
            .into_iter()
            .map(BatchOperation::delete),
    );
    Ok(ops)
}

pub(crate) fn read_doc<K: KeyValueStore + ?Sized>(
    kv: &K,
    store: StoreName,
    key: &RecordKey,
) -> Result<Option<Document>, StoreError> {
    kv.get(&keyspace::record_key(store, key))?
        .map(|raw| decode(&raw))
        .transpose()
}

/// Every record of `store` with its primary key, in primary-key order.
pub(crate) fn scan_store<K: KeyValueStore + ?Sized>(
    kv: &K,
    store: StoreName,
) -> Result<Vec<(RecordKey, Document)>, StoreError> {
    kv.prefix_scan(&keyspace::store_prefix(store))?
        .into_iter()
        .map(|(raw_key, raw_value)| {
            let key = keyspace::decode_record_key(store, &raw_key).ok_or_else(|| {
                StoreError::InvalidRecord(format!("undecodable key in store '{}'", store))
            })?;
            Ok((key, decode(&raw_value)?))
        })
        .collect()
}

/// Records of `store` whose `index` value lies in `range`, ordered by that
/// value, ties by primary key. Only the matching index entries are scanned.
pub(crate) fn index_scan<K: KeyValueStore + ?Sized>(
    kv: &K,
    store: StoreName,
    index: &str,
    range: Option<&KeyRange>,
) -> Result<Vec<Document>, StoreError> {
    check_index(store, index)?;
    let (start, end) = keyspace::index_scan_bounds(store, index, range);
    kv.range_scan(&start, &end)?
        .into_iter()
        .map(|(_, pointer)| {
            let key = RecordKey::decode(&pointer).ok_or_else(|| {
                StoreError::InvalidRecord(format!(
                    "undecodable entry in index '{}' of store '{}'",
                    index, store
                ))
            })?;
            read_doc(kv, store, &key)?.ok_or_else(|| {
                StoreError::InvalidRecord(format!(
                    "index '{}' of store '{}' points at missing record {}",
                    index, store, key
                ))
            })
        })
        .collect()
}

/// Number of records of `store` whose `index` value lies in `range`.
pub(crate) fn index_count<K: KeyValueStore + ?Sized>(
    kv: &K,
    store: StoreName,
    index: &str,
    range: Option<&KeyRange>,
) -> Result<usize, StoreError> {
    check_index(store, index)?;
    let (start, end) = keyspace::index_scan_bounds(store, index, range);
    Ok(kv.range_scan(&start, &end)?.len())
}

/// Operations rebuilding every index entry of every store from the records.
pub(crate) fn reindex_ops<K: KeyValueStore + ?Sized>(
    kv: &K,
) -> Result<Vec<BatchOperation>, StoreError> {
    let mut ops: Vec<BatchOperation> = kv
        .prefix_scan(keyspace::INDEX_PREFIX)?
        .into_iter()
        .map(|(entry, _)| BatchOperation::delete(entry))
        .collect();
    for store in StoreName::ALL {
        for (key, doc) in scan_store(kv, store)? {
            let pointer = key.encode();
            ops.extend(
                index_entries(store, &key, &doc)
                    .into_iter()
                    .map(|entry| BatchOperation::put(entry, pointer.clone())),
            );
        }
    }
    Ok(ops)
}
