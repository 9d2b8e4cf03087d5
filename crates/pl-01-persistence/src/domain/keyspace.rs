//! # Key Space
//!
//! Layout of the byte-level key space shared by every backend.
//!
//! | Key | Value |
//! |-----|-------|
//! | `{store}\x00{encoded primary key}` | record JSON |
//! | `\x00index\x00{store}\x00{index}\x00{encoded value}{encoded primary key}` | encoded primary key |
//! | `\x00meta\x00schema` | [`SchemaMetadata`] JSON |
//!
//! Store names never start with `\x00`, so index entries and metadata stay
//! out of every store's prefix scan. Index values use [`IndexKey::encode`],
//! so the entries of one index sort by value, then by primary key.

use serde::{Deserialize, Serialize};
use shared_schema::{IndexKey, KeyRange, RecordKey, StoreName, DB_NAME, SCHEMA_VERSION};
use std::ops::Bound;

const SEPARATOR: u8 = 0x00;

/// Prefix of all metadata keys.
pub const META_PREFIX: &[u8] = b"\x00meta\x00";

/// Key under which the schema description is recorded.
pub fn schema_key() -> Vec<u8> {
    let mut key = META_PREFIX.to_vec();
    key.extend_from_slice(b"schema");
    key
}

/// Prefix of all index entries.
pub const INDEX_PREFIX: &[u8] = b"\x00index\x00";

/// Sorts after every index entry with the same value prefix: encoded
/// primary keys start with `0x01` or `0x02`.
const AFTER_VALUE: u8 = 0xFF;

/// Prefix covering every index entry of `store`.
pub fn store_index_prefix(store: StoreName) -> Vec<u8> {
    let mut prefix = INDEX_PREFIX.to_vec();
    prefix.extend_from_slice(store.as_str().as_bytes());
    prefix.push(SEPARATOR);
    prefix
}

/// Prefix covering the entries of one index.
pub fn index_prefix(store: StoreName, index: &str) -> Vec<u8> {
    let mut prefix = store_index_prefix(store);
    prefix.extend_from_slice(index.as_bytes());
    prefix.push(SEPARATOR);
    prefix
}

/// Index entry pointing at the record `key` whose `index` field is `value`.
pub fn index_entry_key(
    store: StoreName,
    index: &str,
    value: &IndexKey,
    key: &RecordKey,
) -> Vec<u8> {
    let mut out = index_prefix(store, index);
    out.extend_from_slice(&value.encode());
    out.extend_from_slice(&key.encode());
    out
}

/// Half-open byte range `[start, end)` holding exactly the entries of
/// `index` whose value lies in `range` (all entries when `None`).
pub fn index_scan_bounds(
    store: StoreName,
    index: &str,
    range: Option<&KeyRange>,
) -> (Vec<u8>, Vec<u8>) {
    let prefix = index_prefix(store, index);
    let at = |value: &IndexKey, past: bool| {
        let mut bound = prefix.clone();
        bound.extend_from_slice(&value.encode());
        if past {
            bound.push(AFTER_VALUE);
        }
        bound
    };

    let (lower, upper) = match range {
        Some(range) => (range.lower(), range.upper()),
        None => (Bound::Unbounded, Bound::Unbounded),
    };
    let start = match lower {
        Bound::Included(value) => at(value, false),
        Bound::Excluded(value) => at(value, true),
        Bound::Unbounded => prefix.clone(),
    };
    let end = match upper {
        Bound::Included(value) => at(value, true),
        Bound::Excluded(value) => at(value, false),
        Bound::Unbounded => prefix_end(&prefix),
    };
    (start, end)
}

/// Smallest key greater than every key starting with `prefix`. Prefixes
/// built here end in the `0x00` separator, so incrementing it never carries.
fn prefix_end(prefix: &[u8]) -> Vec<u8> {
    let mut end = prefix.to_vec();
    if let Some(last) = end.last_mut() {
        *last += 1;
    }
    end
}

/// Prefix covering every record of `store`.
pub fn store_prefix(store: StoreName) -> Vec<u8> {
    let name = store.as_str().as_bytes();
    let mut prefix = Vec::with_capacity(name.len() + 1);
    prefix.extend_from_slice(name);
    prefix.push(SEPARATOR);
    prefix
}

/// Full key of one record.
pub fn record_key(store: StoreName, key: &RecordKey) -> Vec<u8> {
    let mut out = store_prefix(store);
    out.extend_from_slice(&key.encode());
    out
}

/// Primary key of a full record key, if it belongs to `store`.
pub fn decode_record_key(store: StoreName, raw: &[u8]) -> Option<RecordKey> {
    let prefix = store_prefix(store);
    raw.strip_prefix(prefix.as_slice())
        .and_then(RecordKey::decode)
}

/// One declared store as recorded in the schema metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreDescriptor {
    pub name: String,
    pub key_path: String,
    pub indexes: Vec<String>,
}

/// Schema description persisted on first creation and on upgrade.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchemaMetadata {
    pub name: String,
    pub version: u32,
    pub stores: Vec<StoreDescriptor>,
    pub created_at: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub upgraded_at: Option<String>,
    /// Whether index entries exist for every record. Databases written
    /// before indexes were stored lack the flag and are reindexed on open.
    #[serde(default)]
    pub indexed: bool,
}

impl SchemaMetadata {
    /// The current schema, stamped with `created_at`.
    pub fn current(created_at: String) -> Self {
        Self {
            name: DB_NAME.to_string(),
            version: SCHEMA_VERSION,
            stores: StoreName::ALL
                .iter()
                .map(|store| StoreDescriptor {
                    name: store.as_str().to_string(),
                    key_path: store.key_path().to_string(),
                    indexes: store.indexes().iter().map(|i| i.to_string()).collect(),
                })
                .collect(),
            created_at,
            upgraded_at: None,
            indexed: true,
        }
    }

    pub fn is_current(&self) -> bool {
        self.version >= SCHEMA_VERSION
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_keys_stay_inside_store_prefix() {
        let key = record_key(StoreName::Inventory, &RecordKey::Int(1));
        assert!(key.starts_with(&store_prefix(StoreName::Inventory)));
        assert!(!key.starts_with(&store_prefix(StoreName::Flocks)));
        assert!(!schema_key().starts_with(&store_prefix(StoreName::Settings)));
    }

    #[test]
    fn test_prefix_does_not_leak_across_similar_names() {
        // "quality_checks" must not match a scan over a store named "quality".
        let checks = record_key(StoreName::QualityChecks, &RecordKey::Int(5));
        assert!(!checks.starts_with(&store_prefix(StoreName::QualityIssues)));
    }

    #[test]
    fn test_decode_record_key() {
        let key = RecordKey::from("budget");
        let raw = record_key(StoreName::Settings, &key);
        assert_eq!(decode_record_key(StoreName::Settings, &raw), Some(key));
        assert_eq!(decode_record_key(StoreName::Users, &raw), None);
    }

    #[test]
    fn test_index_entries_stay_out_of_store_scans() {
        let entry = index_entry_key(
            StoreName::Flocks,
            "status",
            &IndexKey::from("active"),
            &RecordKey::Int(1),
        );
        assert!(entry.starts_with(&store_index_prefix(StoreName::Flocks)));
        assert!(!entry.starts_with(&store_prefix(StoreName::Flocks)));
        assert!(!entry.starts_with(&index_prefix(StoreName::Flocks, "breed")));
    }

    #[test]
    fn test_scan_bounds_select_value_range() {
        let entry = |value: i64, key: i64| {
            index_entry_key(
                StoreName::Transactions,
                "amount",
                &IndexKey::from(value),
                &RecordKey::Int(key),
            )
        };
        let inside = |bounds: &(Vec<u8>, Vec<u8>), raw: &Vec<u8>| {
            raw >= &bounds.0 && raw < &bounds.1
        };

        let closed = index_scan_bounds(
            StoreName::Transactions,
            "amount",
            Some(&KeyRange::bound(20_i64, 100_i64)),
        );
        assert!(!inside(&closed, &entry(10, 1)));
        assert!(inside(&closed, &entry(20, i64::MAX)));
        assert!(inside(&closed, &entry(100, i64::MIN)));
        assert!(inside(&closed, &entry(100, i64::MAX)));
        assert!(!inside(&closed, &entry(101, 1)));

        let open = index_scan_bounds(
            StoreName::Transactions,
            "amount",
            Some(&KeyRange::lower_bound(20_i64, true)),
        );
        assert!(!inside(&open, &entry(20, i64::MAX)));
        assert!(inside(&open, &entry(21, 1)));

        let all = index_scan_bounds(StoreName::Transactions, "amount", None);
        assert!(inside(&all, &entry(i64::MIN, 1)));
        let other_index = index_entry_key(
            StoreName::Transactions,
            "category",
            &IndexKey::from("feed"),
            &RecordKey::Int(1),
        );
        assert!(!inside(&all, &other_index));
    }

    #[test]
    fn test_current_schema_lists_all_stores() {
        let meta = SchemaMetadata::current("2024-01-01T00:00:00.000Z".into());
        assert_eq!(meta.stores.len(), StoreName::ALL.len());
        assert!(meta.is_current());
        assert!(meta.indexed);
        let settings = meta.stores.iter().find(|s| s.name == "settings").unwrap();
        assert_eq!(settings.key_path, "key");
    }
}
