//! # Record Validation
//!
//! Write-time checks. Every store with a typed entity only accepts documents
//! that decode as that entity, and the stock and flock invariants hold for
//! everything written. Reads can then decode strictly: a record that does
//! not fit is an error, never a silent gap in an aggregate.

use crate::domain::errors::StoreError;
use serde::de::DeserializeOwned;
use shared_schema::{
    from_document, Document, EnvironmentReading, Flock, HealthRecord, InventoryItem,
    Notification, QualityCheck, QualityIssue, StoreName, Transaction, User,
};

/// Check `doc` before it is written to `store`.
///
/// ## Errors
///
/// - `InvalidRecord`: the document does not decode as the store's entity,
///   an inventory quantity is negative or not finite, or a flock holds more
///   birds than were placed
pub fn validate_record(store: StoreName, doc: &Document) -> Result<(), StoreError> {
    match store {
        StoreName::Inventory => {
            let item: InventoryItem = decode_one(store, doc)?;
            if !item.qty.is_finite() || item.qty < 0.0 {
                return Err(StoreError::InvalidRecord(format!(
                    "inventory item {} has quantity {}, expected a number >= 0",
                    item.id, item.qty
                )));
            }
        }
        StoreName::Flocks => {
            let flock: Flock = decode_one(store, doc)?;
            if flock.count > flock.initial_count {
                return Err(StoreError::InvalidRecord(format!(
                    "flock {} has {} birds but only {} were placed",
                    flock.id, flock.count, flock.initial_count
                )));
            }
        }
        StoreName::Transactions => {
            decode_one::<Transaction>(store, doc)?;
        }
        StoreName::HealthRecords => {
            decode_one::<HealthRecord>(store, doc)?;
        }
        StoreName::EnvironmentData => {
            decode_one::<EnvironmentReading>(store, doc)?;
        }
        StoreName::Users => {
            decode_one::<User>(store, doc)?;
        }
        StoreName::QualityChecks => {
            decode_one::<QualityCheck>(store, doc)?;
        }
        StoreName::QualityIssues => {
            decode_one::<QualityIssue>(store, doc)?;
        }
        StoreName::Notifications => {
            decode_one::<Notification>(store, doc)?;
        }
        StoreName::Settings => {}
    }
    Ok(())
}

/// Decode every document of `store` as `T`. The first one that does not fit
/// fails the whole read.
pub fn decode_records<T: DeserializeOwned>(
    store: StoreName,
    docs: impl IntoIterator<Item = Document>,
) -> Result<Vec<T>, StoreError> {
    docs.into_iter()
        .map(|doc| decode_one(store, &doc))
        .collect()
}

fn decode_one<T: DeserializeOwned>(store: StoreName, doc: &Document) -> Result<T, StoreError> {
    from_document(doc).map_err(|e| {
        let id = doc
            .get(store.key_path())
            .map_or_else(|| "?".to_string(), |v| v.to_string());
        StoreError::InvalidRecord(format!("{} record {}: {}", store, id, e))
    })
}
