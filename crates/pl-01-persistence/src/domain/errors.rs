//! # Error Types
//!
//! Errors for the persistence layer. `KVStoreError` comes from the byte-level
//! backends; `StoreError` is what callers of the document store see.

use shared_schema::{RecordKey, SchemaError, StoreName};
use std::path::PathBuf;
use thiserror::Error;

/// Errors surfaced by the document store.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum StoreError {
    /// The backend could not be opened. A later call retries the open.
    #[error("Storage unavailable: {message}")]
    StorageUnavailable { message: String },

    /// `add` found an existing record under the same key.
    #[error("Duplicate key {key} in store '{store}'")]
    DuplicateKey { store: StoreName, key: RecordKey },

    /// A domain operation referenced a record that does not exist.
    #[error("Record {key} not found in store '{store}'")]
    RecordNotFound { store: StoreName, key: RecordKey },

    /// Quantity update would leave the item below zero. Nothing was written.
    #[error("Quantity of item {item_id} cannot go negative: {current} + ({delta})")]
    NegativeQuantity {
        item_id: RecordKey,
        current: f64,
        delta: f64,
    },

    #[error("Unknown store: {0}")]
    UnknownStore(String),

    #[error("Unknown index '{index}' on store '{store}'")]
    UnknownIndex { store: StoreName, index: String },

    #[error("Record in store '{store}' has no value at key path '{key_path}'")]
    MissingKey {
        store: StoreName,
        key_path: &'static str,
    },

    #[error("Invalid record: {0}")]
    InvalidRecord(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Database error: {0}")]
    Database(#[from] KVStoreError),
}

impl From<SchemaError> for StoreError {
    fn from(err: SchemaError) -> Self {
        match err {
            SchemaError::UnknownStore(name) => StoreError::UnknownStore(name),
            SchemaError::Serialization(message) => StoreError::Serialization(message),
            other => StoreError::InvalidRecord(other.to_string()),
        }
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        StoreError::Serialization(err.to_string())
    }
}

/// Key-value backend errors.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum KVStoreError {
    /// I/O error during read/write.
    #[error("KV store I/O error: {message}")]
    IOError { message: String },

    /// Data corruption in the store.
    #[error("KV store corruption: {message}")]
    CorruptionError { message: String },

    /// Another process holds the data directory.
    #[error("Database already in use{} ({})", pid.map(|p| format!(" by process {p}")).unwrap_or_default(), path.display())]
    Locked { pid: Option<u32>, path: PathBuf },
}

impl From<std::io::Error> for KVStoreError {
    fn from(err: std::io::Error) -> Self {
        KVStoreError::IOError {
            message: err.to_string(),
        }
    }
}
