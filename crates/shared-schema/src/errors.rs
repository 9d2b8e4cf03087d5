//! # Error Types
//!
//! Errors raised while interpreting documents against the schema.

use thiserror::Error;

/// Errors produced by key extraction and document conversion.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SchemaError {
    /// The record has no value at the store's key path.
    #[error("Record has no value at key path '{key_path}'")]
    MissingKey { key_path: &'static str },

    /// The value at the key path cannot be used as a primary key.
    #[error("Invalid key at '{key_path}': expected integer or string, found {found}")]
    InvalidKey {
        key_path: &'static str,
        found: &'static str,
    },

    /// A typed record did not serialize to a JSON object.
    #[error("Record must be a JSON object, found {found}")]
    NotAnObject { found: &'static str },

    /// Store name not present in the catalog.
    #[error("Unknown store: {0}")]
    UnknownStore(String),

    /// serde failure while converting a document.
    #[error("Serialization error: {0}")]
    Serialization(String),
}
