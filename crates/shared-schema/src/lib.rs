//! # Shared Schema Crate
//!
//! Static description of the farm database: which stores exist, how their
//! records are keyed, which secondary indexes they carry, and the typed
//! entity records the aggregate queries work with.
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: every collection the application touches is
//!   declared in [`StoreName`]. Nothing is created ad hoc at runtime.
//! - **Documents on the wire, types at the edges**: the store persists JSON
//!   [`Document`]s so that unknown fields survive read-modify-write cycles;
//!   aggregates decode them into the lenient entity structs in [`entities`].

pub mod config;
pub mod entities;
pub mod errors;
pub mod keys;
pub mod stores;

pub use config::*;
pub use entities::*;
pub use errors::*;
pub use keys::{IndexKey, KeyRange, RecordKey};
pub use stores::{StoreName, DB_NAME, SCHEMA_VERSION};

/// A stored record: a JSON object keyed by its store's key path.
pub type Document = serde_json::Map<String, serde_json::Value>;

/// Serialize a typed record into a [`Document`].
pub fn to_document<T: serde::Serialize>(record: &T) -> Result<Document, SchemaError> {
    match serde_json::to_value(record).map_err(|e| SchemaError::Serialization(e.to_string()))? {
        serde_json::Value::Object(map) => Ok(map),
        other => Err(SchemaError::NotAnObject {
            found: json_type_name(&other),
        }),
    }
}

/// Decode a [`Document`] into a typed record.
pub fn from_document<T: serde::de::DeserializeOwned>(doc: &Document) -> Result<T, SchemaError> {
    serde_json::from_value(serde_json::Value::Object(doc.clone()))
        .map_err(|e| SchemaError::Serialization(e.to_string()))
}

pub(crate) fn json_type_name(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "boolean",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}
