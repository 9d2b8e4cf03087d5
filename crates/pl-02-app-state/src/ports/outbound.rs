//! Driven ports of the state container.

use crate::domain::errors::PreferenceError;
use shared_schema::Document;

/// Local cache of user preferences.
///
/// Reads are synchronous: `AppState::initialize` merges them before any
/// store access. Backends hold a handful of keys, so whole-document
/// load/store is enough.
pub trait PreferenceCache: Send + Sync {
    /// Cached preferences, or an empty document if none were stored.
    fn load(&self) -> Result<Document, PreferenceError>;

    /// Replace the cached preferences.
    fn store(&self, preferences: &Document) -> Result<(), PreferenceError>;
}
