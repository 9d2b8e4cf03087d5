//! # Adapters Module
//!
//! - `preferences`: in-memory and JSON-file `PreferenceCache` backends

pub mod preferences;

pub use preferences::{InMemoryPreferences, JsonFilePreferences, PREFERENCES_FILE};
