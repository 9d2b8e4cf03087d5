//! Error types for the application state container.

use pl_01_persistence::StoreError;
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised by state loading and screen aggregation.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum StateError {
    /// A read or write against the farm store failed.
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// The preference cache could not be read or written.
    #[error("preference cache error: {0}")]
    Preferences(#[from] PreferenceError),

    /// A stored state snapshot could not be decoded.
    #[error("invalid state snapshot: {0}")]
    InvalidSnapshot(String),
}

/// Errors from a `PreferenceCache` backend.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PreferenceError {
    #[error("failed to access preferences at {path}: {message}")]
    Io { path: PathBuf, message: String },

    #[error("preferences are not a JSON object: {0}")]
    Malformed(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_error_wraps() {
        let err: StateError = StoreError::UnknownStore("eggs".into()).into();
        assert!(matches!(err, StateError::Store(StoreError::UnknownStore(_))));
        assert!(err.to_string().contains("eggs"));
    }

    #[test]
    fn test_preference_error_display() {
        let err = PreferenceError::Io {
            path: PathBuf::from("/tmp/preferences.json"),
            message: "denied".into(),
        };
        assert!(err.to_string().contains("preferences.json"));
        let wrapped = StateError::from(err);
        assert!(matches!(wrapped, StateError::Preferences(_)));
    }
}
