//! Preference cache backends.

use crate::domain::errors::PreferenceError;
use crate::ports::outbound::PreferenceCache;
use parking_lot::Mutex;
use shared_schema::Document;
use std::fs;
use std::path::{Path, PathBuf};

/// File name of the JSON preference cache inside the data directory.
pub const PREFERENCES_FILE: &str = "preferences.json";

/// Process-local preferences. Lost on exit.
#[derive(Debug, Default)]
pub struct InMemoryPreferences {
    entries: Mutex<Document>,
}

impl InMemoryPreferences {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entries(entries: Document) -> Self {
        Self {
            entries: Mutex::new(entries),
        }
    }
}

impl PreferenceCache for InMemoryPreferences {
    fn load(&self) -> Result<Document, PreferenceError> {
        Ok(self.entries.lock().clone())
    }

    fn store(&self, preferences: &Document) -> Result<(), PreferenceError> {
        *self.entries.lock() = preferences.clone();
        Ok(())
    }
}

/// Preferences kept as one pretty-printed JSON object on disk.
///
/// Writes go to a sibling temp file that is renamed over the target, so a
/// crash mid-write leaves the previous file intact.
#[derive(Debug, Clone)]
pub struct JsonFilePreferences {
    path: PathBuf,
}

impl JsonFilePreferences {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `preferences.json` inside `data_dir`.
    pub fn in_dir(data_dir: impl AsRef<Path>) -> Self {
        Self::new(data_dir.as_ref().join(PREFERENCES_FILE))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, err: std::io::Error) -> PreferenceError {
        PreferenceError::Io {
            path: self.path.clone(),
            message: err.to_string(),
        }
    }
}

impl PreferenceCache for JsonFilePreferences {
    fn load(&self) -> Result<Document, PreferenceError> {
        let raw = match fs::read(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Document::new()),
            Err(e) => return Err(self.io_error(e)),
        };
        match serde_json::from_slice::<serde_json::Value>(&raw) {
            Ok(serde_json::Value::Object(map)) => Ok(map),
            Ok(other) => Err(PreferenceError::Malformed(format!("found {}", other))),
            Err(e) => Err(PreferenceError::Malformed(e.to_string())),
        }
    }

    fn store(&self, preferences: &Document) -> Result<(), PreferenceError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| self.io_error(e))?;
        }
        let body = serde_json::to_vec_pretty(preferences)
            .map_err(|e| PreferenceError::Malformed(e.to_string()))?;

        let temp = self.path.with_extension("json.tmp");
        fs::write(&temp, body).map_err(|e| self.io_error(e))?;
        fs::rename(&temp, &self.path).map_err(|e| self.io_error(e))?;
        tracing::debug!("[pl-02] 💾 Preferences written to {:?}", self.path);
        Ok(())
    }
}
