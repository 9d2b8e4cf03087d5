//! # Application State
//!
//! The session/UI state shared across screens, the partial updates applied to
//! it, and the outcome of persisting it.

use pl_01_persistence::StoreError;
use serde::{Deserialize, Serialize};
use shared_schema::{Document, Notification, RecordKey, User};

/// Settings entry under which the state snapshot is saved.
pub const APP_STATE_KEY: &str = "app_state";

/// Session and UI state.
///
/// `is_loading` is transient: it is never written to or read from a saved
/// snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AppStateData {
    pub user: Option<User>,
    pub settings: Document,
    pub current_flock_id: Option<RecordKey>,
    pub notifications: Vec<Notification>,
    pub selected_module: String,
    pub theme: String,
    pub language: String,
    #[serde(skip)]
    pub is_loading: bool,
    pub last_sync: Option<String>,
    pub current_route: Option<String>,
}

impl Default for AppStateData {
    fn default() -> Self {
        Self {
            user: None,
            settings: Document::new(),
            current_flock_id: None,
            notifications: Vec::new(),
            selected_module: "dashboard".to_string(),
            theme: "dark".to_string(),
            language: "ar".to_string(),
            is_loading: false,
            last_sync: None,
            current_route: None,
        }
    }
}

impl AppStateData {
    /// Overlay the fields of a saved snapshot on this state.
    ///
    /// Fields absent from `saved` keep their current value; the transient
    /// busy flag is never taken from a snapshot.
    pub fn merged_with(&self, saved: &Document) -> Result<Self, serde_json::Error> {
        let mut base = match serde_json::to_value(self)? {
            serde_json::Value::Object(map) => map,
            _ => Document::new(),
        };
        for (field, value) in saved {
            if field != "key" {
                base.insert(field.clone(), value.clone());
            }
        }
        let mut merged: Self = serde_json::from_value(serde_json::Value::Object(base))?;
        merged.is_loading = self.is_loading;
        Ok(merged)
    }

    pub fn unread_notifications(&self) -> usize {
        self.notifications.iter().filter(|n| !n.read).count()
    }
}

/// A partial update. Unset fields are left untouched; nullable fields take
/// `Some(None)` to clear them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StatePatch {
    pub user: Option<Option<User>>,
    pub settings: Option<Document>,
    pub current_flock_id: Option<Option<RecordKey>>,
    pub notifications: Option<Vec<Notification>>,
    pub selected_module: Option<String>,
    pub theme: Option<String>,
    pub language: Option<String>,
    pub is_loading: Option<bool>,
    pub last_sync: Option<Option<String>>,
    pub current_route: Option<Option<String>>,
}

impl StatePatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn user(mut self, user: Option<User>) -> Self {
        self.user = Some(user);
        self
    }

    pub fn settings(mut self, settings: Document) -> Self {
        self.settings = Some(settings);
        self
    }

    pub fn current_flock_id(mut self, flock_id: Option<RecordKey>) -> Self {
        self.current_flock_id = Some(flock_id);
        self
    }

    pub fn notifications(mut self, notifications: Vec<Notification>) -> Self {
        self.notifications = Some(notifications);
        self
    }

    pub fn selected_module(mut self, module: impl Into<String>) -> Self {
        self.selected_module = Some(module.into());
        self
    }

    pub fn theme(mut self, theme: impl Into<String>) -> Self {
        self.theme = Some(theme.into());
        self
    }

    pub fn language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }

    pub fn loading(mut self, busy: bool) -> Self {
        self.is_loading = Some(busy);
        self
    }

    pub fn current_route(mut self, route: impl Into<String>) -> Self {
        self.current_route = Some(Some(route.into()));
        self
    }

    /// Shallow merge into `state`.
    pub fn apply(self, state: &mut AppStateData) {
        if let Some(user) = self.user {
            state.user = user;
        }
        if let Some(settings) = self.settings {
            state.settings = settings;
        }
        if let Some(flock_id) = self.current_flock_id {
            state.current_flock_id = flock_id;
        }
        if let Some(notifications) = self.notifications {
            state.notifications = notifications;
        }
        if let Some(module) = self.selected_module {
            state.selected_module = module;
        }
        if let Some(theme) = self.theme {
            state.theme = theme;
        }
        if let Some(language) = self.language {
            state.language = language;
        }
        if let Some(busy) = self.is_loading {
            state.is_loading = busy;
        }
        if let Some(last_sync) = self.last_sync {
            state.last_sync = last_sync;
        }
        if let Some(route) = self.current_route {
            state.current_route = route;
        }
    }
}

/// Result of one attempt to persist the state.
#[derive(Debug, Clone, PartialEq)]
pub enum SaveOutcome {
    /// Written; `at` is the new `lastSync` stamp.
    Saved { at: String },
    Failed(StoreError),
}

impl SaveOutcome {
    pub fn is_saved(&self) -> bool {
        matches!(self, SaveOutcome::Saved { .. })
    }
}

/// Handle returned by `subscribe`, used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(pub(crate) u64);

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_defaults() {
        let state = AppStateData::default();
        assert_eq!(state.selected_module, "dashboard");
        assert_eq!(state.theme, "dark");
        assert_eq!(state.language, "ar");
        assert!(!state.is_loading);
        assert!(state.user.is_none());
    }

    #[test]
    fn test_patch_is_shallow() {
        let mut state = AppStateData::default();
        state.current_flock_id = Some(RecordKey::Int(4));

        StatePatch::new().theme("light").apply(&mut state);
        assert_eq!(state.theme, "light");
        assert_eq!(state.language, "ar");
        assert_eq!(state.current_flock_id, Some(RecordKey::Int(4)));

        StatePatch::new().current_flock_id(None).apply(&mut state);
        assert!(state.current_flock_id.is_none());
    }

    #[test]
    fn test_busy_flag_not_serialized() {
        let state = AppStateData {
            is_loading: true,
            ..Default::default()
        };
        let value = serde_json::to_value(&state).unwrap();
        assert!(value.get("isLoading").is_none());
        assert_eq!(value["selectedModule"], json!("dashboard"));
    }

    #[test]
    fn test_merge_saved_snapshot() {
        let current = AppStateData {
            is_loading: true,
            ..Default::default()
        };
        let saved = json!({
            "key": "app_state",
            "theme": "light",
            "currentRoute": "finance",
            "isLoading": false
        });
        let merged = current
            .merged_with(saved.as_object().unwrap())
            .unwrap();
        assert_eq!(merged.theme, "light");
        assert_eq!(merged.current_route.as_deref(), Some("finance"));
        assert_eq!(merged.selected_module, "dashboard");
        assert!(merged.is_loading);
    }
}
