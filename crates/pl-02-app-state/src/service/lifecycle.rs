//! # App State Service - Lifecycle
//!
//! Start-up loading, restoring a saved snapshot and user preferences.

use super::*;
use crate::domain::state::APP_STATE_KEY;
use pl_01_persistence::{decode_records, StoreError};
use serde_json::Value;
use shared_schema::{
    format_timestamp, from_document, to_document, Document, KeyRange, Notification, RecordKey,
    StoreName, User,
};

impl AppState {
    /// Load everything the rest of the application reads from state.
    ///
    /// 1. Preferences from the cache, merged over the static configuration
    /// 2. Unread notifications
    /// 3. The default user, created on first run
    ///
    /// An unreadable preference cache is logged and treated as empty.
    ///
    /// ## Errors
    ///
    /// `StateError::Store` when the farm store cannot be opened or read.
    pub async fn initialize(&self) -> Result<(), StateError> {
        let preferences = self.inner.preferences.load().unwrap_or_else(|e| {
            tracing::warn!("[pl-02] ⚠️ Ignoring unreadable preferences: {}", e);
            Document::new()
        });
        let settings = self.inner.app_config.settings_with(&preferences);

        self.inner.store.initialize().await?;
        let notifications = self.load_unread_notifications().await?;
        let user = self.load_or_create_user().await?;

        {
            let mut state = self.inner.state.write();
            state.settings = settings;
            state.notifications = notifications;
            state.user = Some(user);
        }
        tracing::info!("[pl-02] ✅ Application state ready");
        Ok(())
    }

    async fn load_unread_notifications(&self) -> Result<Vec<Notification>, StateError> {
        let docs = self
            .inner
            .store
            .get_all(
                StoreName::Notifications,
                Some("read"),
                Some(KeyRange::only(false)),
            )
            .await?;
        Ok(decode_records(StoreName::Notifications, docs)?)
    }

    async fn load_or_create_user(&self) -> Result<User, StateError> {
        let key = RecordKey::from(self.inner.config.default_user_id.as_str());
        if let Some(doc) = self.inner.store.get(StoreName::Users, &key).await? {
            return Ok(from_document(&doc).map_err(StoreError::from)?);
        }

        let user = User {
            id: key,
            name: "System administrator".to_string(),
            role: "admin".to_string(),
            permissions: vec!["*".to_string()],
            last_login: Some(format_timestamp(self.inner.time_source.now())),
        };
        let doc = to_document(&user).map_err(StoreError::from)?;
        self.inner.store.put(StoreName::Users, doc).await?;
        tracing::info!("[pl-02] 🔒 Created default user {}", user.id);
        Ok(user)
    }

    /// Merge the saved snapshot, if any, over the current state.
    ///
    /// Listeners are notified; nothing is re-saved. Returns whether a
    /// snapshot was found.
    pub async fn restore(&self) -> Result<bool, StateError> {
        let Some(saved) = self
            .inner
            .store
            .get(StoreName::Settings, &RecordKey::from(APP_STATE_KEY))
            .await?
        else {
            return Ok(false);
        };

        let (new, old) = {
            let mut state = self.inner.state.write();
            let merged = state
                .merged_with(&saved)
                .map_err(|e| StateError::InvalidSnapshot(e.to_string()))?;
            let old = std::mem::replace(&mut *state, merged);
            (state.clone(), old)
        };
        self.notify(&new, &old);
        tracing::info!("[pl-02] 🔄 Application state restored");
        Ok(true)
    }

    /// Merge `changes` into the cached preferences, write them back, and
    /// refresh `settings` from the result. Returns the merged preferences.
    pub fn update_user_config(&self, changes: Document) -> Result<Document, StateError> {
        let mut preferences = self.inner.preferences.load()?;
        for (key, value) in changes {
            preferences.insert(key, value);
        }
        self.inner.preferences.store(&preferences)?;

        let settings = self.inner.app_config.settings_with(&preferences);
        self.update(StatePatch::new().settings(settings));
        Ok(preferences)
    }

    /// A single cached preference.
    pub fn preference(&self, key: &str) -> Option<Value> {
        match self.inner.preferences.load() {
            Ok(mut preferences) => preferences.remove(key),
            Err(e) => {
                tracing::warn!("[pl-02] ⚠️ Preference {} unavailable: {}", key, e);
                None
            }
        }
    }
}
