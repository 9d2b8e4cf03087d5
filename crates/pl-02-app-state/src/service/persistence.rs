//! # App State Service - Persistence
//!
//! Saving the state under the `app_state` settings entry, debounced or on
//! demand.

use super::*;
use crate::domain::state::APP_STATE_KEY;
use pl_01_persistence::StoreError;
use serde_json::Value;
use shared_schema::{format_timestamp, to_document, Document, StoreName};

impl AppState {
    /// Persist the current state and stamp `lastSync`.
    ///
    /// Failures are not returned as errors: they are logged, broadcast on
    /// `save_events()` and reported in the outcome.
    pub async fn save(&self) -> SaveOutcome {
        let at = format_timestamp(self.inner.time_source.now());
        let snapshot = self.snapshot();

        let written = match snapshot_document(&snapshot, &at) {
            Ok(doc) => self.inner.store.put(StoreName::Settings, doc).await,
            Err(e) => Err(e),
        };

        let outcome = match written {
            Ok(_) => {
                self.inner.state.write().last_sync = Some(at.clone());
                tracing::info!("[pl-02] 💾 Application state saved");
                SaveOutcome::Saved { at }
            }
            Err(e) => {
                tracing::error!("[pl-02] ❌ Failed to save application state: {}", e);
                SaveOutcome::Failed(e)
            }
        };
        // No receivers is fine.
        let _ = self.inner.save_events.send(outcome.clone());
        outcome
    }

    /// Cancel any pending debounced save and save now.
    ///
    /// The cancelled task is awaited, so once this returns no timer task
    /// holds a handle to the state.
    pub async fn flush(&self) -> SaveOutcome {
        if let Some(cancelled) = self.cancel_pending_save() {
            let _ = cancelled.await;
        }
        self.save().await
    }

    /// Whether a debounced save is armed.
    pub fn has_pending_save(&self) -> bool {
        self.inner.pending_save.lock().handle.is_some()
    }

    /// Arm the debounced save, replacing any armed one.
    ///
    /// Outside a tokio runtime there is nothing to run the timer on, so the
    /// update stays unsaved until the next `save` or `flush`.
    pub(crate) fn schedule_save(&self) {
        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            tracing::debug!("[pl-02] No async runtime, autosave skipped");
            return;
        };
        let delay = self.inner.config.autosave_debounce;

        let mut pending = self.inner.pending_save.lock();
        pending.generation += 1;
        let generation = pending.generation;
        if let Some(previous) = pending.handle.take() {
            previous.abort();
        }

        let state = self.clone();
        pending.handle = Some(runtime.spawn(async move {
            tokio::time::sleep(delay).await;
            {
                let mut pending = state.inner.pending_save.lock();
                if pending.generation != generation {
                    return;
                }
                pending.handle = None;
            }
            state.save().await;
        }));
    }

    fn cancel_pending_save(&self) -> Option<JoinHandle<()>> {
        let mut pending = self.inner.pending_save.lock();
        pending.generation += 1;
        let handle = pending.handle.take()?;
        handle.abort();
        Some(handle)
    }
}

/// The state as a settings entry.
fn snapshot_document(state: &AppStateData, last_sync: &str) -> Result<Document, StoreError> {
    let mut doc = to_document(state)?;
    doc.insert("key".into(), Value::from(APP_STATE_KEY));
    doc.insert("lastSync".into(), Value::from(last_sync));
    Ok(doc)
}
