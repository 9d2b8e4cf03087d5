//! # App State Service - Updates and Observers

use super::*;
use std::sync::atomic::Ordering;

impl AppState {
    /// Register `listener`; it is called with `(new, old)` after every update.
    pub fn subscribe<F>(&self, listener: F) -> ListenerId
    where
        F: Fn(&AppStateData, &AppStateData) + Send + Sync + 'static,
    {
        let id = ListenerId(self.inner.next_listener.fetch_add(1, Ordering::Relaxed));
        self.inner.listeners.lock().push((id, Arc::new(listener)));
        id
    }

    /// Remove a listener. Returns whether it was registered.
    pub fn unsubscribe(&self, id: ListenerId) -> bool {
        let mut listeners = self.inner.listeners.lock();
        let before = listeners.len();
        listeners.retain(|(registered, _)| *registered != id);
        listeners.len() != before
    }

    pub fn listener_count(&self) -> usize {
        self.inner.listeners.lock().len()
    }

    /// Shallow-merge `patch`, notify listeners, then re-arm the debounced
    /// save.
    pub fn update(&self, patch: StatePatch) {
        let (new, old) = {
            let mut state = self.inner.state.write();
            let old = state.clone();
            patch.apply(&mut state);
            (state.clone(), old)
        };
        self.notify(&new, &old);
        self.schedule_save();
    }

    /// Call every listener. Neither the state lock nor the listener lock is
    /// held while they run, so a listener may read state or unsubscribe.
    pub(crate) fn notify(&self, new: &AppStateData, old: &AppStateData) {
        let listeners: Vec<Listener> = self
            .inner
            .listeners
            .lock()
            .iter()
            .map(|(_, listener)| Arc::clone(listener))
            .collect();
        for listener in listeners {
            listener(new, old);
        }
    }
}
