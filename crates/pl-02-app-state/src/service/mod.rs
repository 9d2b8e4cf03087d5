//! # App State Service
//!
//! The state container shared by the router and the renderers.
//!
//! ## Architecture
//!
//! `AppState` is a cheap, clonable handle:
//! 1. State lives behind a `parking_lot::RwLock`; listeners run after the
//!    lock is released
//! 2. Every `update` re-arms one debounced save task; only the last one in a
//!    burst writes
//! 3. Save outcomes are returned and also broadcast on `save_events()`
//! 4. Screen loads fan out concurrent reads to the farm store and hold the
//!    busy flag through a drop guard

mod lifecycle;
mod listeners;
mod persistence;
mod screens;

use crate::domain::errors::StateError;
use crate::domain::state::{AppStateData, ListenerId, SaveOutcome, StatePatch};
use crate::ports::outbound::PreferenceCache;
use parking_lot::{Mutex, RwLock};
use pl_01_persistence::{FarmStoreApi, TimeSource};
use shared_schema::AppConfig;
use std::sync::atomic::AtomicU64;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;

/// Tunables of the state container.
#[derive(Debug, Clone, PartialEq)]
pub struct AppStateConfig {
    /// Quiet period after the last update before the state is saved.
    pub autosave_debounce: Duration,
    /// User record loaded, or created, by `initialize`.
    pub default_user_id: String,
    /// Low-stock alerts shown on the dashboard.
    pub dashboard_alert_limit: usize,
    /// Transactions listed on the finance screen.
    pub recent_transactions_limit: usize,
    /// Quality checks listed on the quality screen.
    pub recent_checks_limit: usize,
    /// Buffered save outcomes per `save_events()` receiver.
    pub save_event_capacity: usize,
}

impl Default for AppStateConfig {
    fn default() -> Self {
        Self {
            autosave_debounce: Duration::from_secs(5),
            default_user_id: "admin".to_string(),
            dashboard_alert_limit: 5,
            recent_transactions_limit: 20,
            recent_checks_limit: 10,
            save_event_capacity: 16,
        }
    }
}

impl AppStateConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_autosave_debounce(mut self, debounce: Duration) -> Self {
        self.autosave_debounce = debounce;
        self
    }

    pub fn with_default_user_id(mut self, user_id: impl Into<String>) -> Self {
        self.default_user_id = user_id.into();
        self
    }

    pub fn with_dashboard_alert_limit(mut self, limit: usize) -> Self {
        self.dashboard_alert_limit = limit;
        self
    }

    pub fn with_recent_transactions_limit(mut self, limit: usize) -> Self {
        self.recent_transactions_limit = limit;
        self
    }
}

/// Dependencies for AppState
pub struct AppStateDependencies {
    pub store: Arc<dyn FarmStoreApi>,
    pub preferences: Arc<dyn PreferenceCache>,
    pub time_source: Arc<dyn TimeSource>,
    /// Static thresholds; user preferences are merged over them.
    pub app_config: AppConfig,
}

/// Observer called with `(new, old)` after every update.
pub type Listener = Arc<dyn Fn(&AppStateData, &AppStateData) + Send + Sync>;

#[derive(Default)]
struct PendingSave {
    /// Bumped on every schedule and flush; a woken task only saves if its
    /// generation is still current.
    generation: u64,
    handle: Option<JoinHandle<()>>,
}

struct Inner {
    store: Arc<dyn FarmStoreApi>,
    preferences: Arc<dyn PreferenceCache>,
    time_source: Arc<dyn TimeSource>,
    app_config: AppConfig,
    config: AppStateConfig,
    state: RwLock<AppStateData>,
    listeners: Mutex<Vec<(ListenerId, Listener)>>,
    next_listener: AtomicU64,
    pending_save: Mutex<PendingSave>,
    save_events: broadcast::Sender<SaveOutcome>,
}

/// Handle to the application state container.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<Inner>,
}

impl AppState {
    pub fn new(deps: AppStateDependencies, config: AppStateConfig) -> Self {
        let (save_events, _) = broadcast::channel(config.save_event_capacity.max(1));
        Self {
            inner: Arc::new(Inner {
                store: deps.store,
                preferences: deps.preferences,
                time_source: deps.time_source,
                app_config: deps.app_config,
                config,
                state: RwLock::new(AppStateData::default()),
                listeners: Mutex::new(Vec::new()),
                next_listener: AtomicU64::new(1),
                pending_save: Mutex::new(PendingSave::default()),
                save_events,
            }),
        }
    }

    pub fn config(&self) -> &AppStateConfig {
        &self.inner.config
    }

    pub fn app_config(&self) -> &AppConfig {
        &self.inner.app_config
    }

    pub fn store(&self) -> &Arc<dyn FarmStoreApi> {
        &self.inner.store
    }

    pub fn preferences(&self) -> &Arc<dyn PreferenceCache> {
        &self.inner.preferences
    }

    /// Copy of the current state.
    pub fn snapshot(&self) -> AppStateData {
        self.inner.state.read().clone()
    }

    pub fn is_loading(&self) -> bool {
        self.inner.state.read().is_loading
    }

    /// Receiver of every save outcome from now on.
    pub fn save_events(&self) -> broadcast::Receiver<SaveOutcome> {
        self.inner.save_events.subscribe()
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("state", &*self.inner.state.read())
            .field("config", &self.inner.config)
            .finish_non_exhaustive()
    }
}
