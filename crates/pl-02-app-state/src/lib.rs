//! # Application State Container (pl-02)
//!
//! Session and UI state for the farm application, kept in memory, observed
//! by listeners and persisted to the farm store after a quiet period.
//!
//! ## Responsibilities
//!
//! - Load preferences, unread notifications and the current user at start-up
//! - Apply partial updates and notify subscribers with `(new, old)`
//! - Save the state under the `app_state` settings entry, debounced, and
//!   publish every outcome on `save_events()`
//! - Aggregate per-screen data with concurrent store reads
//!
//! ## Crate Structure (Hexagonal Architecture)
//!
//! - `domain/` - State record, patches, screen payloads, analytics
//! - `ports/` - `PreferenceCache` (outbound)
//! - `adapters/` - In-memory and JSON-file preference caches
//! - `service/` - `AppState`
//!
//! ## Usage
//!
//! ```ignore
//! use pl_02_app_state::{AppState, AppStateConfig, Screen, StatePatch};
//!
//! let state = AppState::new(deps, AppStateConfig::default());
//! state.initialize().await?;
//! state.update(StatePatch::new().theme("light"));
//! let payload = state.load_screen_data(&Screen::Dashboard).await?;
//! state.flush().await;
//! ```

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod service;

pub use adapters::{InMemoryPreferences, JsonFilePreferences, PREFERENCES_FILE};
pub use domain::errors::{PreferenceError, StateError};
pub use domain::screens::{Screen, ScreenData};
pub use domain::state::{AppStateData, ListenerId, SaveOutcome, StatePatch, APP_STATE_KEY};
pub use ports::outbound::PreferenceCache;
pub use service::{AppState, AppStateConfig, AppStateDependencies, Listener};
