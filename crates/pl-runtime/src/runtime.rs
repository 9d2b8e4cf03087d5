//! # Farm Runtime
//!
//! Owns the state container, the router and the login session, and keeps
//! the state saved on a fixed interval in addition to the debounced save.
//!
//! ## Startup Sequence
//!
//! 1. Load preferences, notifications and the current user
//! 2. Restore the saved application state
//! 3. Start the periodic save
//! 4. Reopen the last screen when a login is remembered

use std::sync::Arc;

use parking_lot::Mutex;
use pl_01_persistence::{FarmStoreApi, FarmStoreConfig, SystemTimeSource};
use pl_02_app_state::{
    AppState, AppStateConfig, AppStateDependencies, JsonFilePreferences, SaveOutcome, StateError,
};
use shared_schema::{AppConfig, Document};
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::router::{is_known_route, RouteError, Router, ScreenRenderer, HOME_ROUTE};
use crate::session::{Session, SessionError};
use crate::shell::{Command, HELP};
use crate::RuntimeConfig;

#[derive(Debug, thiserror::Error)]
pub enum RuntimeError {
    #[error(transparent)]
    State(#[from] StateError),

    #[error(transparent)]
    Route(#[from] RouteError),

    #[error(transparent)]
    Session(#[from] SessionError),

    #[error("Login required")]
    LoginRequired,
}

/// Whether the command loop should keep reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

pub struct FarmRuntime {
    config: RuntimeConfig,
    state: AppState,
    router: Router,
    session: Session,
    periodic_save: Mutex<Option<JoinHandle<()>>>,
}

impl FarmRuntime {
    /// Runtime over the database and preference file in `config.data_dir`.
    pub fn new(config: RuntimeConfig, renderer: Arc<dyn ScreenRenderer>) -> Self {
        let state = AppState::new(
            AppStateDependencies {
                store: open_store(&config),
                preferences: Arc::new(JsonFilePreferences::in_dir(&config.data_dir)),
                time_source: Arc::new(SystemTimeSource),
                app_config: AppConfig::default(),
            },
            AppStateConfig::default().with_autosave_debounce(config.autosave_debounce),
        );
        Self::with_state(config, state, renderer)
    }

    /// Runtime over an already assembled state container.
    pub fn with_state(
        config: RuntimeConfig,
        state: AppState,
        renderer: Arc<dyn ScreenRenderer>,
    ) -> Self {
        let session = Session::new(state.preferences().clone(), config.pin.clone());
        Self {
            router: Router::new(state.clone(), renderer),
            session,
            state,
            config,
            periodic_save: Mutex::new(None),
        }
    }

    pub async fn start(&self) -> Result<(), RuntimeError> {
        info!("[pl-runtime] ===========================================");
        info!("[pl-runtime]   Poultry-Ledger v{}", env!("CARGO_PKG_VERSION"));
        info!("[pl-runtime]   Data Dir: {:?}", self.config.data_dir);
        info!("[pl-runtime] ===========================================");

        self.state.initialize().await?;
        if !self.state.restore().await? {
            info!("[pl-runtime] No saved application state, starting fresh");
        }
        self.start_periodic_save();

        if self.session.is_logged_in() {
            self.open_last_screen().await?;
        } else {
            info!("[pl-runtime] 🔒 Locked. Use `login <pin>` to continue.");
        }
        Ok(())
    }

    fn start_periodic_save(&self) {
        let state = self.state.clone();
        let period = self.config.save_interval;
        let handle = tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            // The first tick completes immediately.
            interval.tick().await;
            loop {
                interval.tick().await;
                state.save().await;
            }
        });
        if let Some(previous) = self.periodic_save.lock().replace(handle) {
            previous.abort();
        }
    }

    async fn open_last_screen(&self) -> Result<(), RuntimeError> {
        let route = self
            .state
            .snapshot()
            .current_route
            .filter(|route| is_known_route(route))
            .unwrap_or_else(|| HOME_ROUTE.to_string());
        self.router.navigate(&route, Document::new()).await?;
        Ok(())
    }

    /// Run one shell command.
    pub async fn execute(&self, command: Command) -> Result<Flow, RuntimeError> {
        match command {
            Command::Go { route, params } => {
                self.require_login()?;
                self.router.navigate(&route, params).await?;
            }
            Command::Back => {
                self.require_login()?;
                self.router.go_back().await?;
            }
            Command::Login(pin) => {
                self.session.login(&pin)?;
                self.open_last_screen().await?;
            }
            Command::Logout => self.session.logout()?,
            Command::Save => {
                if let SaveOutcome::Failed(e) = self.state.flush().await {
                    warn!("[pl-runtime] Save failed: {}", e);
                }
            }
            Command::Help => println!("{}", HELP),
            Command::Quit => return Ok(Flow::Quit),
        }
        Ok(Flow::Continue)
    }

    fn require_login(&self) -> Result<(), RuntimeError> {
        if self.session.is_logged_in() {
            Ok(())
        } else {
            Err(RuntimeError::LoginRequired)
        }
    }

    /// Stop the periodic save and write the final state.
    pub async fn shutdown(&self) -> SaveOutcome {
        info!("[pl-runtime] Shutting down Poultry-Ledger");
        let periodic = self.periodic_save.lock().take();
        if let Some(handle) = periodic {
            handle.abort();
            let _ = handle.await;
        }
        self.state.flush().await
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn router(&self) -> &Router {
        &self.router
    }

    pub fn session(&self) -> &Session {
        &self.session
    }
}

#[cfg(not(feature = "rocksdb"))]
fn open_store(config: &RuntimeConfig) -> Arc<dyn FarmStoreApi> {
    Arc::new(pl_01_persistence::FileFarmStore::open_dir(
        &config.data_dir,
        FarmStoreConfig::default().with_seed_demo_data(config.seed_demo_data),
    ))
}

#[cfg(feature = "rocksdb")]
fn open_store(config: &RuntimeConfig) -> Arc<dyn FarmStoreApi> {
    use pl_01_persistence::adapters::{RocksDbConfig, RocksDbOpener};
    use pl_01_persistence::{FarmStore, FarmStoreDependencies};

    Arc::new(FarmStore::new(
        FarmStoreDependencies {
            opener: RocksDbOpener::new(RocksDbConfig {
                path: config.data_dir.join("rocksdb"),
                ..RocksDbConfig::default()
            }),
            time_source: SystemTimeSource,
        },
        FarmStoreConfig::default().with_seed_demo_data(config.seed_demo_data),
    ))
}
