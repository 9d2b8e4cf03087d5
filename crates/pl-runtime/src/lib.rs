//! # Poultry-Ledger Runtime
//!
//! Library side of the `poultry-ledger` binary, exposed for testing.
//!
//! ## Modules
//!
//! - `config` - `RuntimeConfig` from `PL_*` environment variables
//! - `logging` - tracing subscriber setup
//! - `router` - route table, navigation history, `ScreenRenderer`
//! - `session` - PIN login remembered in the preference cache
//! - `shell` - line commands read from standard input
//! - `runtime` - `FarmRuntime`, wiring all of the above together

pub mod config;
pub mod logging;
pub mod router;
pub mod runtime;
pub mod session;
pub mod shell;

pub use config::RuntimeConfig;
pub use logging::{init_logging, LoggingError};
pub use router::{
    LogRenderer, NavigationOutcome, RenderError, RenderRequest, RouteError, Router,
    ScreenRenderer,
};
pub use runtime::{FarmRuntime, Flow, RuntimeError};
pub use session::{Session, SessionError};
pub use shell::{Command, CommandError};
