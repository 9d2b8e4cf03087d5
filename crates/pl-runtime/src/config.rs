//! Runtime configuration from environment variables.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// Configuration for the farm runtime.
#[derive(Debug, Clone, PartialEq)]
pub struct RuntimeConfig {
    /// Directory holding the database and the preference cache
    pub data_dir: PathBuf,

    /// Log level filter (trace, debug, info, warn, error)
    pub log_level: String,

    /// Whether to emit JSON formatted logs
    pub json_logs: bool,

    /// Quiet period before an update is auto-saved
    pub autosave_debounce: Duration,

    /// Period of the unconditional background save
    pub save_interval: Duration,

    /// PIN accepted by the login prompt
    pub pin: String,

    /// Whether a newly created database receives the demonstration stock
    pub seed_demo_data: bool,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("./data"),
            log_level: "info".to_string(),
            json_logs: false,
            autosave_debounce: Duration::from_secs(5),
            save_interval: Duration::from_secs(30),
            pin: "1234".to_string(),
            seed_demo_data: true,
        }
    }
}

impl RuntimeConfig {
    /// Create configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `PL_DATA_DIR`: Data directory (default: ./data)
    /// - `PL_LOG_LEVEL` or `RUST_LOG`: Log level (default: info)
    /// - `PL_JSON_LOGS`: Enable JSON logs (default: false)
    /// - `PL_AUTOSAVE_DEBOUNCE_MS`: Auto-save quiet period (default: 5000)
    /// - `PL_SAVE_INTERVAL_SECS`: Background save period (default: 30)
    /// - `PL_PIN`: Login PIN (default: 1234)
    /// - `PL_SEED_DEMO_DATA`: Seed a new database (default: true)
    pub fn from_env() -> Self {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Same as [`RuntimeConfig::from_env`] over an arbitrary variable source.
    pub fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        Self {
            data_dir: get("PL_DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.data_dir),

            log_level: get("PL_LOG_LEVEL")
                .or_else(|| get("RUST_LOG"))
                .unwrap_or(defaults.log_level),

            json_logs: get("PL_JSON_LOGS")
                .map(|v| v.to_lowercase() == "true" || v == "1")
                .unwrap_or(defaults.json_logs),

            autosave_debounce: get("PL_AUTOSAVE_DEBOUNCE_MS")
                .and_then(|v| v.parse().ok())
                .map(Duration::from_millis)
                .unwrap_or(defaults.autosave_debounce),

            save_interval: get("PL_SAVE_INTERVAL_SECS")
                .and_then(|v| v.parse().ok())
                .filter(|secs: &u64| *secs > 0)
                .map(Duration::from_secs)
                .unwrap_or(defaults.save_interval),

            pin: get("PL_PIN")
                .filter(|pin| !pin.is_empty())
                .unwrap_or(defaults.pin),

            seed_demo_data: get("PL_SEED_DEMO_DATA")
                .map(|v| v.to_lowercase() != "false" && v != "0")
                .unwrap_or(defaults.seed_demo_data),
        }
    }

    pub fn with_data_dir(mut self, data_dir: impl Into<PathBuf>) -> Self {
        self.data_dir = data_dir.into();
        self
    }

    pub fn with_autosave_debounce(mut self, debounce: Duration) -> Self {
        self.autosave_debounce = debounce;
        self
    }

    pub fn with_save_interval(mut self, interval: Duration) -> Self {
        self.save_interval = interval;
        self
    }

    pub fn with_pin(mut self, pin: impl Into<String>) -> Self {
        self.pin = pin.into();
        self
    }

    pub fn with_seed_demo_data(mut self, seed: bool) -> Self {
        self.seed_demo_data = seed;
        self
    }
}
