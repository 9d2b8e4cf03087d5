//! PIN login, remembered in the preference cache.

use std::sync::Arc;

use pl_02_app_state::{PreferenceCache, PreferenceError};
use serde_json::Value;

/// Preference entry holding the logged-in flag.
pub const LOGIN_KEY: &str = "poultry_login";

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum SessionError {
    #[error("Incorrect PIN")]
    InvalidPin,

    #[error(transparent)]
    Preferences(#[from] PreferenceError),
}

pub struct Session {
    preferences: Arc<dyn PreferenceCache>,
    pin: String,
}

impl Session {
    pub fn new(preferences: Arc<dyn PreferenceCache>, pin: impl Into<String>) -> Self {
        Self {
            preferences,
            pin: pin.into(),
        }
    }

    /// Whether a previous login is remembered. An unreadable cache counts as
    /// logged out.
    pub fn is_logged_in(&self) -> bool {
        match self.preferences.load() {
            Ok(preferences) => preferences.get(LOGIN_KEY) == Some(&Value::Bool(true)),
            Err(e) => {
                tracing::warn!("[pl-runtime] 🔒 Login state unavailable: {}", e);
                false
            }
        }
    }

    /// Check `pin` and remember the login on success.
    pub fn login(&self, pin: &str) -> Result<(), SessionError> {
        if pin != self.pin {
            tracing::warn!("[pl-runtime] 🔒 Rejected login attempt");
            return Err(SessionError::InvalidPin);
        }
        self.set_flag(true)?;
        tracing::info!("[pl-runtime] 🔒 Logged in");
        Ok(())
    }

    pub fn logout(&self) -> Result<(), SessionError> {
        self.set_flag(false)?;
        tracing::info!("[pl-runtime] 🔒 Logged out");
        Ok(())
    }

    fn set_flag(&self, logged_in: bool) -> Result<(), SessionError> {
        let mut preferences = self.preferences.load()?;
        if logged_in {
            preferences.insert(LOGIN_KEY.to_string(), Value::Bool(true));
        } else {
            preferences.remove(LOGIN_KEY);
        }
        self.preferences.store(&preferences)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pl_02_app_state::{InMemoryPreferences, JsonFilePreferences};
    use serde_json::json;

    fn session() -> (Session, Arc<InMemoryPreferences>) {
        let preferences = Arc::new(InMemoryPreferences::new());
        (Session::new(preferences.clone(), "1234"), preferences)
    }

    #[test]
    fn test_correct_pin_logs_in() {
        let (session, preferences) = session();
        assert!(!session.is_logged_in());

        session.login("1234").unwrap();
        assert!(session.is_logged_in());
        assert_eq!(preferences.load().unwrap().get(LOGIN_KEY), Some(&json!(true)));
    }

    #[test]
    fn test_wrong_pin_is_rejected() {
        let (session, preferences) = session();
        assert_eq!(session.login("0000"), Err(SessionError::InvalidPin));
        assert!(!session.is_logged_in());
        assert!(preferences.load().unwrap().is_empty());
    }

    #[test]
    fn test_logout_keeps_other_preferences() {
        let (session, preferences) = session();
        let mut entries = preferences.load().unwrap();
        entries.insert("theme".into(), json!("light"));
        preferences.store(&entries).unwrap();

        session.login("1234").unwrap();
        session.logout().unwrap();

        let entries = preferences.load().unwrap();
        assert!(!session.is_logged_in());
        assert_eq!(entries.get("theme"), Some(&json!("light")));
        assert!(entries.get(LOGIN_KEY).is_none());
    }

    #[test]
    fn test_login_survives_restart() {
        let dir = tempfile::tempdir().unwrap();
        let first = Session::new(Arc::new(JsonFilePreferences::in_dir(dir.path())), "1234");
        first.login("1234").unwrap();

        let second = Session::new(Arc::new(JsonFilePreferences::in_dir(dir.path())), "1234");
        assert!(second.is_logged_in());
    }
}
