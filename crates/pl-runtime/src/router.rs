//! # Screen Router
//!
//! Maps route names to screens, keeps the navigation history and hands each
//! loaded payload to a [`ScreenRenderer`].

use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use pl_02_app_state::{AppState, Screen, StateError, StatePatch};
use shared_schema::Document;
use tracing::{debug, info};

/// Route shown when there is nowhere to go back to.
pub const HOME_ROUTE: &str = "dashboard";

/// Routes that also select a navigation module.
pub const TOP_LEVEL_ROUTES: [&str; 8] = [
    "dashboard",
    "flocks",
    "inventory",
    "finance",
    "reports",
    "quality",
    "environment",
    "settings",
];

/// Routes reached from within a module.
pub const DETAIL_ROUTES: [&str; 4] = ["flock-details", "add-flock", "health", "notifications"];

pub fn is_known_route(route: &str) -> bool {
    TOP_LEVEL_ROUTES.contains(&route) || DETAIL_ROUTES.contains(&route)
}

/// Display title of a route; unknown routes are their own title.
pub fn route_title(route: &str) -> &str {
    match route {
        "dashboard" => "Dashboard",
        "flocks" => "Flock management",
        "inventory" => "Inventory",
        "finance" => "Finance",
        "reports" => "Reports",
        "quality" => "Quality control",
        "environment" => "Environment",
        "health" => "Health records",
        "notifications" => "Notifications",
        "settings" => "Settings",
        "add-flock" => "New flock",
        "flock-details" => "Flock details",
        other => other,
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RouteError {
    #[error("Unknown route: {0}")]
    NotFound(String),

    #[error("Failed to load {route}: {source}")]
    Load {
        route: String,
        #[source]
        source: StateError,
    },

    #[error("Invalid payload for {route}: {message}")]
    Payload { route: String, message: String },

    #[error("Failed to render {route}: {source}")]
    Render {
        route: String,
        #[source]
        source: RenderError,
    },
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{0}")]
pub struct RenderError(pub String);

/// Everything a renderer needs to draw one screen.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderRequest {
    pub route: String,
    pub title: String,
    /// Navigation parameters overlaid with the screen payload.
    pub data: Document,
}

/// Presentation side of the router.
#[async_trait]
pub trait ScreenRenderer: Send + Sync {
    async fn render(&self, request: RenderRequest) -> Result<(), RenderError>;
}

#[derive(Debug, Clone, PartialEq)]
pub struct HistoryEntry {
    pub route: String,
    pub params: Document,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavigationOutcome {
    Rendered,
    /// Already on this route with these parameters.
    Unchanged,
}

#[derive(Default)]
struct Navigation {
    current: Option<HistoryEntry>,
    history: Vec<HistoryEntry>,
}

pub struct Router {
    state: AppState,
    renderer: Arc<dyn ScreenRenderer>,
    navigation: Mutex<Navigation>,
}

impl Router {
    pub fn new(state: AppState, renderer: Arc<dyn ScreenRenderer>) -> Self {
        Self {
            state,
            renderer,
            navigation: Mutex::new(Navigation::default()),
        }
    }

    /// Show `route`.
    ///
    /// The entry is recorded in the history before the screen loads, so a
    /// failed load can still be navigated back from. The current entry and
    /// `currentRoute` only move once the renderer has accepted the screen,
    /// so retrying a failed route loads it again.
    pub async fn navigate(
        &self,
        route: &str,
        params: Document,
    ) -> Result<NavigationOutcome, RouteError> {
        if !is_known_route(route) {
            return Err(RouteError::NotFound(route.to_string()));
        }

        let entry = HistoryEntry {
            route: route.to_string(),
            params,
        };
        {
            let mut navigation = self.navigation.lock();
            if navigation.current.as_ref() == Some(&entry) {
                debug!("[pl-runtime] Already on {}", route);
                return Ok(NavigationOutcome::Unchanged);
            }
            if navigation.history.last() != Some(&entry) {
                navigation.history.push(entry.clone());
            }
        }

        if TOP_LEVEL_ROUTES.contains(&route) {
            self.state.update(StatePatch::new().selected_module(route));
        }

        let payload = self
            .state
            .load_screen_data(&Screen::from_route(route))
            .await
            .map_err(|source| RouteError::Load {
                route: route.to_string(),
                source,
            })?
            .into_document()
            .map_err(|e| RouteError::Payload {
                route: route.to_string(),
                message: e.to_string(),
            })?;

        let mut data = entry.params.clone();
        data.extend(payload);

        self.renderer
            .render(RenderRequest {
                route: route.to_string(),
                title: route_title(route).to_string(),
                data,
            })
            .await
            .map_err(|source| RouteError::Render {
                route: route.to_string(),
                source,
            })?;

        self.navigation.lock().current = Some(entry);
        self.state.update(StatePatch::new().current_route(route));
        info!("[pl-runtime] 🔄 Navigated to {}", route);
        Ok(NavigationOutcome::Rendered)
    }

    /// Return to the previous screen, or to the dashboard when there is
    /// none.
    pub async fn go_back(&self) -> Result<NavigationOutcome, RouteError> {
        let previous = {
            let mut navigation = self.navigation.lock();
            if navigation.history.len() > 1 {
                navigation.history.pop();
                let previous = navigation.history.pop();
                navigation.current = None;
                previous
            } else {
                None
            }
        };

        match previous {
            Some(entry) => self.navigate(&entry.route, entry.params).await,
            None => self.navigate(HOME_ROUTE, Document::new()).await,
        }
    }

    pub fn current(&self) -> Option<HistoryEntry> {
        self.navigation.lock().current.clone()
    }

    pub fn history(&self) -> Vec<HistoryEntry> {
        self.navigation.lock().history.clone()
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }
}

/// Renderer writing a one-line summary of each screen to the log.
#[derive(Debug, Default)]
pub struct LogRenderer;

#[async_trait]
impl ScreenRenderer for LogRenderer {
    async fn render(&self, request: RenderRequest) -> Result<(), RenderError> {
        let mut fields: Vec<&str> = request.data.keys().map(String::as_str).collect();
        fields.sort_unstable();
        info!(
            route = %request.route,
            fields = %fields.join(","),
            "[pl-runtime] 📦 {}",
            request.title
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pl_01_persistence::{MemoryFarmStore, SystemTimeSource};
    use pl_02_app_state::{AppStateConfig, AppStateDependencies, InMemoryPreferences};
    use serde_json::json;
    use shared_schema::AppConfig;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct RecordingRenderer {
        requests: Mutex<Vec<RenderRequest>>,
        failures_left: Mutex<usize>,
        calls: AtomicUsize,
    }

    impl RecordingRenderer {
        fn failing_times(failures: usize) -> Self {
            Self {
                failures_left: Mutex::new(failures),
                ..Self::default()
            }
        }

        fn failing() -> Self {
            Self::failing_times(usize::MAX)
        }

        fn routes(&self) -> Vec<String> {
            self.requests
                .lock()
                .iter()
                .map(|r| r.route.clone())
                .collect()
        }

        fn last(&self) -> RenderRequest {
            self.requests.lock().last().cloned().unwrap()
        }
    }

    #[async_trait]
    impl ScreenRenderer for RecordingRenderer {
        async fn render(&self, request: RenderRequest) -> Result<(), RenderError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            {
                let mut failures_left = self.failures_left.lock();
                if *failures_left > 0 {
                    *failures_left -= 1;
                    return Err(RenderError("display detached".into()));
                }
            }
            self.requests.lock().push(request);
            Ok(())
        }
    }

    fn make_state() -> AppState {
        AppState::new(
            AppStateDependencies {
                store: Arc::new(MemoryFarmStore::in_memory()),
                preferences: Arc::new(InMemoryPreferences::new()),
                time_source: Arc::new(SystemTimeSource),
                app_config: AppConfig::default(),
            },
            AppStateConfig::default(),
        )
    }

    fn make_router(renderer: Arc<RecordingRenderer>) -> Router {
        Router::new(make_state(), renderer)
    }

    fn params(value: serde_json::Value) -> Document {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_route_tables() {
        assert!(is_known_route("dashboard"));
        assert!(is_known_route("flock-details"));
        assert!(!is_known_route("eggs"));
        assert_eq!(route_title("add-flock"), "New flock");
        assert_eq!(route_title("eggs"), "eggs");
    }

    #[tokio::test]
    async fn test_navigate_renders_and_records_route() {
        let renderer = Arc::new(RecordingRenderer::default());
        let router = make_router(renderer.clone());

        let outcome = router.navigate("inventory", Document::new()).await.unwrap();
        assert_eq!(outcome, NavigationOutcome::Rendered);

        let request = renderer.last();
        assert_eq!(request.title, "Inventory");
        assert!(request.data.contains_key("items"));
        assert!(request.data.contains_key("summary"));

        let state = router.state().snapshot();
        assert_eq!(state.selected_module, "inventory");
        assert_eq!(state.current_route.as_deref(), Some("inventory"));
        assert!(!state.is_loading);
    }

    #[tokio::test]
    async fn test_same_route_and_params_is_unchanged() {
        let renderer = Arc::new(RecordingRenderer::default());
        let router = make_router(renderer.clone());

        router.navigate("flocks", Document::new()).await.unwrap();
        let again = router.navigate("flocks", Document::new()).await.unwrap();
        assert_eq!(again, NavigationOutcome::Unchanged);
        assert_eq!(renderer.routes(), vec!["flocks"]);

        router
            .navigate("flocks", params(json!({"status": "active"})))
            .await
            .unwrap();
        assert_eq!(renderer.routes(), vec!["flocks", "flocks"]);
        assert_eq!(router.history().len(), 2);
    }

    #[tokio::test]
    async fn test_detail_route_keeps_module_and_passes_params() {
        let renderer = Arc::new(RecordingRenderer::default());
        let router = make_router(renderer.clone());

        router.navigate("flocks", Document::new()).await.unwrap();
        router
            .navigate("flock-details", params(json!({"id": 7})))
            .await
            .unwrap();

        assert_eq!(renderer.last().data, params(json!({"id": 7})));
        let state = router.state().snapshot();
        assert_eq!(state.selected_module, "flocks");
        assert_eq!(state.current_route.as_deref(), Some("flock-details"));
    }

    #[tokio::test]
    async fn test_payload_overrides_params() {
        let renderer = Arc::new(RecordingRenderer::default());
        let router = make_router(renderer.clone());

        router
            .navigate("flocks", params(json!({"active": "x", "tab": 2})))
            .await
            .unwrap();

        let data = renderer.last().data;
        assert!(data["active"].is_array());
        assert_eq!(data["tab"], json!(2));
    }

    #[tokio::test]
    async fn test_unknown_route_is_not_found() {
        let renderer = Arc::new(RecordingRenderer::default());
        let router = make_router(renderer.clone());

        let err = router.navigate("eggs", Document::new()).await.unwrap_err();
        assert!(matches!(err, RouteError::NotFound(route) if route == "eggs"));
        assert!(renderer.routes().is_empty());
        assert!(router.history().is_empty());
        assert!(router.current().is_none());
    }

    #[tokio::test]
    async fn test_go_back_returns_to_previous_screen() {
        let renderer = Arc::new(RecordingRenderer::default());
        let router = make_router(renderer.clone());

        router.navigate("flocks", Document::new()).await.unwrap();
        router.navigate("inventory", Document::new()).await.unwrap();
        router.go_back().await.unwrap();

        assert_eq!(renderer.routes(), vec!["flocks", "inventory", "flocks"]);
        assert_eq!(router.current().unwrap().route, "flocks");
        assert_eq!(router.history().len(), 1);
    }

    #[tokio::test]
    async fn test_go_back_without_history_goes_home() {
        let renderer = Arc::new(RecordingRenderer::default());
        let router = make_router(renderer.clone());

        router.navigate("finance", Document::new()).await.unwrap();
        router.go_back().await.unwrap();

        assert_eq!(renderer.routes(), vec!["finance", "dashboard"]);
        assert_eq!(router.state().snapshot().selected_module, "dashboard");
    }

    #[tokio::test]
    async fn test_render_failure_leaves_current_route() {
        let router = make_router(Arc::new(RecordingRenderer::failing()));

        let err = router.navigate("reports", Document::new()).await.unwrap_err();
        assert!(matches!(err, RouteError::Render { .. }));

        let state = router.state().snapshot();
        assert_eq!(state.current_route, None);
        assert_eq!(state.selected_module, "reports");
        assert!(!state.is_loading);
        assert_eq!(router.history().len(), 1);
        assert!(router.current().is_none());
    }

    #[tokio::test]
    async fn test_failed_route_can_be_retried() {
        let renderer = Arc::new(RecordingRenderer::failing_times(1));
        let router = make_router(renderer.clone());

        assert!(router.navigate("reports", Document::new()).await.is_err());
        let retry = router.navigate("reports", Document::new()).await.unwrap();
        assert_eq!(retry, NavigationOutcome::Rendered);
        assert_eq!(renderer.calls.load(Ordering::SeqCst), 2);
        assert_eq!(renderer.routes(), vec!["reports"]);

        assert_eq!(router.current().unwrap().route, "reports");
        assert_eq!(
            router.state().snapshot().current_route.as_deref(),
            Some("reports")
        );
        assert_eq!(router.history().len(), 1);

        let again = router.navigate("reports", Document::new()).await.unwrap();
        assert_eq!(again, NavigationOutcome::Unchanged);
    }

    /// Log sink shared between the subscriber and the test.
    #[derive(Clone, Default)]
    struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

    impl std::io::Write for CapturedLogs {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_navigation_logs_carry_crate_prefix() {
        let logs = CapturedLogs::default();
        let writer = logs.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .with_max_level(tracing::Level::DEBUG)
            .with_ansi(false)
            .finish();
        let _guard = tracing::subscriber::set_default(subscriber);

        let router = make_router(Arc::new(RecordingRenderer::default()));
        router.navigate("flocks", Document::new()).await.unwrap();
        router.navigate("flocks", Document::new()).await.unwrap();

        let output = String::from_utf8(logs.0.lock().clone()).unwrap();
        let lines: Vec<&str> = output
            .lines()
            .filter(|line| line.contains("pl_runtime::router"))
            .collect();
        assert!(lines.iter().any(|l| l.contains("[pl-runtime] 🔄 Navigated to flocks")));
        assert!(lines.iter().any(|l| l.contains("[pl-runtime] Already on flocks")));
        assert!(lines.iter().all(|l| l.contains("[pl-runtime]")));
    }
}
