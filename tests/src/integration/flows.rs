//! # End-to-End Flows
//!
//! The state container over real stores, and the runtime across restarts.
//!
//! ## Flows Tested
//!
//! 1. **Updates → debounced save → file store**: one snapshot per burst
//! 2. **Store writes → screen payloads**: screens see what the store holds
//! 3. **Runtime shutdown → restart**: route, theme and login come back

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use async_trait::async_trait;
    use parking_lot::Mutex;
    use serde_json::json;

    use pl_01_persistence::{FarmStoreApi, FarmStoreConfig, FileFarmStore, SystemTimeSource};
    use pl_02_app_state::{
        AppState, AppStateConfig, AppStateDependencies, InMemoryPreferences, JsonFilePreferences,
        Screen, ScreenData, StatePatch, APP_STATE_KEY,
    };
    use pl_runtime::{
        Command, FarmRuntime, RenderError, RenderRequest, RuntimeConfig, ScreenRenderer,
    };
    use shared_schema::{AppConfig, RecordKey, StoreName, TransactionDraft, TransactionKind};

    use crate::fixtures::{empty_store, item};

    // =========================================================================
    // TEST FIXTURES
    // =========================================================================

    #[derive(Default)]
    struct RecordingRenderer(Mutex<Vec<RenderRequest>>);

    #[async_trait]
    impl ScreenRenderer for RecordingRenderer {
        async fn render(&self, request: RenderRequest) -> Result<(), RenderError> {
            self.0.lock().push(request);
            Ok(())
        }
    }

    impl RecordingRenderer {
        fn routes(&self) -> Vec<String> {
            self.0.lock().iter().map(|r| r.route.clone()).collect()
        }
    }

    // =========================================================================
    // STATE CONTAINER OVER REAL STORES
    // =========================================================================

    #[tokio::test(start_paused = true)]
    async fn test_burst_of_updates_writes_one_snapshot_to_file_store() {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(FileFarmStore::open_dir(
            dir.path(),
            FarmStoreConfig::default().with_seed_demo_data(false),
        ));
        let state = AppState::new(
            AppStateDependencies {
                store: store.clone(),
                preferences: Arc::new(JsonFilePreferences::in_dir(dir.path())),
                time_source: Arc::new(SystemTimeSource),
                app_config: AppConfig::default(),
            },
            AppStateConfig::default(),
        );
        state.initialize().await.unwrap();
        let mut events = state.save_events();

        state.update(StatePatch::new().theme("light"));
        state.update(StatePatch::new().language("en"));
        state.update(StatePatch::new().selected_module("finance"));
        assert!(state.has_pending_save());

        tokio::time::sleep(Duration::from_secs(6)).await;

        assert!(events.try_recv().unwrap().is_saved());
        assert!(events.try_recv().is_err());

        let saved = store
            .get(StoreName::Settings, &RecordKey::from(APP_STATE_KEY))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(saved["theme"], json!("light"));
        assert_eq!(saved["language"], json!("en"));
        assert_eq!(saved["selectedModule"], json!("finance"));
        assert!(saved.contains_key("lastSync"));
        assert!(!saved.contains_key("isLoading"));
    }

    #[tokio::test]
    async fn test_screens_reflect_store_writes() {
        let (store, clock) = empty_store();
        let store = Arc::new(store);
        let state = AppState::new(
            AppStateDependencies {
                store: store.clone(),
                preferences: Arc::new(InMemoryPreferences::new()),
                time_source: clock.clone(),
                app_config: AppConfig::default(),
            },
            AppStateConfig::default(),
        );
        state.initialize().await.unwrap();

        store.add(StoreName::Inventory, item(3, 5.0, 20.0, 4.0)).await.unwrap();
        store
            .add_financial_transaction(
                TransactionDraft::new(TransactionKind::Income, 900.0).with_category("eggs"),
            )
            .await
            .unwrap();
        store
            .add_financial_transaction(
                TransactionDraft::new(TransactionKind::Expense, 300.0).with_category("feed"),
            )
            .await
            .unwrap();

        let ScreenData::Finance(finance) = state.load_screen_data(&Screen::Finance).await.unwrap()
        else {
            panic!("expected finance payload");
        };
        assert_eq!(finance.monthly_summary.net_profit, 600.0);
        assert_eq!(finance.recent_transactions.len(), 2);
        assert_eq!(finance.recent_transactions[0].amount, 300.0);

        let ScreenData::Dashboard(dashboard) =
            state.load_screen_data(&Screen::Dashboard).await.unwrap()
        else {
            panic!("expected dashboard payload");
        };
        assert_eq!(dashboard.stats.low_stock_alerts, 1);
        assert_eq!(dashboard.alerts.len(), 1);
        assert_eq!(dashboard.stats.inventory_value, 20.0);
        assert!(!state.is_loading());
    }

    // =========================================================================
    // RUNTIME ACROSS RESTARTS
    // =========================================================================

    #[tokio::test]
    async fn test_runtime_restart_restores_session() {
        let dir = tempfile::tempdir().unwrap();
        let config = RuntimeConfig::default()
            .with_data_dir(dir.path())
            .with_pin("2468");

        {
            let renderer = Arc::new(RecordingRenderer::default());
            let runtime = FarmRuntime::new(config.clone(), renderer.clone());
            runtime.start().await.unwrap();
            assert!(renderer.routes().is_empty());

            runtime.execute(Command::Login("2468".into())).await.unwrap();
            runtime.execute("go quality".parse().unwrap()).await.unwrap();
            runtime.state().update(StatePatch::new().theme("light"));
            assert_eq!(renderer.routes(), vec!["dashboard", "quality"]);
            assert!(runtime.shutdown().await.is_saved());
        }

        let renderer = Arc::new(RecordingRenderer::default());
        let runtime = FarmRuntime::new(config, renderer.clone());
        runtime.start().await.unwrap();

        assert_eq!(renderer.routes(), vec!["quality"]);
        let state = runtime.state().snapshot();
        assert_eq!(state.theme, "light");
        assert_eq!(state.selected_module, "quality");
        assert_eq!(state.user.map(|u| u.id), Some(RecordKey::from("admin")));

        runtime.execute(Command::Logout).await.unwrap();
        assert!(!runtime.session().is_logged_in());
        runtime.shutdown().await;
    }
}
