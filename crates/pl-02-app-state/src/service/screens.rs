//! # App State Service - Screen Data
//!
//! Per-screen aggregation. Each loader issues its store reads concurrently
//! and shapes the results into the screen's payload.

use super::*;
use crate::domain::analytics::{
    distinct, grade_reading, inventory_by_category, start_of_month, start_of_year, FinanceCharts,
    FlockReport, Kpis, REPORT_TEMPLATES,
};
use crate::domain::screens::{
    DashboardData, FinanceData, FinancialReport, FlocksData, InventoryData, InventoryReport,
    QualityData, ReportsData, Screen, ScreenData,
};
use pl_01_persistence::decode_records;
use shared_schema::{
    format_timestamp, EnvironmentReading, Flock, FlockStatus,
    InventoryItem, KeyRange, QualityCheck, QualityIssue, StoreName, Transaction,
};

/// Holds the busy flag for the lifetime of a screen load. Dropping it clears
/// the flag, whether the load finished, failed or was cancelled.
struct BusyGuard {
    state: AppState,
}

impl BusyGuard {
    fn engage(state: &AppState) -> Self {
        state.update(StatePatch::new().loading(true));
        Self {
            state: state.clone(),
        }
    }
}

impl Drop for BusyGuard {
    fn drop(&mut self) {
        self.state.update(StatePatch::new().loading(false));
    }
}

/// The last `limit` entries, newest first.
fn newest_first<T>(mut records: Vec<T>, limit: usize) -> Vec<T> {
    let keep = records.len().saturating_sub(limit);
    records.drain(..keep);
    records.reverse();
    records
}

impl AppState {
    /// Aggregate the data a screen displays.
    ///
    /// Routes without a loader yield `ScreenData::Empty`. The busy flag is
    /// set for the duration of the call.
    pub async fn load_screen_data(&self, screen: &Screen) -> Result<ScreenData, StateError> {
        let _busy = BusyGuard::engage(self);
        tracing::debug!("[pl-02] 📦 Loading {} screen data", screen);

        let data = match screen {
            Screen::Dashboard => ScreenData::Dashboard(Box::new(self.load_dashboard().await?)),
            Screen::Flocks => ScreenData::Flocks(self.load_flocks().await?),
            Screen::Inventory => ScreenData::Inventory(self.load_inventory().await?),
            Screen::Finance => ScreenData::Finance(Box::new(self.load_finance().await?)),
            Screen::Reports => ScreenData::Reports(Box::new(self.load_reports().await?)),
            Screen::Quality => ScreenData::Quality(self.load_quality().await?),
            Screen::Other(_) => ScreenData::Empty,
        };
        Ok(data)
    }

    async fn load_dashboard(&self) -> Result<DashboardData, StateError> {
        let store = &self.inner.store;
        let (stats, low_stock, active) = tokio::try_join!(
            store.get_dashboard_stats(),
            store.get_low_stock_items(),
            store.get_active_flocks()
        )?;

        let kpis = Kpis::compute(&stats, &active, &self.inner.app_config.kpi);
        let mut alerts = low_stock;
        alerts.truncate(self.inner.config.dashboard_alert_limit);
        Ok(DashboardData {
            recent_activity: stats.recent_activity.clone(),
            stats,
            alerts,
            kpis,
        })
    }

    async fn load_flocks(&self) -> Result<FlocksData, StateError> {
        let store = &self.inner.store;
        let (active, completed) = tokio::try_join!(
            store.get_active_flocks(),
            store.get_flocks_by_status(FlockStatus::Completed)
        )?;
        Ok(FlocksData {
            total_count: active.len() + completed.len(),
            active,
            completed,
        })
    }

    async fn load_inventory(&self) -> Result<InventoryData, StateError> {
        let store = &self.inner.store;
        let (docs, summary) = tokio::try_join!(
            store.get_all(StoreName::Inventory, None, None),
            store.get_inventory_summary()
        )?;

        let items: Vec<InventoryItem> = decode_records(StoreName::Inventory, docs)?;
        Ok(InventoryData {
            categories: distinct(items.iter().map(|i| i.category.as_str())),
            suppliers: distinct(items.iter().filter_map(|i| i.supplier.as_deref())),
            items,
            summary,
        })
    }

    async fn load_finance(&self) -> Result<FinanceData, StateError> {
        let now = self.inner.time_source.now();
        let (month_start, year_start) = (start_of_month(now), start_of_year(now));
        let this_year = KeyRange::bound(format_timestamp(year_start), format_timestamp(now));

        let store = &self.inner.store;
        let (monthly_summary, yearly_summary, year_docs, all_docs, budget) = tokio::try_join!(
            store.get_financial_summary(month_start, now),
            store.get_financial_summary(year_start, now),
            store.get_all(StoreName::Transactions, Some("date"), Some(this_year)),
            store.get_all(StoreName::Transactions, Some("date"), None),
            store.get_budget()
        )?;

        let year: Vec<Transaction> = decode_records(StoreName::Transactions, year_docs)?;
        let all: Vec<Transaction> = decode_records(StoreName::Transactions, all_docs)?;
        let charts = FinanceCharts::compute(&year, &monthly_summary, budget.as_ref());
        Ok(FinanceData {
            recent_transactions: newest_first(all, self.inner.config.recent_transactions_limit),
            monthly_summary,
            yearly_summary,
            budget,
            charts,
        })
    }

    async fn load_reports(&self) -> Result<ReportsData, StateError> {
        let now = self.inner.time_source.now();
        let expiry_days = self.inner.app_config.inventory.expiry_warning_days;

        let store = &self.inner.store;
        let (flock_docs, monthly, yearly, summary, low_stock, expiring, item_docs, compliance) =
            tokio::try_join!(
                store.get_all(StoreName::Flocks, None, None),
                store.get_financial_summary(start_of_month(now), now),
                store.get_financial_summary(start_of_year(now), now),
                store.get_inventory_summary(),
                store.get_low_stock_items(),
                store.get_expiring_items(expiry_days),
                store.get_all(StoreName::Inventory, None, None),
                store.get_compliance()
            )?;

        let flocks: Vec<Flock> = decode_records(StoreName::Flocks, flock_docs)?;
        let items: Vec<InventoryItem> = decode_records(StoreName::Inventory, item_docs)?;
        Ok(ReportsData {
            flock_reports: flocks
                .iter()
                .map(|flock| FlockReport::from_flock(flock, now))
                .collect(),
            financial_reports: FinancialReport { monthly, yearly },
            inventory_reports: InventoryReport {
                summary,
                low_stock,
                expiring,
                by_category: inventory_by_category(&items),
            },
            quality_report: compliance,
            available_reports: REPORT_TEMPLATES.to_vec(),
        })
    }

    async fn load_quality(&self) -> Result<QualityData, StateError> {
        let store = &self.inner.store;
        let (readings, compliance, issue_docs, check_docs) = tokio::try_join!(
            store.get_all(StoreName::EnvironmentData, Some("timestamp"), None),
            store.get_compliance(),
            store.get_all(
                StoreName::QualityIssues,
                Some("status"),
                Some(KeyRange::only("open")),
            ),
            store.get_all(StoreName::QualityChecks, Some("date"), None)
        )?;

        let standards = self.inner.app_config.quality.clone();
        let latest: Option<EnvironmentReading> =
            decode_records(StoreName::EnvironmentData, readings)?.pop();
        let checks: Vec<QualityCheck> = decode_records(StoreName::QualityChecks, check_docs)?;
        Ok(QualityData {
            metrics: latest
                .map(|reading| grade_reading(&reading, &standards))
                .unwrap_or_default(),
            compliance,
            issues: decode_records::<QualityIssue>(StoreName::QualityIssues, issue_docs)?,
            recent_checks: newest_first(checks, self.inner.config.recent_checks_limit),
            standards,
        })
    }
}
