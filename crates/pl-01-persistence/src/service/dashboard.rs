//! # Farm Store Service - Dashboard
//!
//! The dashboard's headline figures, computed from one consistent read.

use super::helpers::{index_scan, scan_store};
use super::*;
use crate::domain::summaries::{self, DashboardStats, FinancialSummary};
use crate::domain::validation::decode_records;
use chrono::Duration;
use shared_schema::{Flock, FlockStatus, InventoryItem, Transaction};

impl<O, TS> FarmStore<O, TS>
where
    O: StoreOpener,
    TS: TimeSource,
{
    pub async fn get_dashboard_stats(&self) -> Result<DashboardStats, StoreError> {
        let now = self.time_source.now();
        let since = now - Duration::days(self.config.dashboard_lookback_days);

        let backend = self.backend().await?;
        let kv = backend.read();

        let flocks: Vec<Flock> = decode_records(
            StoreName::Flocks,
            scan_store(&*kv, StoreName::Flocks)?.into_iter().map(|(_, d)| d),
        )?;
        let items: Vec<InventoryItem> = decode_records(
            StoreName::Inventory,
            scan_store(&*kv, StoreName::Inventory)?.into_iter().map(|(_, d)| d),
        )?;
        let by_date = index_scan(&*kv, StoreName::Transactions, "date", None)?;
        let window = Self::transactions_between(&*kv, since, now)?;
        drop(kv);

        let active: Vec<&Flock> = flocks
            .iter()
            .filter(|f| f.status == FlockStatus::Active)
            .collect();
        let monthly = FinancialSummary::from_transactions(&window);

        let mut recent: Vec<Transaction> = decode_records(StoreName::Transactions, by_date)?;
        let keep = recent.len().saturating_sub(self.config.recent_activity_limit);
        recent.drain(..keep);
        recent.reverse();

        Ok(DashboardStats {
            active_flocks: active.len(),
            total_birds: active.iter().map(|f| u64::from(f.count)).sum(),
            low_stock_alerts: items.iter().filter(|i| i.is_low_stock()).count(),
            inventory_value: summaries::inventory_value(&items),
            monthly_income: monthly.total_income,
            monthly_expenses: monthly.total_expenses,
            monthly_profit: monthly.net_profit,
            recent_activity: recent,
        })
    }
}
