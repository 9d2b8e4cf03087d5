//! # Aggregates
//!
//! Derived figures computed over decoded records. Everything here is pure;
//! the service feeds it with records read under one lock.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use shared_schema::{CheckResult, Document, Flock, InventoryItem, Transaction, TransactionKind};
use std::collections::BTreeMap;

/// Export of every declared store, keyed by store name.
pub type Snapshot = BTreeMap<String, Vec<Document>>;

/// Category used for transactions that carry none.
pub const UNCATEGORIZED: &str = "uncategorized";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinancialSummary {
    pub total_income: f64,
    pub total_expenses: f64,
    pub net_profit: f64,
    /// Sum of amounts per category, over every money-bearing transaction.
    pub by_category: BTreeMap<String, f64>,
}

impl FinancialSummary {
    /// Totals over `transactions`. Inventory audit records carry no amount
    /// and are skipped.
    pub fn from_transactions<'a>(transactions: impl IntoIterator<Item = &'a Transaction>) -> Self {
        let mut summary = Self::default();
        for tx in transactions {
            match tx.kind {
                TransactionKind::Income => summary.total_income += tx.amount,
                TransactionKind::Expense => summary.total_expenses += tx.amount,
                TransactionKind::Inventory => continue,
                _ => {}
            }
            let category = tx.category.as_deref().unwrap_or(UNCATEGORIZED);
            *summary.by_category.entry(category.to_string()).or_insert(0.0) += tx.amount;
        }
        summary.net_profit = summary.total_income - summary.total_expenses;
        summary
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InventorySummary {
    pub total_items: usize,
    pub total_value: f64,
    pub low_stock: usize,
    /// Items expiring within the horizon, already-expired ones included.
    pub expiring_soon: usize,
}

impl InventorySummary {
    pub fn compute(items: &[InventoryItem], now: DateTime<Utc>, horizon_days: i64) -> Self {
        let horizon = now + Duration::days(horizon_days);
        Self {
            total_items: items.len(),
            total_value: inventory_value(items),
            low_stock: items.iter().filter(|i| i.is_low_stock()).count(),
            expiring_soon: items
                .iter()
                .filter(|i| i.expiry().is_some_and(|at| at <= horizon))
                .count(),
        }
    }
}

/// Σ qty × price; a missing price counts as zero.
pub fn inventory_value(items: &[InventoryItem]) -> f64 {
    items.iter().map(InventoryItem::stock_value).sum()
}

/// Items whose expiry falls in `[now, now + days]`.
pub fn expiring_within(
    items: Vec<InventoryItem>,
    now: DateTime<Utc>,
    days: i64,
) -> Vec<InventoryItem> {
    let horizon = now + Duration::days(days);
    items
        .into_iter()
        .filter(|item| item.expiry().is_some_and(|at| at >= now && at <= horizon))
        .collect()
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub active_flocks: usize,
    pub total_birds: u64,
    pub low_stock_alerts: usize,
    pub inventory_value: f64,
    pub monthly_income: f64,
    pub monthly_expenses: f64,
    pub monthly_profit: f64,
    /// Most recent transactions, newest first.
    pub recent_activity: Vec<Transaction>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlockPerformance {
    pub flock: Flock,
    pub age_days: i64,
    pub losses: u32,
    pub mortality_rate: f64,
    /// Feed consumed, summed over `feed_consumption` transactions.
    pub total_feed: f64,
    pub average_daily_feed: f64,
    /// `total_feed` priced at the configured estimate.
    pub feed_cost: f64,
}

impl FlockPerformance {
    pub fn compute(
        flock: Flock,
        feed: &[Transaction],
        now: DateTime<Utc>,
        feed_price: f64,
    ) -> Self {
        let total_feed: f64 = feed.iter().map(|t| t.amount).sum();
        let age_days = flock.age_days(now).unwrap_or(0);
        Self {
            age_days,
            losses: flock.losses(),
            mortality_rate: flock.mortality_rate(),
            total_feed,
            average_daily_feed: total_feed / age_days.max(1) as f64,
            feed_cost: total_feed * feed_price,
            flock,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComplianceReport {
    pub total_checks: usize,
    pub passed: usize,
    pub failed: usize,
    /// Percent passed, one decimal; zero when nothing was checked.
    pub compliance_rate: f64,
}

impl ComplianceReport {
    pub fn from_results(results: impl IntoIterator<Item = CheckResult>) -> Self {
        let (mut total, mut passed) = (0usize, 0usize);
        for result in results {
            total += 1;
            if result == CheckResult::Pass {
                passed += 1;
            }
        }
        let compliance_rate = if total == 0 {
            0.0
        } else {
            (passed as f64 / total as f64 * 1000.0).round() / 10.0
        };
        Self {
            total_checks: total,
            passed,
            failed: total - passed,
            compliance_rate,
        }
    }
}
