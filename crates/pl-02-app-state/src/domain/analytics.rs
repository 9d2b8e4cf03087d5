//! # Screen Analytics
//!
//! Pure derivations behind the screen payloads: KPIs, finance charts, report
//! rows and graded environment metrics. Inputs are records already read from
//! the store.

use chrono::{DateTime, Datelike, TimeZone, Utc};
use pl_01_persistence::domain::summaries::UNCATEGORIZED;
use pl_01_persistence::{DashboardStats, FinancialSummary};
use serde::Serialize;
use shared_schema::{
    parse_timestamp, Budget, EnvironmentReading, Flock, FlockStatus, Grade, InventoryItem,
    KpiTargets, QualityParameters, RecordKey, Transaction, TransactionKind,
};
use std::collections::BTreeMap;

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Midnight UTC on the first day of `now`'s month.
pub fn start_of_month(now: DateTime<Utc>) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(now.year(), now.month(), 1, 0, 0, 0)
        .single()
        .unwrap_or(now)
}

/// Midnight UTC on January 1st of `now`'s year.
pub fn start_of_year(now: DateTime<Utc>) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(now.year(), 1, 1, 0, 0, 0)
        .single()
        .unwrap_or(now)
}

// =============================================================================
// KPIs
// =============================================================================

/// Headline production figures, with the targets they are judged against.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Kpis {
    /// Losses over placements across active flocks, percent.
    pub mortality_rate: f64,
    /// Trailing-window expenses per live bird.
    pub production_cost_per_bird: f64,
    /// Trailing-window profit over income, percent.
    pub profitability: f64,
    pub targets: KpiTargets,
}

impl Kpis {
    pub fn compute(stats: &DashboardStats, flocks: &[Flock], targets: &KpiTargets) -> Self {
        let active = flocks.iter().filter(|f| f.status == FlockStatus::Active);
        let (losses, placed) = active.fold((0u64, 0u64), |(l, p), f| {
            (l + u64::from(f.losses()), p + u64::from(f.initial_count))
        });

        let mortality_rate = if placed == 0 {
            0.0
        } else {
            round1(losses as f64 / placed as f64 * 100.0)
        };
        let production_cost_per_bird = if stats.total_birds == 0 {
            0.0
        } else {
            round2(stats.monthly_expenses / stats.total_birds as f64)
        };
        let profitability = if stats.monthly_income == 0.0 {
            0.0
        } else {
            round1(stats.monthly_profit / stats.monthly_income * 100.0)
        };

        Self {
            mortality_rate,
            production_cost_per_bird,
            profitability,
            targets: targets.clone(),
        }
    }

    pub fn mortality_above_target(&self) -> bool {
        self.mortality_rate > self.targets.mortality_rate
    }
}

// =============================================================================
// Finance charts
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyTotals {
    /// `YYYY-MM`
    pub month: String,
    pub income: f64,
    pub expenses: f64,
    pub net: f64,
    /// Running sum of `net` up to and including this month.
    pub balance: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BudgetVsActual {
    pub budgeted_income: f64,
    pub actual_income: f64,
    pub budgeted_expenses: f64,
    pub actual_expenses: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FinanceCharts {
    /// One entry per month with activity, oldest first.
    pub income_vs_expenses: Vec<MonthlyTotals>,
    /// Expense amounts per category.
    pub expense_distribution: BTreeMap<String, f64>,
    pub budget_vs_actual: Option<BudgetVsActual>,
}

impl FinanceCharts {
    /// Charts over `transactions`; `month` is the current month's summary
    /// compared against `budget`.
    pub fn compute(
        transactions: &[Transaction],
        month: &FinancialSummary,
        budget: Option<&Budget>,
    ) -> Self {
        let mut months: BTreeMap<String, (f64, f64)> = BTreeMap::new();
        let mut expense_distribution = BTreeMap::new();

        for tx in transactions {
            let Some(at) = parse_timestamp(&tx.date) else {
                continue;
            };
            let slot = months.entry(at.format("%Y-%m").to_string()).or_default();
            match tx.kind {
                TransactionKind::Income => slot.0 += tx.amount,
                TransactionKind::Expense => {
                    slot.1 += tx.amount;
                    let category = tx.category.as_deref().unwrap_or(UNCATEGORIZED);
                    *expense_distribution
                        .entry(category.to_string())
                        .or_insert(0.0) += tx.amount;
                }
                _ => {}
            }
        }

        let mut balance = 0.0;
        let income_vs_expenses = months
            .into_iter()
            .map(|(month, (income, expenses))| {
                let net = income - expenses;
                balance += net;
                MonthlyTotals {
                    month,
                    income,
                    expenses,
                    net,
                    balance,
                }
            })
            .collect();

        Self {
            income_vs_expenses,
            expense_distribution,
            budget_vs_actual: budget.map(|b| BudgetVsActual {
                budgeted_income: b.income,
                actual_income: month.total_income,
                budgeted_expenses: b.expenses,
                actual_expenses: month.total_expenses,
            }),
        }
    }
}

// =============================================================================
// Reports
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FlockReport {
    pub id: RecordKey,
    pub breed: String,
    pub age_days: i64,
    pub count: u32,
    pub mortality_rate: f64,
    pub status: FlockStatus,
}

impl FlockReport {
    pub fn from_flock(flock: &Flock, now: DateTime<Utc>) -> Self {
        Self {
            id: flock.id.clone(),
            breed: flock.breed.clone(),
            age_days: flock.age_days(now).unwrap_or(0),
            count: flock.count,
            mortality_rate: round1(flock.mortality_rate()),
            status: flock.status,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryTotals {
    pub items: usize,
    pub quantity: f64,
    pub value: f64,
}

/// Stock value and counts grouped by item category.
pub fn inventory_by_category(items: &[InventoryItem]) -> BTreeMap<String, CategoryTotals> {
    let mut totals: BTreeMap<String, CategoryTotals> = BTreeMap::new();
    for item in items {
        let entry = totals.entry(item.category.clone()).or_default();
        entry.items += 1;
        entry.quantity += item.qty;
        entry.value += item.stock_value();
    }
    totals
}

/// Distinct values in first-seen order.
pub fn distinct<'a>(values: impl IntoIterator<Item = &'a str>) -> Vec<String> {
    let mut seen = Vec::<String>::new();
    for value in values {
        if !value.is_empty() && !seen.iter().any(|s| s == value) {
            seen.push(value.to_string());
        }
    }
    seen
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ReportTemplate {
    pub id: &'static str,
    pub name: &'static str,
    pub category: &'static str,
}

pub const REPORT_TEMPLATES: [ReportTemplate; 4] = [
    ReportTemplate {
        id: "flock-performance",
        name: "Flock performance",
        category: "flocks",
    },
    ReportTemplate {
        id: "financial-summary",
        name: "Financial summary",
        category: "finance",
    },
    ReportTemplate {
        id: "inventory-status",
        name: "Inventory status",
        category: "inventory",
    },
    ReportTemplate {
        id: "quality-control",
        name: "Quality control",
        category: "quality",
    },
];

// =============================================================================
// Environment metrics
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QualityMetric {
    pub parameter: &'static str,
    pub value: f64,
    pub unit: &'static str,
    pub grade: Grade,
    pub last_check: String,
}

/// Grade each measured value of `reading` against `standards`. Parameters the
/// reading does not carry are left out.
pub fn grade_reading(
    reading: &EnvironmentReading,
    standards: &QualityParameters,
) -> Vec<QualityMetric> {
    let measured = [
        ("temperature", "°C", reading.temperature.map(|v| (v, standards.temperature.grade(v)))),
        ("humidity", "%", reading.humidity.map(|v| (v, standards.humidity.grade(v)))),
        ("ammonia", "ppm", reading.ammonia.map(|v| (v, standards.ammonia.grade(v)))),
        ("co2", "ppm", reading.co2.map(|v| (v, standards.co2.grade(v)))),
    ];
    measured
        .into_iter()
        .filter_map(|(parameter, unit, graded)| {
            graded.map(|(value, grade)| QualityMetric {
                parameter,
                value,
                unit,
                grade,
                last_check: reading.timestamp.clone(),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flock(id: i64, count: u32, initial: u32, status: FlockStatus) -> Flock {
        Flock {
            id: RecordKey::Int(id),
            breed: "Cobb 500".into(),
            start_date: "2024-11-01".into(),
            count,
            initial_count: initial,
            status,
        }
    }

    fn tx(kind: TransactionKind, amount: f64, date: &str, category: Option<&str>) -> Transaction {
        serde_json::from_value(serde_json::json!({
            "id": 1,
            "type": kind.as_str(),
            "amount": amount,
            "date": date,
            "category": category,
        }))
        .unwrap()
    }

    #[test]
    fn test_kpis() {
        let stats = DashboardStats {
            total_birds: 950,
            monthly_income: 2000.0,
            monthly_expenses: 1500.0,
            monthly_profit: 500.0,
            ..Default::default()
        };
        let flocks = [
            flock(1, 950, 1000, FlockStatus::Active),
            flock(2, 0, 500, FlockStatus::Completed),
        ];
        let kpis = Kpis::compute(&stats, &flocks, &KpiTargets::default());
        assert_eq!(kpis.mortality_rate, 5.0);
        assert_eq!(kpis.production_cost_per_bird, 1.58);
        assert_eq!(kpis.profitability, 25.0);
        assert!(!kpis.mortality_above_target());
    }

    #[test]
    fn test_kpis_without_data() {
        let kpis = Kpis::compute(&DashboardStats::default(), &[], &KpiTargets::default());
        assert_eq!(kpis.mortality_rate, 0.0);
        assert_eq!(kpis.production_cost_per_bird, 0.0);
        assert_eq!(kpis.profitability, 0.0);
    }

    #[test]
    fn test_finance_charts() {
        let transactions = [
            tx(TransactionKind::Income, 300.0, "2024-11-03T00:00:00.000Z", None),
            tx(TransactionKind::Expense, 100.0, "2024-11-04T00:00:00.000Z", Some("feed")),
            tx(TransactionKind::Expense, 50.0, "2024-12-01T00:00:00.000Z", None),
            tx(TransactionKind::Inventory, 0.0, "2024-12-02T00:00:00.000Z", None),
        ];
        let month = FinancialSummary {
            total_expenses: 50.0,
            ..Default::default()
        };
        let budget = Budget {
            income: 1000.0,
            expenses: 400.0,
            updated_at: None,
        };

        let charts = FinanceCharts::compute(&transactions, &month, Some(&budget));
        assert_eq!(charts.income_vs_expenses.len(), 2);
        assert_eq!(charts.income_vs_expenses[0].month, "2024-11");
        assert_eq!(charts.income_vs_expenses[0].net, 200.0);
        assert_eq!(charts.income_vs_expenses[1].balance, 150.0);
        assert_eq!(charts.expense_distribution.get("feed"), Some(&100.0));
        assert_eq!(charts.expense_distribution.get("uncategorized"), Some(&50.0));
        let vs = charts.budget_vs_actual.unwrap();
        assert_eq!(vs.budgeted_expenses, 400.0);
        assert_eq!(vs.actual_expenses, 50.0);
    }

    #[test]
    fn test_period_starts() {
        let now = Utc.with_ymd_and_hms(2024, 12, 15, 13, 30, 0).unwrap();
        assert_eq!(start_of_month(now), Utc.with_ymd_and_hms(2024, 12, 1, 0, 0, 0).unwrap());
        assert_eq!(start_of_year(now), Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap());
    }

    #[test]
    fn test_flock_report_rounds_mortality() {
        let now = Utc.with_ymd_and_hms(2024, 11, 11, 0, 0, 0).unwrap();
        let report = FlockReport::from_flock(&flock(1, 2, 3, FlockStatus::Active), now);
        assert_eq!(report.mortality_rate, 33.3);
        assert_eq!(report.age_days, 10);
    }

    #[test]
    fn test_distinct_keeps_first_seen_order() {
        let values = distinct(["feed", "medicine", "feed", "", "supplies"]);
        assert_eq!(values, vec!["feed", "medicine", "supplies"]);
    }

    #[test]
    fn test_grade_reading() {
        let reading = EnvironmentReading {
            id: RecordKey::Int(1),
            timestamp: "2024-12-15T06:00:00.000Z".into(),
            sensor_id: "house-1".into(),
            temperature: Some(24.5),
            humidity: Some(75.0),
            ammonia: Some(18.0),
            co2: None,
        };
        let metrics = grade_reading(&reading, &QualityParameters::default());
        assert_eq!(metrics.len(), 3);
        assert_eq!(metrics[0].grade, Grade::Ok);
        assert_eq!(metrics[1].grade, Grade::OutOfRange);
        assert_eq!(metrics[2].grade, Grade::Warning);
        assert_eq!(metrics[2].unit, "ppm");
    }
}
