//! # Screen Payloads
//!
//! What `load_screen_data` hands to a renderer, one shape per screen.

use super::analytics::{
    CategoryTotals, FinanceCharts, FlockReport, Kpis, QualityMetric, ReportTemplate,
};
use pl_01_persistence::{ComplianceReport, DashboardStats, FinancialSummary, InventorySummary};
use serde::Serialize;
use shared_schema::{
    Budget, Document, Flock, InventoryItem, QualityCheck, QualityIssue, QualityParameters,
    Transaction,
};
use std::collections::BTreeMap;
use std::fmt;

/// Screens with a data loader. Every other route loads nothing.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Screen {
    Dashboard,
    Flocks,
    Inventory,
    Finance,
    Reports,
    Quality,
    Other(String),
}

impl Screen {
    pub fn from_route(route: &str) -> Self {
        match route {
            "dashboard" => Screen::Dashboard,
            "flocks" => Screen::Flocks,
            "inventory" => Screen::Inventory,
            "finance" => Screen::Finance,
            "reports" => Screen::Reports,
            "quality" => Screen::Quality,
            other => Screen::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Screen::Dashboard => "dashboard",
            Screen::Flocks => "flocks",
            Screen::Inventory => "inventory",
            Screen::Finance => "finance",
            Screen::Reports => "reports",
            Screen::Quality => "quality",
            Screen::Other(route) => route,
        }
    }
}

impl fmt::Display for Screen {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardData {
    pub stats: DashboardStats,
    /// First few low-stock items.
    pub alerts: Vec<InventoryItem>,
    /// Newest first.
    pub recent_activity: Vec<Transaction>,
    pub kpis: Kpis,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FlocksData {
    pub active: Vec<Flock>,
    pub completed: Vec<Flock>,
    pub total_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryData {
    pub items: Vec<InventoryItem>,
    pub categories: Vec<String>,
    pub suppliers: Vec<String>,
    pub summary: InventorySummary,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FinanceData {
    pub monthly_summary: FinancialSummary,
    pub yearly_summary: FinancialSummary,
    /// Newest first.
    pub recent_transactions: Vec<Transaction>,
    pub budget: Option<Budget>,
    pub charts: FinanceCharts,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FinancialReport {
    pub monthly: FinancialSummary,
    pub yearly: FinancialSummary,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryReport {
    pub summary: InventorySummary,
    pub low_stock: Vec<InventoryItem>,
    pub expiring: Vec<InventoryItem>,
    pub by_category: BTreeMap<String, CategoryTotals>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportsData {
    pub flock_reports: Vec<FlockReport>,
    pub financial_reports: FinancialReport,
    pub inventory_reports: InventoryReport,
    pub quality_report: ComplianceReport,
    pub available_reports: Vec<ReportTemplate>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QualityData {
    /// Latest environment reading, graded. Empty when nothing was recorded.
    pub metrics: Vec<QualityMetric>,
    pub compliance: ComplianceReport,
    /// Open issues.
    pub issues: Vec<QualityIssue>,
    /// Newest first.
    pub recent_checks: Vec<QualityCheck>,
    pub standards: QualityParameters,
}

/// Aggregated data for one screen.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ScreenData {
    Dashboard(Box<DashboardData>),
    Flocks(FlocksData),
    Inventory(InventoryData),
    Finance(Box<FinanceData>),
    Reports(Box<ReportsData>),
    Quality(QualityData),
    Empty,
}

impl ScreenData {
    pub fn is_empty(&self) -> bool {
        matches!(self, ScreenData::Empty)
    }

    /// The payload as a JSON object; `Empty` becomes `{}`.
    pub fn into_document(self) -> Result<Document, serde_json::Error> {
        if self.is_empty() {
            return Ok(Document::new());
        }
        match serde_json::to_value(self)? {
            serde_json::Value::Object(map) => Ok(map),
            _ => Ok(Document::new()),
        }
    }
}
