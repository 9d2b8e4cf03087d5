//! # Entity Records
//!
//! Typed views of the documents kept in each store. Field names follow the
//! persisted camelCase layout. Decoding is lenient: optional fields default,
//! so records written by older forms still load.
//!
//! ## Clusters
//!
//! - **Production**: `Flock`, `HealthRecord`, `EnvironmentReading`
//! - **Stock & Money**: `InventoryItem`, `Transaction`, `Budget`
//! - **Quality**: `QualityCheck`, `QualityIssue`
//! - **Session**: `User`, `Notification`

use crate::keys::RecordKey;
use crate::Document;
use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Parse an ISO-8601 timestamp or a bare `YYYY-MM-DD` date (midnight UTC).
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(Utc.from_utc_datetime(&naive));
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| Utc.from_utc_datetime(&naive))
}

/// Render a timestamp the way every stored `date` field is written.
pub fn format_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(chrono::SecondsFormat::Millis, true)
}

// =============================================================================
// CLUSTER A: PRODUCTION
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlockStatus {
    #[default]
    Active,
    Completed,
}

impl FlockStatus {
    pub const fn as_str(&self) -> &'static str {
        match self {
            FlockStatus::Active => "active",
            FlockStatus::Completed => "completed",
        }
    }
}

/// A batch of birds raised together.
///
/// Invariant: `count <= initial_count`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Flock {
    pub id: RecordKey,
    #[serde(default)]
    pub breed: String,
    #[serde(default)]
    pub start_date: String,
    #[serde(default, deserialize_with = "whole_count")]
    pub count: u32,
    #[serde(default, deserialize_with = "whole_count")]
    pub initial_count: u32,
    #[serde(default)]
    pub status: FlockStatus,
}

/// Bird counts written from form input or float arithmetic arrive as
/// `1500.0`. Any whole, non-negative number that fits is accepted.
fn whole_count<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = f64::deserialize(deserializer)?;
    if value.fract() == 0.0 && (0.0..=f64::from(u32::MAX)).contains(&value) {
        Ok(value as u32)
    } else {
        Err(serde::de::Error::custom(format!(
            "expected a whole bird count, got {}",
            value
        )))
    }
}

impl Flock {
    /// Birds lost since placement.
    pub fn losses(&self) -> u32 {
        self.initial_count.saturating_sub(self.count)
    }

    /// Losses as a percentage of the initial placement.
    pub fn mortality_rate(&self) -> f64 {
        if self.initial_count == 0 {
            return 0.0;
        }
        self.losses() as f64 / self.initial_count as f64 * 100.0
    }

    /// Whole days since `start_date`, or `None` if the date does not parse.
    pub fn age_days(&self, now: DateTime<Utc>) -> Option<i64> {
        parse_timestamp(&self.start_date).map(|start| (now - start).num_days().max(0))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthRecord {
    pub id: RecordKey,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flock_id: Option<RecordKey>,
    #[serde(default)]
    pub date: String,
    #[serde(default, rename = "type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// A sensor sample from a house.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnvironmentReading {
    pub id: RecordKey,
    #[serde(default)]
    pub timestamp: String,
    #[serde(default)]
    pub sensor_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub humidity: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ammonia: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub co2: Option<f64>,
}

// =============================================================================
// CLUSTER B: STOCK & MONEY
// =============================================================================

/// A stocked item. Invariant: `qty >= 0`; low stock when `qty <= min_stock`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryItem {
    pub id: RecordKey,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub sku: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub qty: f64,
    #[serde(default)]
    pub unit: String,
    #[serde(default)]
    pub min_stock: f64,
    #[serde(default)]
    pub max_stock: f64,
    #[serde(default)]
    pub price: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub supplier: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub batch_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiry_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<String>,
}

impl InventoryItem {
    pub fn is_low_stock(&self) -> bool {
        self.qty <= self.min_stock
    }

    pub fn stock_value(&self) -> f64 {
        self.qty * self.price
    }

    pub fn expiry(&self) -> Option<DateTime<Utc>> {
        self.expiry_date.as_deref().and_then(parse_timestamp)
    }
}

/// Transaction type. The set is open: unknown types round-trip as `Other`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum TransactionKind {
    Income,
    Expense,
    Inventory,
    Purchase,
    Sale,
    FeedConsumption,
    Other(String),
}

impl TransactionKind {
    pub fn as_str(&self) -> &str {
        match self {
            TransactionKind::Income => "income",
            TransactionKind::Expense => "expense",
            TransactionKind::Inventory => "inventory",
            TransactionKind::Purchase => "purchase",
            TransactionKind::Sale => "sale",
            TransactionKind::FeedConsumption => "feed_consumption",
            TransactionKind::Other(s) => s,
        }
    }
}

impl From<String> for TransactionKind {
    fn from(value: String) -> Self {
        match value.as_str() {
            "income" => TransactionKind::Income,
            "expense" => TransactionKind::Expense,
            "inventory" => TransactionKind::Inventory,
            "purchase" => TransactionKind::Purchase,
            "sale" => TransactionKind::Sale,
            "feed_consumption" => TransactionKind::FeedConsumption,
            _ => TransactionKind::Other(value),
        }
    }
}

impl From<TransactionKind> for String {
    fn from(value: TransactionKind) -> Self {
        value.as_str().to_string()
    }
}

impl fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Financial entry or inventory movement; both live in `transactions`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: RecordKey,
    #[serde(rename = "type")]
    pub kind: TransactionKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subtype: Option<String>,
    #[serde(default)]
    pub amount: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quantity: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub date: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub item_id: Option<RecordKey>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub item_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub change: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous_qty: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new_qty: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flock_id: Option<RecordKey>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
}

/// Caller-supplied fields of a new financial transaction. The store stamps
/// `id`, `date` and `createdAt`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionDraft {
    #[serde(rename = "type")]
    pub kind: TransactionKind,
    #[serde(default)]
    pub amount: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub item_id: Option<RecordKey>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quantity: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flock_id: Option<RecordKey>,
    /// Any further form fields, persisted as given.
    #[serde(flatten)]
    pub extra: Document,
}

impl TransactionDraft {
    pub fn new(kind: TransactionKind, amount: f64) -> Self {
        Self {
            kind,
            amount,
            category: None,
            description: None,
            item_id: None,
            quantity: None,
            flock_id: None,
            extra: Document::new(),
        }
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Link the transaction to an inventory movement of `quantity` units.
    pub fn with_item(mut self, item_id: impl Into<RecordKey>, quantity: f64) -> Self {
        self.item_id = Some(item_id.into());
        self.quantity = Some(quantity);
        self
    }

    pub fn with_flock(mut self, flock_id: impl Into<RecordKey>) -> Self {
        self.flock_id = Some(flock_id.into());
        self
    }

    /// Signed stock change implied by this transaction: purchases add,
    /// every other linked type removes.
    pub fn stock_delta(&self) -> Option<f64> {
        let quantity = self.quantity.unwrap_or(0.0);
        self.item_id.as_ref().map(|_| match self.kind {
            TransactionKind::Purchase => quantity,
            _ => -quantity,
        })
    }
}

/// Monthly budget, stored as the `budget` settings entry.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Budget {
    #[serde(default)]
    pub income: f64,
    #[serde(default)]
    pub expenses: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

// =============================================================================
// CLUSTER C: QUALITY
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckResult {
    Pass,
    Fail,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QualityCheck {
    pub id: RecordKey,
    #[serde(default, rename = "type")]
    pub kind: String,
    /// Free-form measured value (number or text, as entered).
    #[serde(default)]
    pub value: Value,
    pub result: CheckResult,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub date: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inspector: Option<String>,
}

/// Caller-supplied fields of a new quality check.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QualityCheckDraft {
    #[serde(rename = "type")]
    pub kind: String,
    pub value: Value,
    pub result: CheckResult,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inspector: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Low,
    #[default]
    Medium,
    High,
    Critical,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueStatus {
    #[default]
    Open,
    Resolved,
}

impl IssueStatus {
    pub const fn as_str(&self) -> &'static str {
        match self {
            IssueStatus::Open => "open",
            IssueStatus::Resolved => "resolved",
        }
    }
}

/// A quality problem. Failed checks open one automatically.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QualityIssue {
    pub id: RecordKey,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub severity: Severity,
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub status: IssueStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolved_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub check_id: Option<RecordKey>,
}

// =============================================================================
// CLUSTER D: SESSION
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: RecordKey,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub permissions: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_login: Option<String>,
}

impl User {
    /// `*` grants everything.
    pub fn can(&self, permission: &str) -> bool {
        self.permissions.iter().any(|p| p == "*" || p == permission)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: RecordKey,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<String>,
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub read: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{from_document, to_document};
    use serde_json::json;

    #[test]
    fn test_parse_timestamp_formats() {
        let full = parse_timestamp("2024-03-01T10:00:00.000Z").unwrap();
        let bare = parse_timestamp("2024-03-01").unwrap();
        assert_eq!((full - bare).num_hours(), 10);
        assert!(parse_timestamp("yesterday").is_none());
    }

    #[test]
    fn test_transaction_kind_open_set() {
        let kind: TransactionKind = serde_json::from_value(json!("feed_consumption")).unwrap();
        assert_eq!(kind, TransactionKind::FeedConsumption);

        let other: TransactionKind = serde_json::from_value(json!("vaccination")).unwrap();
        assert_eq!(other, TransactionKind::Other("vaccination".into()));
        assert_eq!(serde_json::to_value(&other).unwrap(), json!("vaccination"));
    }

    #[test]
    fn test_inventory_item_lenient_decode() {
        let doc = json!({"id": 1, "name": "Starter feed", "qty": 2000, "minStock": 500})
            .as_object()
            .cloned()
            .unwrap();
        let item: InventoryItem = from_document(&doc).unwrap();
        assert_eq!(item.price, 0.0);
        assert!(!item.is_low_stock());
        assert_eq!(item.stock_value(), 0.0);
    }

    #[test]
    fn test_draft_stock_delta() {
        let purchase = TransactionDraft::new(TransactionKind::Purchase, 25.0).with_item(7, 10.0);
        assert_eq!(purchase.stock_delta(), Some(10.0));

        let sale = TransactionDraft::new(TransactionKind::Sale, 25.0).with_item(7, 4.0);
        assert_eq!(sale.stock_delta(), Some(-4.0));

        let plain = TransactionDraft::new(TransactionKind::Income, 100.0);
        assert_eq!(plain.stock_delta(), None);
    }

    #[test]
    fn test_draft_extra_fields_flatten() {
        let mut draft = TransactionDraft::new(TransactionKind::Expense, 40.0);
        draft.extra.insert("notes".into(), json!("vet visit"));
        let doc = to_document(&draft).unwrap();
        assert_eq!(doc.get("type"), Some(&json!("expense")));
        assert_eq!(doc.get("notes"), Some(&json!("vet visit")));
        assert!(!doc.contains_key("itemId"));
    }

    #[test]
    fn test_flock_mortality() {
        let flock = Flock {
            id: RecordKey::Int(1),
            breed: "Ross 308".into(),
            start_date: "2024-01-01".into(),
            count: 950,
            initial_count: 1000,
            status: FlockStatus::Active,
        };
        assert_eq!(flock.losses(), 50);
        assert!((flock.mortality_rate() - 5.0).abs() < f64::EPSILON);
        let now = parse_timestamp("2024-01-11T12:00:00Z").unwrap();
        assert_eq!(flock.age_days(now), Some(10));
    }

    #[test]
    fn test_flock_counts_accept_whole_floats() {
        let doc = json!({
            "id": 1.0,
            "count": 1500.0,
            "initialCount": 1500,
            "status": "active"
        })
        .as_object()
        .cloned()
        .unwrap();
        let flock: Flock = from_document(&doc).unwrap();
        assert_eq!(flock.id, RecordKey::Int(1));
        assert_eq!(flock.count, 1500);
        assert_eq!(flock.initial_count, 1500);

        let mut fractional = doc.clone();
        fractional.insert("count".into(), json!(1499.5));
        assert!(from_document::<Flock>(&fractional).is_err());

        let mut negative = doc;
        negative.insert("count".into(), json!(-3));
        assert!(from_document::<Flock>(&negative).is_err());
    }

    #[test]
    fn test_user_wildcard_permission() {
        let user = User {
            id: RecordKey::from("admin"),
            name: "Administrator".into(),
            role: "admin".into(),
            permissions: vec!["*".into()],
            last_login: None,
        };
        assert!(user.can("finance.write"));
    }
}
