//! # Store Catalog
//!
//! The fixed set of named stores, their key paths and secondary indexes.
//!
//! | Store | Key path | Indexes |
//! |-------|----------|---------|
//! | flocks | id | status, breed, startDate |
//! | inventory | id | category, qty, lastUpdated |
//! | transactions | id | type, date, category, amount |
//! | health_records | id | flockId, date, type |
//! | environment_data | id | timestamp, sensorId |
//! | users | id | - |
//! | settings | key | - |
//! | quality_checks | id | date, result |
//! | quality_issues | id | date, status |
//! | notifications | id | read, date |
//!
//! Store names are persisted and must match exactly for compatibility.

use crate::errors::SchemaError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Database name recorded in the schema metadata.
pub const DB_NAME: &str = "PoultryERP";

/// Schema version. Version 4 declares the quality and notification stores
/// that earlier versions used without creating.
pub const SCHEMA_VERSION: u32 = 4;

/// A named collection of records of one entity kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StoreName {
    Flocks,
    Inventory,
    Transactions,
    HealthRecords,
    EnvironmentData,
    Users,
    Settings,
    QualityChecks,
    QualityIssues,
    Notifications,
}

impl StoreName {
    /// Every declared store, in creation order.
    pub const ALL: [StoreName; 10] = [
        StoreName::Flocks,
        StoreName::Inventory,
        StoreName::Transactions,
        StoreName::HealthRecords,
        StoreName::EnvironmentData,
        StoreName::Users,
        StoreName::Settings,
        StoreName::QualityChecks,
        StoreName::QualityIssues,
        StoreName::Notifications,
    ];

    /// Persisted store name.
    pub const fn as_str(&self) -> &'static str {
        match self {
            StoreName::Flocks => "flocks",
            StoreName::Inventory => "inventory",
            StoreName::Transactions => "transactions",
            StoreName::HealthRecords => "health_records",
            StoreName::EnvironmentData => "environment_data",
            StoreName::Users => "users",
            StoreName::Settings => "settings",
            StoreName::QualityChecks => "quality_checks",
            StoreName::QualityIssues => "quality_issues",
            StoreName::Notifications => "notifications",
        }
    }

    /// Field holding each record's primary key.
    pub const fn key_path(&self) -> &'static str {
        match self {
            StoreName::Settings => "key",
            _ => "id",
        }
    }

    /// Secondary indexes. Each index is named after the field it reads.
    pub const fn indexes(&self) -> &'static [&'static str] {
        match self {
            StoreName::Flocks => &["status", "breed", "startDate"],
            StoreName::Inventory => &["category", "qty", "lastUpdated"],
            StoreName::Transactions => &["type", "date", "category", "amount"],
            StoreName::HealthRecords => &["flockId", "date", "type"],
            StoreName::EnvironmentData => &["timestamp", "sensorId"],
            StoreName::Users | StoreName::Settings => &[],
            StoreName::QualityChecks => &["date", "result"],
            StoreName::QualityIssues => &["date", "status"],
            StoreName::Notifications => &["read", "date"],
        }
    }

    /// Whether `index` is declared on this store.
    pub fn has_index(&self, index: &str) -> bool {
        self.indexes().contains(&index)
    }
}

impl fmt::Display for StoreName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StoreName {
    type Err = SchemaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        StoreName::ALL
            .iter()
            .copied()
            .find(|store| store.as_str() == s)
            .ok_or_else(|| SchemaError::UnknownStore(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_names_round_trip() {
        for store in StoreName::ALL {
            assert_eq!(store.as_str().parse::<StoreName>().unwrap(), store);
        }
    }

    #[test]
    fn test_unknown_store_rejected() {
        let err = "quality".parse::<StoreName>().unwrap_err();
        assert_eq!(err, SchemaError::UnknownStore("quality".to_string()));
    }

    #[test]
    fn test_ad_hoc_collections_are_declared() {
        for name in ["quality_checks", "quality_issues", "notifications"] {
            assert!(name.parse::<StoreName>().is_ok(), "{name} must be declared");
        }
    }

    #[test]
    fn test_settings_keyed_by_key() {
        assert_eq!(StoreName::Settings.key_path(), "key");
        assert_eq!(StoreName::Inventory.key_path(), "id");
        assert!(StoreName::Transactions.has_index("date"));
        assert!(!StoreName::Users.has_index("role"));
    }
}
