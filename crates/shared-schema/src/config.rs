//! # Application Configuration
//!
//! Static thresholds and targets the aggregate screens grade against. The
//! defaults below are the farm's standard operating values; user preferences
//! are layered over them at startup (see [`AppConfig::settings_with`]).

use crate::Document;
use serde::{Deserialize, Serialize};

/// Top-level application configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppConfig {
    pub app: AppInfo,
    pub inventory: InventoryConfig,
    pub finance: FinanceConfig,
    pub quality: QualityParameters,
    pub kpi: KpiTargets,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            app: AppInfo::default(),
            inventory: InventoryConfig::default(),
            finance: FinanceConfig::default(),
            quality: QualityParameters::default(),
            kpi: KpiTargets::default(),
        }
    }
}

impl AppConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_inventory(mut self, inventory: InventoryConfig) -> Self {
        self.inventory = inventory;
        self
    }

    pub fn with_quality(mut self, quality: QualityParameters) -> Self {
        self.quality = quality;
        self
    }

    pub fn with_kpi(mut self, kpi: KpiTargets) -> Self {
        self.kpi = kpi;
        self
    }

    /// Effective settings document: this configuration with `preferences`
    /// shallow-merged over it. Preference keys win.
    pub fn settings_with(&self, preferences: &Document) -> Document {
        let mut settings = match serde_json::to_value(self) {
            Ok(serde_json::Value::Object(map)) => map,
            _ => Document::new(),
        };
        for (key, value) in preferences {
            settings.insert(key.clone(), value.clone());
        }
        settings
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppInfo {
    pub name: String,
    pub version: String,
    pub currency: String,
    pub language: String,
    pub supported_languages: Vec<String>,
}

impl Default for AppInfo {
    fn default() -> Self {
        Self {
            name: "Poultry Ledger".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            currency: "SAR".to_string(),
            language: "ar".to_string(),
            supported_languages: vec!["ar".to_string(), "en".to_string()],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryConfig {
    /// Fraction of `minStock` below which stock is critical.
    pub low_stock_threshold: f64,
    /// Reorder when stock drops under `minStock * reorder_point_multiplier`.
    pub reorder_point_multiplier: f64,
    /// Horizon, in days, for the "expiring soon" figures.
    pub expiry_warning_days: i64,
    pub default_categories: Vec<String>,
}

impl Default for InventoryConfig {
    fn default() -> Self {
        Self {
            low_stock_threshold: 0.2,
            reorder_point_multiplier: 1.5,
            expiry_warning_days: 30,
            default_categories: ["feed", "medicine", "disinfectant", "supplies", "equipment"]
                .into_iter()
                .map(String::from)
                .collect(),
        }
    }
}

impl InventoryConfig {
    pub fn reorder_point(&self, min_stock: f64) -> f64 {
        min_stock * self.reorder_point_multiplier
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinanceConfig {
    pub vat_rate: f64,
    pub expense_categories: Vec<String>,
    pub revenue_categories: Vec<String>,
}

impl Default for FinanceConfig {
    fn default() -> Self {
        Self {
            vat_rate: 0.15,
            expense_categories: [
                "feed",
                "birds",
                "medicine",
                "labor",
                "utilities",
                "maintenance",
                "transport",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
            revenue_categories: ["bird_sales", "manure_sales", "services", "subsidies"]
                .into_iter()
                .map(String::from)
                .collect(),
        }
    }
}

/// Acceptable band for a measured parameter.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Band {
    pub min: f64,
    pub max: f64,
    pub optimal: f64,
}

/// Upper limit with an early-warning level, for gases measured in ppm.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ceiling {
    pub max: f64,
    pub warning: f64,
}

/// Grade of a single reading against its band or ceiling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Grade {
    Ok,
    Warning,
    OutOfRange,
}

impl Band {
    pub fn grade(&self, value: f64) -> Grade {
        if value < self.min || value > self.max {
            Grade::OutOfRange
        } else {
            Grade::Ok
        }
    }
}

impl Ceiling {
    pub fn grade(&self, value: f64) -> Grade {
        if value > self.max {
            Grade::OutOfRange
        } else if value > self.warning {
            Grade::Warning
        } else {
            Grade::Ok
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QualityParameters {
    /// Degrees Celsius.
    pub temperature: Band,
    /// Relative humidity, percent.
    pub humidity: Band,
    pub ammonia: Ceiling,
    pub co2: Ceiling,
}

impl Default for QualityParameters {
    fn default() -> Self {
        Self {
            temperature: Band {
                min: 20.0,
                max: 26.0,
                optimal: 23.0,
            },
            humidity: Band {
                min: 50.0,
                max: 70.0,
                optimal: 60.0,
            },
            ammonia: Ceiling {
                max: 25.0,
                warning: 15.0,
            },
            co2: Ceiling {
                max: 3000.0,
                warning: 2000.0,
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KpiTargets {
    /// Percent of initial placement.
    pub mortality_rate: f64,
    /// Feed conversion ratio.
    pub fcr: f64,
    /// Final bird weight, kg.
    pub epew: f64,
    pub production_cost_per_kg: f64,
}

impl Default for KpiTargets {
    fn default() -> Self {
        Self {
            mortality_rate: 5.0,
            fcr: 1.6,
            epew: 2.2,
            production_cost_per_kg: 12.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.inventory.low_stock_threshold, 0.2);
        assert_eq!(config.finance.vat_rate, 0.15);
        assert_eq!(config.quality.temperature.optimal, 23.0);
        assert_eq!(config.kpi.fcr, 1.6);
        assert_eq!(config.inventory.reorder_point(400.0), 600.0);
    }

    #[test]
    fn test_preferences_override_settings() {
        let mut prefs = Document::new();
        prefs.insert("theme".into(), json!("light"));
        prefs.insert("kpi".into(), json!({"fcr": 1.5}));

        let settings = AppConfig::default().settings_with(&prefs);
        assert_eq!(settings.get("theme"), Some(&json!("light")));
        // Shallow merge: the whole `kpi` entry is replaced.
        assert_eq!(settings.get("kpi"), Some(&json!({"fcr": 1.5})));
        assert!(settings.contains_key("quality"));
    }

    #[test]
    fn test_grades() {
        let params = QualityParameters::default();
        assert_eq!(params.temperature.grade(23.0), Grade::Ok);
        assert_eq!(params.temperature.grade(27.5), Grade::OutOfRange);
        assert_eq!(params.ammonia.grade(18.0), Grade::Warning);
        assert_eq!(params.co2.grade(3100.0), Grade::OutOfRange);
    }
}
