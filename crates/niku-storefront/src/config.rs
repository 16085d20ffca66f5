//! # Storefront Configuration
//!
//! Store identity, pricing policy, catalog location and log filter.
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     NIKU_TAX_RATE_BPS=600                                              │
//! │     NIKU_CATALOG_PATH=/srv/niku/products.json                          │
//! │                                                                         │
//! │  2. TOML Config File                                                   │
//! │     ~/.config/niku-storefront/storefront.toml (Linux)                  │
//! │     ~/Library/Application Support/com.niku.storefront/... (macOS)      │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! │     RM10.00 flat shipping, 6% tax, products.json                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! # storefront.toml
//! [store]
//! name = "Niku"
//! currency_symbol = "RM"
//!
//! [pricing]
//! flat_shipping_cents = 1000
//! tax_rate_bps = 600
//!
//! [catalog]
//! path = "products.json"
//!
//! [logging]
//! filter = "info,niku=debug"
//! ```

use std::path::PathBuf;

use niku_core::{Money, PricingPolicy, Rate};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::{StorefrontError, StorefrontResult};

/// Largest accepted tax rate (100%).
const MAX_TAX_RATE_BPS: u32 = 10_000;

// =============================================================================
// Store Settings
// =============================================================================

/// Store identity shown in the page chrome.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreSettings {
    #[serde(default = "default_store_name")]
    pub name: String,

    /// Prefixed to every displayed amount.
    #[serde(default = "default_currency_symbol")]
    pub currency_symbol: String,
}

fn default_store_name() -> String {
    "Niku".to_string()
}

fn default_currency_symbol() -> String {
    niku_core::CURRENCY_SYMBOL.to_string()
}

impl Default for StoreSettings {
    fn default() -> Self {
        StoreSettings {
            name: default_store_name(),
            currency_symbol: default_currency_symbol(),
        }
    }
}

// =============================================================================
// Pricing Settings
// =============================================================================

/// Shipping fee and tax rate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricingSettings {
    /// Flat shipping per order, in sen.
    #[serde(default = "default_flat_shipping")]
    pub flat_shipping_cents: i64,

    /// Sales tax in basis points (600 = 6%).
    #[serde(default = "default_tax_rate")]
    pub tax_rate_bps: u32,
}

fn default_flat_shipping() -> i64 {
    niku_core::FLAT_SHIPPING_CENTS
}

fn default_tax_rate() -> u32 {
    niku_core::TAX_RATE_BPS
}

impl Default for PricingSettings {
    fn default() -> Self {
        PricingSettings {
            flat_shipping_cents: default_flat_shipping(),
            tax_rate_bps: default_tax_rate(),
        }
    }
}

// =============================================================================
// Catalog & Logging Settings
// =============================================================================

/// Where the product catalog lives.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogSettings {
    #[serde(default = "default_catalog_path")]
    pub path: PathBuf,
}

fn default_catalog_path() -> PathBuf {
    PathBuf::from("products.json")
}

impl Default for CatalogSettings {
    fn default() -> Self {
        CatalogSettings {
            path: default_catalog_path(),
        }
    }
}

/// Log filter used when `RUST_LOG` is not set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingSettings {
    #[serde(default = "default_log_filter")]
    pub filter: String,
}

fn default_log_filter() -> String {
    crate::DEFAULT_LOG_FILTER.to_string()
}

impl Default for LoggingSettings {
    fn default() -> Self {
        LoggingSettings {
            filter: default_log_filter(),
        }
    }
}

// =============================================================================
// Main Storefront Configuration
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorefrontConfig {
    #[serde(default)]
    pub store: StoreSettings,

    #[serde(default)]
    pub pricing: PricingSettings,

    #[serde(default)]
    pub catalog: CatalogSettings,

    #[serde(default)]
    pub logging: LoggingSettings,
}

impl StorefrontConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from file, environment, and defaults.
    ///
    /// ## Load Order (later overrides earlier)
    /// 1. Default values
    /// 2. Config file (storefront.toml)
    /// 3. Environment variables
    pub fn load(config_path: Option<PathBuf>) -> StorefrontResult<Self> {
        let mut config = Self::default();

        if let Some(path) = config_path.or_else(Self::default_config_path) {
            if path.exists() {
                info!(?path, "Loading storefront config from file");
                let contents = std::fs::read_to_string(&path)?;
                config = toml::from_str(&contents)?;
            } else {
                debug!(?path, "Config file not found, using defaults");
            }
        }

        config.apply_env_overrides();
        config.validate()?;

        Ok(config)
    }

    /// Loads config or returns default if load fails.
    pub fn load_or_default(config_path: Option<PathBuf>) -> Self {
        Self::load(config_path).unwrap_or_else(|e| {
            warn!("Failed to load storefront config: {}. Using defaults.", e);
            Self::default()
        })
    }

    /// Saves configuration to file.
    pub fn save(&self, config_path: Option<PathBuf>) -> StorefrontResult<()> {
        let path = config_path
            .or_else(Self::default_config_path)
            .ok_or_else(|| StorefrontError::ConfigSaveFailed("No config path available".into()))?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| StorefrontError::ConfigSaveFailed(e.to_string()))?;
        }

        let contents = toml::to_string_pretty(self)?;
        std::fs::write(&path, contents)
            .map_err(|e| StorefrontError::ConfigSaveFailed(e.to_string()))?;

        info!(?path, "Storefront config saved");
        Ok(())
    }

    /// Validates the configuration.
    pub fn validate(&self) -> StorefrontResult<()> {
        if self.store.currency_symbol.trim().is_empty() {
            return Err(StorefrontError::InvalidConfig(
                "currency_symbol must not be empty".into(),
            ));
        }

        if self.pricing.flat_shipping_cents < 0 {
            return Err(StorefrontError::InvalidConfig(format!(
                "flat_shipping_cents must not be negative, got {}",
                self.pricing.flat_shipping_cents
            )));
        }

        if self.pricing.tax_rate_bps > MAX_TAX_RATE_BPS {
            return Err(StorefrontError::InvalidConfig(format!(
                "tax_rate_bps must be at most {}, got {}",
                MAX_TAX_RATE_BPS, self.pricing.tax_rate_bps
            )));
        }

        if self.catalog.path.as_os_str().is_empty() {
            return Err(StorefrontError::InvalidConfig(
                "catalog path must not be empty".into(),
            ));
        }

        Ok(())
    }

    /// Applies environment variable overrides.
    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|name| std::env::var(name).ok());
    }

    /// Applies overrides from a variable lookup (the environment in
    /// production, a map in tests).
    fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(name) = lookup("NIKU_STORE_NAME") {
            self.store.name = name;
        }

        if let Some(shipping) = lookup("NIKU_FLAT_SHIPPING_CENTS") {
            match shipping.parse::<i64>() {
                Ok(cents) => {
                    debug!(cents, "Overriding flat shipping from environment");
                    self.pricing.flat_shipping_cents = cents;
                }
                Err(_) => warn!(value = %shipping, "Ignoring invalid NIKU_FLAT_SHIPPING_CENTS"),
            }
        }

        if let Some(rate) = lookup("NIKU_TAX_RATE_BPS") {
            match rate.parse::<u32>() {
                Ok(bps) => {
                    debug!(bps, "Overriding tax rate from environment");
                    self.pricing.tax_rate_bps = bps;
                }
                Err(_) => warn!(value = %rate, "Ignoring invalid NIKU_TAX_RATE_BPS"),
            }
        }

        if let Some(path) = lookup("NIKU_CATALOG_PATH") {
            debug!(path = %path, "Overriding catalog path from environment");
            self.catalog.path = PathBuf::from(path);
        }

        if let Some(filter) = lookup("NIKU_LOG") {
            self.logging.filter = filter;
        }
    }

    /// Returns the default config file path.
    fn default_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "niku", "storefront")
            .map(|dirs| dirs.config_dir().join("storefront.toml"))
    }

    // =========================================================================
    // Convenience Methods
    // =========================================================================

    /// Pricing policy for the totals calculator.
    pub fn pricing_policy(&self) -> PricingPolicy {
        PricingPolicy {
            flat_shipping: Money::from_cents(self.pricing.flat_shipping_cents),
            tax_rate: Rate::from_bps(self.pricing.tax_rate_bps),
        }
    }

    /// Formats an amount with the configured currency symbol.
    pub fn format_money(&self, amount: Money) -> String {
        amount.format_with(&self.store.currency_symbol)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    #[test]
    fn test_default_config() {
        let config = StorefrontConfig::default();
        assert_eq!(config.store.currency_symbol, "RM");
        assert_eq!(config.catalog.path, PathBuf::from("products.json"));
        assert_eq!(config.pricing_policy(), PricingPolicy::default());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_from_toml() {
        let toml_str = r#"
            [store]
            name = "Niku Outlet"

            [pricing]
            tax_rate_bps = 800
        "#;

        let config: StorefrontConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.store.name, "Niku Outlet");
        assert_eq!(config.store.currency_symbol, "RM");
        assert_eq!(config.pricing.tax_rate_bps, 800);
        assert_eq!(config.pricing.flat_shipping_cents, 1000);
        assert_eq!(config.logging.filter, crate::DEFAULT_LOG_FILTER);
    }

    #[test]
    fn test_config_validation() {
        let mut config = StorefrontConfig::default();
        config.pricing.tax_rate_bps = 10_001;
        assert!(config.validate().is_err());

        let mut config = StorefrontConfig::default();
        config.pricing.flat_shipping_cents = -1;
        assert!(config.validate().is_err());

        let mut config = StorefrontConfig::default();
        config.store.currency_symbol = " ".into();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_overrides() {
        let vars: HashMap<&str, &str> = [
            ("NIKU_TAX_RATE_BPS", "800"),
            ("NIKU_FLAT_SHIPPING_CENTS", "not-a-number"),
            ("NIKU_CATALOG_PATH", "/srv/niku/products.json"),
        ]
        .into_iter()
        .collect();

        let mut config = StorefrontConfig::default();
        config.apply_overrides(|name| vars.get(name).map(|v| v.to_string()));

        assert_eq!(config.pricing.tax_rate_bps, 800);
        assert_eq!(config.pricing.flat_shipping_cents, 1000);
        assert_eq!(config.catalog.path, PathBuf::from("/srv/niku/products.json"));
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let path = std::env::temp_dir()
            .join(format!("niku-config-{}", uuid::Uuid::new_v4()))
            .join("storefront.toml");

        let mut config = StorefrontConfig::default();
        config.store.name = "Niku Test".into();
        config.save(Some(path.clone())).unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        let loaded: StorefrontConfig = toml::from_str(&contents).unwrap();
        assert_eq!(loaded, config);

        let _ = std::fs::remove_dir_all(path.parent().unwrap());
    }

    #[test]
    fn test_load_or_default_falls_back() {
        let path = std::env::temp_dir().join(format!("niku-bad-{}.toml", uuid::Uuid::new_v4()));
        std::fs::write(&path, "[pricing]\ntax_rate_bps = \"six\"\n").unwrap();

        assert!(StorefrontConfig::load(Some(path.clone())).is_err());
        let config = StorefrontConfig::load_or_default(Some(path.clone()));
        assert_eq!(config.pricing.tax_rate_bps, 600);

        let _ = std::fs::remove_file(path);
    }

    #[test]
    fn test_format_money() {
        let mut config = StorefrontConfig::default();
        assert_eq!(config.format_money(Money::from_cents(6300)), "RM63.00");
        config.store.currency_symbol = "MYR ".into();
        assert_eq!(config.format_money(Money::from_cents(5)), "MYR 0.05");
    }
}
