use chrono::NaiveDate;
use config::{Config, Environment, File};
use serde::Deserialize;
use std::env;

use crate::errors::EtlError;

/// Default values for configuration
const DEFAULT_LOG_LEVEL: &str = "info";
const DEFAULT_ENV: &str = "development";
const CONFIG_DIR: &str = "config";
const DEFAULT_CURRENCY: &str = "MYR";

/// An inclusive numeric band, e.g. the jitter multiplier range.
#[derive(Clone, Copy, Debug, Deserialize, PartialEq)]
pub struct Band {
    pub min: f64,
    pub max: f64,
}

/// An inclusive integer range used for quantity draws.
#[derive(Clone, Copy, Debug, Deserialize, PartialEq)]
pub struct QuantityRange {
    pub min: u32,
    pub max: u32,
}

/// A product category together with its base daily order rate.
#[derive(Clone, Debug, Deserialize)]
pub struct CategoryRate {
    pub name: String,
    pub base_rate: f64,
}

/// Year-over-year growth factor for one calendar year.
#[derive(Clone, Copy, Debug, Deserialize)]
pub struct YoyGrowth {
    pub year: i32,
    pub factor: f64,
}

/// A discount rate (whole percent) with its draw weight.
#[derive(Clone, Copy, Debug, Deserialize)]
pub struct DiscountWeight {
    pub rate: u32,
    pub weight: u32,
}

/// Tunables for the synthetic data generators.
///
/// Every field has a default matching the production rate tables, so an
/// empty configuration file still produces a sensible dataset.
#[derive(Clone, Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GenerationConfig {
    /// Categories eligible for transaction synthesis, with base daily rates.
    pub categories: Vec<CategoryRate>,

    /// Per-month demand multipliers, January through December.
    pub seasonal: Vec<f64>,

    /// Per-year growth factors; years not listed fall back to 1.0.
    pub yoy_growth: Vec<YoyGrowth>,

    /// Demand multiplier applied on Saturday and Sunday.
    pub weekend_factor: f64,

    /// Uniform random multiplier band applied to every daily count.
    pub jitter: Band,

    /// Quotation volume as a fraction of order volume.
    pub quotation_rate: f64,

    /// Quantity range for order lines.
    pub order_quantity: QuantityRange,

    /// Quantity range for quotation lines (wider than orders).
    pub quote_quantity: QuantityRange,

    /// Weighted discrete set of order discount rates, in whole percent.
    pub discounts: Vec<DiscountWeight>,

    /// Sales channels drawn uniformly per order.
    pub sales_channels: Vec<String>,

    /// Days between a quotation and its expected close date.
    pub close_days: QuantityRange,

    /// Base monthly company-wide target before seasonal/YoY scaling.
    pub base_monthly_target: f64,

    /// Individual salesperson target jitter around the equal split.
    pub salesperson_target_jitter: Band,

    /// Number of trailing weeks of inventory snapshots (plus the current week).
    pub inventory_weeks: u32,

    /// Forecast horizons, ordered from nearest to farthest.
    pub forecast_horizons: Vec<String>,

    /// Forecast base revenue per unit of category weight.
    pub forecast_revenue_per_weight: f64,

    /// Predicted margin as a fraction of predicted revenue.
    pub forecast_margin_ratio: f64,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            categories: vec![
                CategoryRate { name: "PVC Leather".into(), base_rate: 3.5 },
                CategoryRate { name: "Upholstery Fabric".into(), base_rate: 3.0 },
                CategoryRate { name: "Canvas & Tarpaulin".into(), base_rate: 2.5 },
                CategoryRate { name: "Accessories".into(), base_rate: 2.0 },
                CategoryRate { name: "Sheeting".into(), base_rate: 1.5 },
                CategoryRate { name: "Carpet & Flooring".into(), base_rate: 1.5 },
                CategoryRate { name: "Recliner".into(), base_rate: 1.0 },
                CategoryRate { name: "Non Woven".into(), base_rate: 1.0 },
            ],
            // Jan..Dec: post-holiday slow start, year-end rush.
            seasonal: vec![
                0.7, 0.75, 0.85, 0.9, 0.95, 1.0, 0.95, 1.0, 1.1, 1.15, 1.2, 1.25,
            ],
            yoy_growth: vec![
                YoyGrowth { year: 2024, factor: 1.0 },
                YoyGrowth { year: 2025, factor: 1.15 },
                YoyGrowth { year: 2026, factor: 1.28 },
            ],
            weekend_factor: 0.3,
            jitter: Band { min: 0.7, max: 1.3 },
            quotation_rate: 0.4,
            order_quantity: QuantityRange { min: 5, max: 200 },
            quote_quantity: QuantityRange { min: 10, max: 500 },
            discounts: vec![
                DiscountWeight { rate: 0, weight: 3 },
                DiscountWeight { rate: 5, weight: 2 },
                DiscountWeight { rate: 10, weight: 2 },
                DiscountWeight { rate: 15, weight: 1 },
            ],
            sales_channels: vec![
                "Direct".into(),
                "Distributor".into(),
                "Online".into(),
                "Key Account".into(),
            ],
            close_days: QuantityRange { min: 7, max: 60 },
            base_monthly_target: 400_000.0,
            salesperson_target_jitter: Band { min: 0.8, max: 1.2 },
            inventory_weeks: 12,
            forecast_horizons: vec![
                "Current Month".into(),
                "Next Month".into(),
                "60-90 Day Outlook".into(),
            ],
            forecast_revenue_per_weight: 50_000.0,
            forecast_margin_ratio: 0.35,
        }
    }
}

impl GenerationConfig {
    /// Seasonal multiplier for a 1-based month.
    pub fn seasonal_factor(&self, month: u32) -> f64 {
        self.seasonal
            .get((month as usize).saturating_sub(1))
            .copied()
            .unwrap_or(1.0)
    }

    /// Year-over-year growth factor; unknown years are treated as baseline.
    pub fn yoy_factor(&self, year: i32) -> f64 {
        self.yoy_growth
            .iter()
            .find(|g| g.year == year)
            .map(|g| g.factor)
            .unwrap_or(1.0)
    }

    /// Base rate for a category name, if the category is configured.
    pub fn base_rate(&self, category: &str) -> Option<f64> {
        self.categories
            .iter()
            .find(|c| c.name == category)
            .map(|c| c.base_rate)
    }

    /// Sum of all category base-rate weights, used for proportional
    /// target allocation.
    pub fn total_weight(&self) -> f64 {
        self.categories.iter().map(|c| c.base_rate).sum()
    }

    fn validate(&self) -> Result<(), EtlError> {
        let fail = |msg: String| Err(EtlError::Config(msg));

        if self.categories.is_empty() {
            return fail("at least one category with a base rate is required".into());
        }
        if let Some(bad) = self.categories.iter().find(|c| c.base_rate < 0.0) {
            return fail(format!("category '{}' has a negative base rate", bad.name));
        }
        let mut names: Vec<&str> = self.categories.iter().map(|c| c.name.as_str()).collect();
        names.sort_unstable();
        names.dedup();
        if names.len() != self.categories.len() {
            return fail("category names must be unique".into());
        }
        if self.seasonal.len() != 12 {
            return fail(format!(
                "seasonal table must have 12 entries, got {}",
                self.seasonal.len()
            ));
        }
        if self.seasonal.iter().any(|m| *m <= 0.0) {
            return fail("seasonal multipliers must be positive".into());
        }
        if self.jitter.min > self.jitter.max || self.jitter.min < 0.0 {
            return fail("jitter band must be ordered and non-negative".into());
        }
        if !(self.weekend_factor > 0.0 && self.weekend_factor <= 1.0) {
            return fail("weekend_factor must be in (0, 1]".into());
        }
        if !(self.quotation_rate > 0.0 && self.quotation_rate <= 1.0) {
            return fail("quotation_rate must be in (0, 1]".into());
        }
        for (label, range) in [
            ("order_quantity", self.order_quantity),
            ("quote_quantity", self.quote_quantity),
            ("close_days", self.close_days),
        ] {
            if range.min == 0 || range.min > range.max {
                return fail(format!("{label} range must be ordered and start at 1 or above"));
            }
        }
        if self.discounts.is_empty() || self.discounts.iter().all(|d| d.weight == 0) {
            return fail("discount table must carry at least one positive weight".into());
        }
        if self.discounts.iter().any(|d| d.rate > 100) {
            return fail("discount rates are whole percent and cannot exceed 100".into());
        }
        if self.sales_channels.is_empty() {
            return fail("at least one sales channel is required".into());
        }
        if self.forecast_horizons.is_empty() {
            return fail("at least one forecast horizon is required".into());
        }
        if self.base_monthly_target <= 0.0 {
            return fail("base_monthly_target must be positive".into());
        }
        Ok(())
    }
}

/// Application configuration.
///
/// Loaded from `config/default.toml`, an optional per-environment file, and
/// environment variables prefixed `APP__` (e.g. `APP__DATABASE_URL`).
#[derive(Clone, Debug, Deserialize)]
pub struct AppConfig {
    /// Destination (analytics store) connection URL.
    pub database_url: String,

    /// Optional source ERP connection URL; when absent the extract phase is
    /// skipped and master data is read back from the destination.
    #[serde(default)]
    pub source_database_url: Option<String>,

    /// First day of the generation window (inclusive).
    pub start_date: NaiveDate,

    /// Last day of the generation window (inclusive).
    pub end_date: NaiveDate,

    /// Logging level
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Log in JSON format (structured logging)
    #[serde(default)]
    pub log_json: bool,

    /// Whether to create missing destination tables on startup.
    #[serde(default)]
    pub auto_migrate: bool,

    /// Fixed RNG seed for reproducible runs; entropy-seeded when absent.
    #[serde(default)]
    pub random_seed: Option<u64>,

    /// ISO currency code stamped on every monetary row.
    #[serde(default = "default_currency")]
    pub currency: String,

    /// DB pool: max connections
    #[serde(default = "default_db_max_connections")]
    pub db_max_connections: u32,

    /// DB pool: min connections
    #[serde(default = "default_db_min_connections")]
    pub db_min_connections: u32,

    /// DB timeouts (seconds)
    #[serde(default = "default_db_connect_timeout_secs")]
    pub db_connect_timeout_secs: u64,
    #[serde(default = "default_db_idle_timeout_secs")]
    pub db_idle_timeout_secs: u64,
    #[serde(default = "default_db_acquire_timeout_secs")]
    pub db_acquire_timeout_secs: u64,

    /// Generator tunables.
    #[serde(default)]
    pub generation: GenerationConfig,
}

impl AppConfig {
    /// Minimal constructor used by tests and embedding callers; everything
    /// else takes its default.
    pub fn new(
        database_url: impl Into<String>,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Self {
        Self {
            database_url: database_url.into(),
            source_database_url: None,
            start_date,
            end_date,
            log_level: default_log_level(),
            log_json: false,
            auto_migrate: false,
            random_seed: None,
            currency: default_currency(),
            db_max_connections: default_db_max_connections(),
            db_min_connections: default_db_min_connections(),
            db_connect_timeout_secs: default_db_connect_timeout_secs(),
            db_idle_timeout_secs: default_db_idle_timeout_secs(),
            db_acquire_timeout_secs: default_db_acquire_timeout_secs(),
            generation: GenerationConfig::default(),
        }
    }

    /// Validates cross-field constraints after deserialization.
    pub fn validate(&self) -> Result<(), EtlError> {
        if self.database_url.trim().is_empty() {
            return Err(EtlError::Config("database_url must not be empty".into()));
        }
        if self.start_date > self.end_date {
            return Err(EtlError::Config(format!(
                "start_date {} is after end_date {}",
                self.start_date, self.end_date
            )));
        }
        if self.currency.len() != 3 {
            return Err(EtlError::Config(format!(
                "currency must be a 3-letter code, got '{}'",
                self.currency
            )));
        }
        self.generation.validate()
    }
}

fn default_log_level() -> String {
    DEFAULT_LOG_LEVEL.to_string()
}

fn default_currency() -> String {
    DEFAULT_CURRENCY.to_string()
}

fn default_db_max_connections() -> u32 {
    5
}

fn default_db_min_connections() -> u32 {
    1
}

fn default_db_connect_timeout_secs() -> u64 {
    10
}

fn default_db_idle_timeout_secs() -> u64 {
    600
}

fn default_db_acquire_timeout_secs() -> u64 {
    10
}

/// Loads configuration from the config directory and environment.
///
/// # Errors
/// Returns `EtlError::Config` when sources cannot be read, deserialization
/// fails, or validation rejects the resulting values.
pub fn load_config() -> Result<AppConfig, EtlError> {
    let environment = env::var("APP_ENV").unwrap_or_else(|_| DEFAULT_ENV.to_string());

    let builder = Config::builder()
        .add_source(File::with_name(&format!("{CONFIG_DIR}/default")).required(false))
        .add_source(File::with_name(&format!("{CONFIG_DIR}/{environment}")).required(false))
        .add_source(Environment::with_prefix("APP").separator("__"));

    let cfg: AppConfig = builder
        .build()
        .map_err(|e| EtlError::Config(e.to_string()))?
        .try_deserialize()
        .map_err(|e| EtlError::Config(e.to_string()))?;

    cfg.validate()?;
    Ok(cfg)
}

/// Initializes the global tracing subscriber.
///
/// `RUST_LOG` overrides the configured level when set.
pub fn init_tracing(level: &str, json: bool) {
    use tracing_subscriber::{fmt, EnvFilter};

    let default_directive = format!("sales_insights_seeder={level},sea_orm=warn,sqlx=warn");
    let filter_directive = env::var("RUST_LOG")
        .ok()
        .filter(|s| !s.trim().is_empty())
        .unwrap_or(default_directive);
    let filter = EnvFilter::new(filter_directive);

    if json {
        let _ = fmt().with_env_filter(filter).json().try_init();
    } else {
        let _ = fmt().with_env_filter(filter).try_init();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn default_generation_config_is_valid() {
        let cfg = AppConfig::new("sqlite::memory:", date(2024, 1, 1), date(2026, 12, 31));
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn rejects_inverted_date_window() {
        let cfg = AppConfig::new("sqlite::memory:", date(2025, 6, 1), date(2025, 1, 1));
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn rejects_short_seasonal_table() {
        let mut cfg = AppConfig::new("sqlite::memory:", date(2024, 1, 1), date(2024, 2, 1));
        cfg.generation.seasonal.truncate(6);
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn rejects_duplicate_categories() {
        let mut cfg = AppConfig::new("sqlite::memory:", date(2024, 1, 1), date(2024, 2, 1));
        cfg.generation.categories.push(CategoryRate {
            name: "Recliner".into(),
            base_rate: 2.0,
        });
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn partial_generation_overrides_keep_defaults() {
        let gen: GenerationConfig =
            serde_json::from_str(r#"{ "weekend_factor": 0.5, "inventory_weeks": 4 }"#).unwrap();
        assert_eq!(gen.weekend_factor, 0.5);
        assert_eq!(gen.inventory_weeks, 4);
        assert_eq!(gen.categories.len(), 8);
        assert_eq!(gen.quotation_rate, 0.4);
    }

    #[test]
    fn unknown_generation_keys_are_rejected() {
        let result = serde_json::from_str::<GenerationConfig>(r#"{ "weekendfactor": 0.5 }"#);
        assert!(result.is_err());
    }

    #[test]
    fn unknown_year_falls_back_to_baseline_growth() {
        let gen = GenerationConfig::default();
        assert_eq!(gen.yoy_factor(2030), 1.0);
        assert_eq!(gen.yoy_factor(2025), 1.15);
    }

    #[test]
    fn seasonal_factor_is_one_based() {
        let gen = GenerationConfig::default();
        assert_eq!(gen.seasonal_factor(1), 0.7);
        assert_eq!(gen.seasonal_factor(12), 1.25);
    }
}
