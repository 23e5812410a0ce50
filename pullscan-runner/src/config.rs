//! Serializable scan configuration.
//!
//! Every tunable of a scan lives here: random-walk shape, classifier
//! thresholds, setup geometry, per-asset-class base prices, the master seed
//! and the parallelism switch. All sections default, so an empty TOML file
//! yields the stock configuration.
//!
//! ```toml
//! seed = 42
//! parallel = true
//!
//! [series]
//! candle_count = 100
//!
//! [classifier]
//! kind = "ema_structure"
//! min_trend_strength = 6
//!
//! [setup]
//! atr_pct = 0.01
//!
//! [base_prices]
//! crypto = 45000.0
//! ```

use std::path::{Path, PathBuf};

use pullscan_core::domain::AssetClass;
use pullscan_core::{ClassifierConfig, SeriesConfig, SetupConfig};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Upper bound on `series.candle_count`.
pub const MAX_CANDLE_COUNT: usize = 10_000;
/// Upper bound on `series.interval_minutes` (one week).
pub const MAX_INTERVAL_MINUTES: i64 = 7 * 24 * 60;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    Invalid(String),

    #[error("duplicate instrument symbol '{0}' in universe")]
    DuplicateSymbol(String),
}

/// Starting price of the random walk for each asset class.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BasePrices {
    pub forex: f64,
    pub crypto: f64,
    pub stock: f64,
}

impl Default for BasePrices {
    fn default() -> Self {
        Self {
            forex: 1.08,
            crypto: 45_000.0,
            stock: 150.0,
        }
    }
}

impl BasePrices {
    pub fn for_class(&self, asset_class: AssetClass) -> f64 {
        match asset_class {
            AssetClass::Forex => self.forex,
            AssetClass::Crypto => self.crypto,
            AssetClass::Stock => self.stock,
        }
    }
}

/// Full configuration for one scan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// Master seed. `None` draws a fresh seed per scan.
    pub seed: Option<u64>,
    /// Fan the per-instrument work out over the rayon pool.
    pub parallel: bool,
    pub series: SeriesConfig,
    pub classifier: ClassifierConfig,
    pub setup: SetupConfig,
    pub base_prices: BasePrices,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            seed: None,
            parallel: true,
            series: SeriesConfig::default(),
            classifier: ClassifierConfig::default(),
            setup: SetupConfig::default(),
            base_prices: BasePrices::default(),
        }
    }
}

impl ScanConfig {
    /// Load and validate a config file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    /// Parse and validate a config from TOML text.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }

    /// Reject configurations that cannot produce well-formed signals.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let s = &self.series;
        if s.candle_count == 0 || s.candle_count > MAX_CANDLE_COUNT {
            return Err(ConfigError::Invalid(format!(
                "series.candle_count must lie in 1..={MAX_CANDLE_COUNT}, got {}",
                s.candle_count
            )));
        }
        if !(s.volatility_pct.is_finite() && s.volatility_pct > 0.0) {
            return invalid("series.volatility_pct must be positive");
        }
        if !s.trend_bias.is_finite() || s.trend_bias < 0.0 {
            return invalid("series.trend_bias must be non-negative");
        }
        if !(1..=MAX_INTERVAL_MINUTES).contains(&s.interval_minutes) {
            return Err(ConfigError::Invalid(format!(
                "series.interval_minutes must lie in 1..={MAX_INTERVAL_MINUTES}, got {}",
                s.interval_minutes
            )));
        }

        let c = &self.classifier;
        if c.min_trend_strength > 10 {
            return invalid("classifier.min_trend_strength must be at most 10");
        }
        if !in_unit(c.trend_down_below)
            || !in_unit(c.trend_up_above)
            || c.trend_down_below > c.trend_up_above
        {
            return invalid(
                "classifier regime cut-offs need 0 <= trend_down_below <= trend_up_above <= 1",
            );
        }
        if !in_unit(c.pullback_above) || !in_unit(c.ema20_label_above) {
            return invalid("classifier pullback cut-offs must lie in [0, 1]");
        }

        let t = &self.setup;
        if !(t.atr_pct.is_finite() && t.atr_pct > 0.0) {
            return invalid("setup.atr_pct must be positive");
        }
        if !(0.0..1.0).contains(&t.entry_offset_pct) {
            return invalid("setup.entry_offset_pct must lie in [0, 1)");
        }
        if !in_unit(t.stop_below) || !in_unit(t.limit_above) || t.stop_below > t.limit_above {
            return invalid("setup execution bands need 0 <= stop_below <= limit_above <= 1");
        }
        if !(t.stop_atr > 0.0 && 0.0 < t.tp1_atr && t.tp1_atr < t.tp2_atr && t.tp2_atr < t.tp3_atr)
        {
            return invalid("setup multiples need stop_atr > 0 and 0 < tp1_atr < tp2_atr < tp3_atr");
        }

        for class in AssetClass::ALL {
            let price = self.base_prices.for_class(class);
            if !(price.is_finite() && price > 0.0) {
                return Err(ConfigError::Invalid(format!(
                    "base price for {class} must be positive, got {price}"
                )));
            }
        }
        Ok(())
    }
}

fn in_unit(v: f64) -> bool {
    (0.0..=1.0).contains(&v)
}

fn invalid(msg: &str) -> Result<(), ConfigError> {
    Err(ConfigError::Invalid(msg.to_string()))
}
