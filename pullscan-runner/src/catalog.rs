//! Instrument catalog — the default scan universe and TOML-loaded overrides.
//!
//! A custom universe is a TOML file with one `[[instruments]]` table per entry:
//!
//! ```toml
//! [[instruments]]
//! symbol = "EUR/USD"
//! name = "Euro / US Dollar"
//! asset_class = "FOREX"
//! ```

use std::collections::HashSet;
use std::path::Path;

use pullscan_core::domain::{AssetClass, Instrument};
use serde::{Deserialize, Serialize};

use crate::config::ConfigError;

const DEFAULT_INSTRUMENTS: [(&str, &str, AssetClass); 18] = [
    ("EUR/USD", "Euro / US Dollar", AssetClass::Forex),
    ("GBP/USD", "British Pound / US Dollar", AssetClass::Forex),
    ("USD/JPY", "US Dollar / Japanese Yen", AssetClass::Forex),
    ("USD/CHF", "US Dollar / Swiss Franc", AssetClass::Forex),
    ("USD/CAD", "US Dollar / Canadian Dollar", AssetClass::Forex),
    ("AUD/USD", "Australian Dollar / US Dollar", AssetClass::Forex),
    ("NZD/USD", "New Zealand Dollar / US Dollar", AssetClass::Forex),
    ("EUR/JPY", "Euro / Japanese Yen", AssetClass::Forex),
    ("BTC/USDT", "Bitcoin", AssetClass::Crypto),
    ("ETH/USDT", "Ethereum", AssetClass::Crypto),
    ("SOL/USDT", "Solana", AssetClass::Crypto),
    ("XRP/USDT", "Ripple", AssetClass::Crypto),
    ("ADA/USDT", "Cardano", AssetClass::Crypto),
    ("AAPL", "Apple Inc.", AssetClass::Stock),
    ("MSFT", "Microsoft Corp.", AssetClass::Stock),
    ("NVDA", "NVIDIA Corp.", AssetClass::Stock),
    ("TSLA", "Tesla Inc.", AssetClass::Stock),
    ("AMZN", "Amazon.com Inc.", AssetClass::Stock),
];

/// An ordered, duplicate-free list of instruments to scan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Catalog {
    pub instruments: Vec<Instrument>,
}

impl Default for Catalog {
    fn default() -> Self {
        Self {
            instruments: DEFAULT_INSTRUMENTS
                .iter()
                .map(|&(symbol, name, class)| Instrument::new(symbol, name, class))
                .collect(),
        }
    }
}

impl Catalog {
    /// Load a universe from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content)
    }

    /// Parse a universe from TOML text, rejecting repeated symbols.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let catalog: Self = toml::from_str(content)?;
        let mut seen = HashSet::new();
        for inst in &catalog.instruments {
            if !seen.insert(inst.symbol.as_str()) {
                return Err(ConfigError::DuplicateSymbol(inst.symbol.clone()));
            }
        }
        Ok(catalog)
    }

    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }

    /// Keep only instruments of the given class, preserving order.
    pub fn filter_class(self, asset_class: AssetClass) -> Self {
        Self {
            instruments: self
                .instruments
                .into_iter()
                .filter(|i| i.asset_class == asset_class)
                .collect(),
        }
    }

    pub fn find(&self, symbol: &str) -> Option<&Instrument> {
        self.instruments
            .iter()
            .find(|i| i.symbol.eq_ignore_ascii_case(symbol))
    }

    pub fn len(&self) -> usize {
        self.instruments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instruments.is_empty()
    }
}
