use serde::{Deserialize, Serialize};
use std::fmt;

/// Asset class of a scanned instrument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AssetClass {
    Forex,
    Crypto,
    Stock,
}

impl AssetClass {
    pub const ALL: [AssetClass; 3] = [AssetClass::Forex, AssetClass::Crypto, AssetClass::Stock];
}

impl std::str::FromStr for AssetClass {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "forex" | "fx" => Ok(Self::Forex),
            "crypto" => Ok(Self::Crypto),
            "stock" | "stocks" => Ok(Self::Stock),
            other => Err(format!(
                "unknown asset class '{other}' (expected forex, crypto or stock)"
            )),
        }
    }
}

impl fmt::Display for AssetClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            AssetClass::Forex => "Forex",
            AssetClass::Crypto => "Crypto",
            AssetClass::Stock => "Stock",
        };
        f.write_str(label)
    }
}

/// Instrument metadata supplied by an external catalog.
///
/// Treated as read-only input; the symbol identifies the instrument within a scan.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct Instrument {
    pub symbol: String,
    pub name: String,
    pub asset_class: AssetClass,
}

impl Instrument {
    pub fn new(symbol: impl Into<String>, name: impl Into<String>, asset_class: AssetClass) -> Self {
        Self { symbol: symbol.into(), name: name.into(), asset_class }
    }
}

impl fmt::Display for Instrument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.symbol, self.name)
    }
}
