//! Candle — the fundamental price unit of a generated series.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One OHLC candle with optional EMA overlays.
///
/// `ema20` / `ema50` stay `None` until the series has enough history for the
/// average to be meaningful (index > period).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    pub timestamp: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub ema20: Option<f64>,
    pub ema50: Option<f64>,
}

impl Candle {
    /// Returns true if any OHLC field is NaN or infinite.
    pub fn is_void(&self) -> bool {
        !(self.open.is_finite()
            && self.high.is_finite()
            && self.low.is_finite()
            && self.close.is_finite())
    }

    /// OHLC envelope check: the high/low wicks contain both open and close.
    pub fn is_sane(&self) -> bool {
        if self.is_void() {
            return false;
        }
        self.high >= self.low
            && self.high >= self.open.max(self.close)
            && self.low <= self.open.min(self.close)
    }

    pub fn is_bullish(&self) -> bool {
        self.close > self.open
    }
}
