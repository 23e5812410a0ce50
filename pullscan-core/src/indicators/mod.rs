//! Indicator implementations over candle series.
//!
//! Indicators are pure functions: candle history in, one optional value per
//! candle out. Warm-up positions are `None`, never a sentinel number.

pub mod atr;
pub mod ema;

pub use atr::{atr_proxy, true_range, wilder_smooth, Atr};
pub use ema::{ema_of_series, Ema};

use crate::domain::Candle;

/// Trait for indicators.
///
/// # Look-ahead guard
/// No value at index t may depend on candles after t. Computing over a
/// truncated series must reproduce the prefix of the full computation.
pub trait Indicator: Send + Sync {
    /// Human-readable name (e.g., "ema_20", "atr_14").
    fn name(&self) -> &str;

    /// Number of leading positions that are always `None`.
    fn lookback(&self) -> usize;

    /// Compute the indicator for the entire series, same length as `candles`.
    fn compute(&self, candles: &[Candle]) -> Vec<Option<f64>>;

    /// Most recent value, if the series is past warm-up.
    fn latest(&self, candles: &[Candle]) -> Option<f64> {
        self.compute(candles).last().copied().flatten()
    }
}

/// Create synthetic hourly candles from close prices for testing.
///
/// open = prev_close (or close for the first candle), high/low = body ± 1.0.
#[cfg(test)]
pub fn make_candles(closes: &[f64]) -> Vec<Candle> {
    use chrono::TimeZone;
    let base = chrono::Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap();
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| {
            let open = if i == 0 { close } else { closes[i - 1] };
            Candle {
                timestamp: base + chrono::Duration::hours(i as i64),
                open,
                high: open.max(close) + 1.0,
                low: open.min(close) - 1.0,
                close,
                ema20: None,
                ema50: None,
            }
        })
        .collect()
}

/// Assert two f64 values are approximately equal (within epsilon).
#[cfg(test)]
pub fn assert_approx(actual: f64, expected: f64, epsilon: f64) {
    assert!(
        (actual - expected).abs() < epsilon,
        "assert_approx failed: actual={actual}, expected={expected}, diff={}, epsilon={epsilon}",
        (actual - expected).abs()
    );
}

/// Default epsilon for indicator tests.
#[cfg(test)]
pub const DEFAULT_EPSILON: f64 = 1e-10;
