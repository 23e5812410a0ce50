//! Synthetic price series — biased random walk with EMA overlays.
//!
//! Each step draws a change uniformly from `[-vol/2, +vol/2)` where
//! `vol = volatility_pct * base_price`, then shifts it by `trend_bias * vol`
//! in the direction of the requested trend. Wicks extend past the body by an
//! independent draw of at most `vol / 2` on each side.

use chrono::{DateTime, Duration, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::{Candle, TrendDirection};
use crate::indicators::Ema;

/// Fast EMA period attached to candles as `ema20`.
pub const FAST_EMA_PERIOD: usize = 20;
/// Slow EMA period attached to candles as `ema50`.
pub const SLOW_EMA_PERIOD: usize = 50;

#[derive(Debug, Error, PartialEq)]
pub enum SeriesError {
    #[error("base price must be positive and finite, got {0}")]
    InvalidBasePrice(f64),

    #[error("candle count must be positive")]
    EmptySeries,

    #[error("{count} candles at {interval_minutes}m intervals fall outside the supported time range")]
    TimestampOutOfRange { count: usize, interval_minutes: i64 },
}

/// Random-walk shape parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SeriesConfig {
    /// Per-candle volatility as a fraction of the base price.
    pub volatility_pct: f64,
    /// Drift per candle as a fraction of volatility, signed by trend.
    pub trend_bias: f64,
    /// Candle interval in minutes.
    pub interval_minutes: i64,
    /// Number of candles generated per instrument.
    pub candle_count: usize,
}

impl Default for SeriesConfig {
    fn default() -> Self {
        Self {
            volatility_pct: 0.005,
            trend_bias: 0.2,
            interval_minutes: 60,
            candle_count: 100,
        }
    }
}

/// Generator for synthetic candle series.
#[derive(Debug, Clone, Default)]
pub struct SeriesGenerator {
    config: SeriesConfig,
}

impl SeriesGenerator {
    pub fn new(config: SeriesConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SeriesConfig {
        &self.config
    }

    /// Generate `count` candles ending one interval before `end`.
    ///
    /// Candle timestamps are spaced by the configured interval, oldest first.
    /// The same RNG state always produces the same series.
    pub fn generate<R: Rng + ?Sized>(
        &self,
        base_price: f64,
        count: usize,
        trend: TrendDirection,
        end: DateTime<Utc>,
        rng: &mut R,
    ) -> Result<Vec<Candle>, SeriesError> {
        if !(base_price.is_finite() && base_price > 0.0) {
            return Err(SeriesError::InvalidBasePrice(base_price));
        }
        if count == 0 {
            return Err(SeriesError::EmptySeries);
        }

        let volatility = base_price * self.config.volatility_pct;
        let bias = match trend {
            TrendDirection::Up => volatility * self.config.trend_bias,
            TrendDirection::Down => -volatility * self.config.trend_bias,
            TrendDirection::Neutral => 0.0,
        };
        let timestamps = self.timestamps(count, end)?;

        let mut candles = Vec::with_capacity(count);
        let mut price = base_price;
        for timestamp in timestamps {
            let change = (rng.gen::<f64>() - 0.5) * volatility + bias;
            let open = price;
            let close = price + change;
            let high = open.max(close) + rng.gen::<f64>() * volatility * 0.5;
            let low = open.min(close) - rng.gen::<f64>() * volatility * 0.5;
            price = close;

            candles.push(Candle {
                timestamp,
                open,
                high,
                low,
                close,
                ema20: None,
                ema50: None,
            });
        }

        attach_emas(&mut candles);
        Ok(candles)
    }

    /// Oldest-first timestamps for `count` candles closing one interval before `end`.
    fn timestamps(
        &self,
        count: usize,
        end: DateTime<Utc>,
    ) -> Result<Vec<DateTime<Utc>>, SeriesError> {
        let out_of_range = || SeriesError::TimestampOutOfRange {
            count,
            interval_minutes: self.config.interval_minutes,
        };
        let interval = Duration::try_minutes(self.config.interval_minutes)
            .filter(|d| *d > Duration::zero())
            .ok_or_else(out_of_range)?;
        let steps = i32::try_from(count).map_err(|_| out_of_range())?;
        let first = interval
            .checked_mul(steps)
            .and_then(|span| end.checked_sub_signed(span))
            .ok_or_else(out_of_range)?;

        let mut timestamps = Vec::with_capacity(count);
        let mut at = first;
        for _ in 0..count {
            timestamps.push(at);
            at += interval;
        }
        Ok(timestamps)
    }
}

/// Fill `ema20` / `ema50` on a series in place, honoring warm-up.
pub fn attach_emas(candles: &mut [Candle]) {
    let closes: Vec<f64> = candles.iter().map(|c| c.close).collect();
    let fast = Ema::new(FAST_EMA_PERIOD).over(&closes);
    let slow = Ema::new(SLOW_EMA_PERIOD).over(&closes);
    for ((candle, f), s) in candles.iter_mut().zip(fast).zip(slow) {
        candle.ema20 = f;
        candle.ema50 = s;
    }
}
