//! Series-driven classification from EMA alignment and swing structure.
//!
//! Trend: EMA-20 above EMA-50 with the last close above EMA-50 is UP; the
//! mirror image is DOWN; anything else is NEUTRAL.
//!
//! Strength: directional trends score `6 + round(4 * c)` where `c` is the share
//! of recent EMA-20 steps moving with the trend. Neutral trends score
//! `round(3 * min(|ema20 - ema50| / atr, 1))`.
//!
//! Pullback: every reference level is scored by a normalized distance in
//! [0, 1] and the nearest one wins:
//! - EMA-20 / EMA-50 and the prior swing extreme (structure retest), measured
//!   in ATRs against `proximity_atr`
//! - 38.2 / 50 / 61.8% retracements of the recent swing, measured against
//!   `fib_tolerance`
//!
//! Quality is `10 - round(3 * distance)`, 7..=10.

use rand::RngCore;
use serde::{Deserialize, Serialize};
use tracing::trace;

use super::PullbackClassifier;
use crate::domain::{Candle, Classification, PullbackType, TrendDirection};
use crate::indicators::{atr_proxy, Atr, Indicator};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmaStructureParams {
    /// Candles forming the current swing used for Fibonacci levels.
    pub swing_lookback: usize,
    /// Candles before the swing whose extreme is the structure level.
    pub structure_window: usize,
    /// EMA-20 steps examined for slope consistency.
    pub slope_window: usize,
    pub atr_period: usize,
    /// Max distance (in ATRs) from EMA or structure levels.
    pub proximity_atr: f64,
    /// Max distance (in retracement fraction) from a Fibonacci level.
    pub fib_tolerance: f64,
    /// ATR fallback as a fraction of price while ATR is warming up.
    pub fallback_atr_pct: f64,
}

impl Default for EmaStructureParams {
    fn default() -> Self {
        Self {
            swing_lookback: 30,
            structure_window: 20,
            slope_window: 10,
            atr_period: 14,
            proximity_atr: 0.5,
            fib_tolerance: 0.06,
            fallback_atr_pct: 0.01,
        }
    }
}

const FIB_LEVELS: [(f64, PullbackType); 3] = [
    (0.382, PullbackType::Fib38),
    (0.5, PullbackType::Fib50),
    (0.618, PullbackType::Fib61),
];

#[derive(Debug, Clone, Default)]
pub struct EmaStructureClassifier {
    params: EmaStructureParams,
}

impl EmaStructureClassifier {
    pub fn new(params: EmaStructureParams) -> Self {
        Self { params }
    }

    fn atr(&self, candles: &[Candle], last_close: f64) -> f64 {
        Atr::new(self.params.atr_period.max(1))
            .latest(candles)
            .filter(|a| a.is_finite() && *a > 0.0)
            .unwrap_or_else(|| atr_proxy(last_close, self.params.fallback_atr_pct))
    }

    /// Share of the last `slope_window` EMA-20 steps moving in `sign` direction.
    fn slope_consistency(&self, candles: &[Candle], sign: f64) -> f64 {
        let start = candles.len().saturating_sub(self.params.slope_window + 1);
        let emas: Vec<f64> = candles[start..].iter().filter_map(|c| c.ema20).collect();
        let steps = emas.len().saturating_sub(1);
        if steps == 0 {
            return 0.0;
        }
        let with_trend = emas.windows(2).filter(|w| (w[1] - w[0]) * sign > 0.0).count();
        with_trend as f64 / steps as f64
    }

    /// Nearest reference level as (label, normalized distance in [0, 1]).
    fn nearest_level(
        &self,
        candles: &[Candle],
        sign: f64,
        ema20: f64,
        ema50: f64,
        atr: f64,
    ) -> Option<(PullbackType, f64)> {
        let p = &self.params;
        let n = candles.len();
        let close = candles[n - 1].close;
        let mut levels: Vec<(PullbackType, f64)> = Vec::new();

        let atr_distance = |level: f64| (close - level).abs() / atr / p.proximity_atr;
        levels.push((PullbackType::Ema20, atr_distance(ema20)));
        levels.push((PullbackType::Ema50, atr_distance(ema50)));

        let swing_start = n.saturating_sub(p.swing_lookback);
        let structure_start = swing_start.saturating_sub(p.structure_window);
        if structure_start < swing_start {
            let prior = &candles[structure_start..swing_start];
            // Broken resistance becomes support in an uptrend, and vice versa.
            let level = if sign > 0.0 {
                prior.iter().map(|c| c.high).fold(f64::MIN, f64::max)
            } else {
                prior.iter().map(|c| c.low).fold(f64::MAX, f64::min)
            };
            levels.push((PullbackType::Structure, atr_distance(level)));
        }

        let swing = &candles[swing_start..];
        let high = swing.iter().map(|c| c.high).fold(f64::MIN, f64::max);
        let low = swing.iter().map(|c| c.low).fold(f64::MAX, f64::min);
        let range = high - low;
        if range > 0.0 && p.fib_tolerance > 0.0 {
            let retracement = if sign > 0.0 {
                (high - close) / range
            } else {
                (close - low) / range
            };
            for (ratio, label) in FIB_LEVELS {
                levels.push((label, (retracement - ratio).abs() / p.fib_tolerance));
            }
        }

        levels
            .into_iter()
            .filter(|(_, d)| d.is_finite() && *d <= 1.0)
            .min_by(|a, b| a.1.total_cmp(&b.1))
    }
}

impl PullbackClassifier for EmaStructureClassifier {
    fn name(&self) -> &str {
        "ema_structure"
    }

    fn classify(
        &self,
        candles: &[Candle],
        _regime: TrendDirection,
        _rng: &mut dyn RngCore,
    ) -> Classification {
        let Some(last) = candles.last() else {
            return Classification::neutral(0);
        };
        let (Some(ema20), Some(ema50)) = (last.ema20, last.ema50) else {
            trace!(candles = candles.len(), "EMA overlays not warm; reading as ranging");
            return Classification::neutral(0);
        };
        let atr = self.atr(candles, last.close);
        if !(atr.is_finite() && atr > 0.0) {
            return Classification::neutral(0);
        }

        let trend = if ema20 > ema50 && last.close > ema50 {
            TrendDirection::Up
        } else if ema20 < ema50 && last.close < ema50 {
            TrendDirection::Down
        } else {
            TrendDirection::Neutral
        };

        let Some(direction) = trend.trade_direction() else {
            let separation = ((ema20 - ema50).abs() / atr).min(1.0);
            return Classification::neutral((separation * 3.0).round() as u8);
        };
        let sign = direction.sign();

        let consistency = self.slope_consistency(candles, sign);
        let trend_strength = 6 + (consistency * 4.0).round() as u8;

        match self.nearest_level(candles, sign, ema20, ema50, atr) {
            Some((pullback_type, distance)) => Classification {
                trend_direction: trend,
                trend_strength,
                pullback_type,
                pullback_quality: 10 - (distance * 3.0).round() as u8,
            },
            None => Classification::trend_without_pullback(trend, trend_strength),
        }
    }
}
