//! Exponential Moving Average (EMA).
//!
//! Recursive: EMA[t] = k * close[t] + (1 - k) * EMA[t-1], k = 2 / (period + 1)
//! Seed: EMA[0] = close[0], so the recursion runs from the very first candle.
//! Values are only published once index > period; earlier ones are still
//! carried through the recursion.

use super::Indicator;
use crate::domain::Candle;

#[derive(Debug, Clone)]
pub struct Ema {
    period: usize,
    name: String,
}

impl Ema {
    pub fn new(period: usize) -> Self {
        assert!(period >= 1, "EMA period must be >= 1");
        Self {
            period,
            name: format!("ema_{period}"),
        }
    }

    /// Smoothing factor 2 / (period + 1).
    pub fn smoothing(&self) -> f64 {
        2.0 / (self.period as f64 + 1.0)
    }

    /// Whether a value at `index` is past warm-up.
    pub fn is_warm(&self, index: usize) -> bool {
        index > self.period
    }

    /// Run the recursion over raw values and gate by warm-up.
    pub fn over(&self, values: &[f64]) -> Vec<Option<f64>> {
        ema_of_series(values, self.period)
            .into_iter()
            .enumerate()
            .map(|(i, v)| self.is_warm(i).then_some(v))
            .collect()
    }
}

impl Indicator for Ema {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.period + 1
    }

    fn compute(&self, candles: &[Candle]) -> Vec<Option<f64>> {
        let closes: Vec<f64> = candles.iter().map(|c| c.close).collect();
        self.over(&closes)
    }
}

/// Raw EMA recursion seeded with the first value, without warm-up gating.
///
/// Index 0 equals `values[0]`; the result has the same length as `values`.
pub fn ema_of_series(values: &[f64], period: usize) -> Vec<f64> {
    let Some(&first) = values.first() else {
        return Vec::new();
    };
    let k = 2.0 / (period.max(1) as f64 + 1.0);
    let mut prev = first;
    values
        .iter()
        .map(|&v| {
            prev = v * k + prev * (1.0 - k);
            prev
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{assert_approx, make_candles, DEFAULT_EPSILON};

    #[test]
    fn ema_period_1_equals_close() {
        let series = ema_of_series(&[100.0, 200.0, 300.0], 1);
        assert_approx(series[0], 100.0, DEFAULT_EPSILON);
        assert_approx(series[1], 200.0, DEFAULT_EPSILON);
        assert_approx(series[2], 300.0, DEFAULT_EPSILON);
    }

    #[test]
    fn ema_3_known_values() {
        // Closes: 10, 12, 14; k = 0.5, seed = 10
        // EMA[0] = 10
        // EMA[1] = 0.5*12 + 0.5*10 = 11
        // EMA[2] = 0.5*14 + 0.5*11 = 12.5
        let series = ema_of_series(&[10.0, 12.0, 14.0], 3);
        assert_approx(series[0], 10.0, DEFAULT_EPSILON);
        assert_approx(series[1], 11.0, DEFAULT_EPSILON);
        assert_approx(series[2], 12.5, DEFAULT_EPSILON);
    }

    #[test]
    fn ema_gates_values_until_index_exceeds_period() {
        let closes: Vec<f64> = (0..30).map(|i| 100.0 + i as f64).collect();
        let ema = Ema::new(20);
        let gated = ema.compute(&make_candles(&closes));
        assert!(gated[..=20].iter().all(Option::is_none));
        assert!(gated[21..].iter().all(Option::is_some));

        let raw = ema_of_series(&closes, 20);
        assert_approx(gated[25].unwrap(), raw[25], DEFAULT_EPSILON);
    }

    #[test]
    fn ema_constant_series_is_constant() {
        let series = ema_of_series(&[5.0; 60], 50);
        assert!(series.iter().all(|&v| (v - 5.0).abs() < DEFAULT_EPSILON));
    }

    #[test]
    fn ema_empty_series() {
        assert!(ema_of_series(&[], 20).is_empty());
        assert!(Ema::new(20).latest(&[]).is_none());
    }

    #[test]
    fn ema_truncated_matches_prefix() {
        let closes: Vec<f64> = (0..60).map(|i| (i as f64 * 0.7).sin() * 10.0 + 100.0).collect();
        let full = ema_of_series(&closes, 20);
        let truncated = ema_of_series(&closes[..40], 20);
        for i in 0..40 {
            assert_approx(full[i], truncated[i], DEFAULT_EPSILON);
        }
    }

    #[test]
    fn ema_smoothing_and_lookback() {
        let ema = Ema::new(20);
        assert_approx(ema.smoothing(), 2.0 / 21.0, DEFAULT_EPSILON);
        assert_eq!(ema.lookback(), 21);
        assert_eq!(ema.name(), "ema_20");
    }
}
