//! Average True Range (ATR) and the percent-of-price ATR proxy.
//!
//! True Range: max(high-low, |high-prev_close|, |low-prev_close|)
//! ATR uses Wilder smoothing (EMA with alpha = 1/period).
//! Lookback: period (needs period+1 candles for the TR series, then average).
//!
//! Trade setups size their stops from `atr_proxy`, a fixed fraction of the
//! current price. The smoothed ATR is used by series-driven classification.

use super::Indicator;
use crate::domain::Candle;

#[derive(Debug, Clone)]
pub struct Atr {
    period: usize,
    name: String,
}

impl Atr {
    pub fn new(period: usize) -> Self {
        assert!(period >= 1, "ATR period must be >= 1");
        Self {
            period,
            name: format!("atr_{period}"),
        }
    }
}

/// Volatility proxy: `pct` of the current price (0.01 = 1%).
pub fn atr_proxy(current_price: f64, pct: f64) -> f64 {
    current_price * pct
}

/// Compute the True Range series.
/// TR[0] = high[0] - low[0] (no previous close).
pub fn true_range(candles: &[Candle]) -> Vec<f64> {
    candles
        .iter()
        .enumerate()
        .map(|(i, c)| {
            let hl = c.high - c.low;
            match i.checked_sub(1).map(|p| candles[p].close) {
                Some(pc) => hl.max((c.high - pc).abs()).max((c.low - pc).abs()),
                None => hl,
            }
        })
        .collect()
}

/// Apply Wilder smoothing to a series. Alpha = 1/period.
/// Seed: mean of the first `period` finite values after `skip` leading entries.
pub fn wilder_smooth(values: &[f64], period: usize, skip: usize) -> Vec<Option<f64>> {
    let n = values.len();
    let mut result = vec![None; n];

    if period == 0 || n < skip + period {
        return result;
    }

    let seed_end = skip + period;
    let window = &values[skip..seed_end];
    if window.iter().any(|v| !v.is_finite()) {
        return result;
    }

    let seed = window.iter().sum::<f64>() / period as f64;
    result[seed_end - 1] = Some(seed);

    let alpha = 1.0 / period as f64;
    let mut prev = seed;

    for i in seed_end..n {
        if !values[i].is_finite() {
            // Non-finite input taints everything after it.
            break;
        }
        let smoothed = alpha * values[i] + (1.0 - alpha) * prev;
        result[i] = Some(smoothed);
        prev = smoothed;
    }

    result
}

impl Indicator for Atr {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.period
    }

    fn compute(&self, candles: &[Candle]) -> Vec<Option<f64>> {
        // TR[0] has no previous close, so the Wilder seed starts from TR[1].
        wilder_smooth(&true_range(candles), self.period, 1)
    }
}
