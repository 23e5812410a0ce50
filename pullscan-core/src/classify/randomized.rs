//! Randomized classification policy.
//!
//! Stands in for real analysis: the trend is the regime the series was
//! generated with, and strength, pullback and quality are sampled.
//!
//! - neutral strength: floor(U * 4), 0..=3
//! - directional strength: floor(U * 4) + 6, 6..=9
//! - pullback found when U > `pullback_above`; EMA-20 when U > `ema20_label_above`,
//!   otherwise 50% Fib
//! - quality: floor(U * 3) + 7, 7..=9

use rand::{Rng, RngCore};

use super::{ClassifierConfig, PullbackClassifier};
use crate::domain::{Candle, Classification, PullbackType, TrendDirection};

#[derive(Debug, Clone)]
pub struct RandomizedClassifier {
    pullback_above: f64,
    ema20_label_above: f64,
}

impl RandomizedClassifier {
    pub fn new(config: &ClassifierConfig) -> Self {
        Self {
            pullback_above: config.pullback_above,
            ema20_label_above: config.ema20_label_above,
        }
    }
}

impl Default for RandomizedClassifier {
    fn default() -> Self {
        Self::new(&ClassifierConfig::default())
    }
}

fn sample_score(rng: &mut dyn RngCore, buckets: u8, offset: u8) -> u8 {
    let draw: f64 = rng.gen();
    (draw * buckets as f64).floor() as u8 + offset
}

impl PullbackClassifier for RandomizedClassifier {
    fn name(&self) -> &str {
        "randomized"
    }

    fn classify(
        &self,
        _candles: &[Candle],
        regime: TrendDirection,
        rng: &mut dyn RngCore,
    ) -> Classification {
        if !regime.is_directional() {
            return Classification::neutral(sample_score(rng, 4, 0));
        }

        let trend_strength = sample_score(rng, 4, 6);
        let pullback_draw: f64 = rng.gen();
        if pullback_draw <= self.pullback_above {
            return Classification::trend_without_pullback(regime, trend_strength);
        }

        let pullback_type = if pullback_draw > self.ema20_label_above {
            PullbackType::Ema20
        } else {
            PullbackType::Fib50
        };

        Classification {
            trend_direction: regime,
            trend_strength,
            pullback_type,
            pullback_quality: sample_score(rng, 3, 7),
        }
    }
}
