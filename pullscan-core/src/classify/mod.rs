//! Trend and pullback classification.
//!
//! A classifier receives the generated series plus the regime trend that
//! biased its generation, and returns a `Classification`. Classification is
//! total: every well-formed series yields a verdict, never an error.
//!
//! Two strategies ship:
//! - `RandomizedClassifier` samples the verdict from the RNG stream
//! - `EmaStructureClassifier` reads it off EMA alignment and swing structure

pub mod ema_structure;
pub mod randomized;

pub use ema_structure::{EmaStructureClassifier, EmaStructureParams};
pub use randomized::RandomizedClassifier;

use rand::{Rng, RngCore};
use serde::{Deserialize, Serialize};

use crate::domain::{Candle, Classification, TrendDirection};

/// Trait for trend/pullback classifiers.
///
/// Implementations draw any randomness they need from `rng` so a scan stays
/// reproducible under a fixed seed. Series-driven implementations may ignore
/// both `regime` and `rng`.
pub trait PullbackClassifier: Send + Sync {
    /// Human-readable name (e.g., "randomized").
    fn name(&self) -> &str;

    fn classify(
        &self,
        candles: &[Candle],
        regime: TrendDirection,
        rng: &mut dyn RngCore,
    ) -> Classification;
}

/// Which classification strategy a scan uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClassifierKind {
    #[default]
    Randomized,
    EmaStructure,
}

impl std::str::FromStr for ClassifierKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "randomized" => Ok(Self::Randomized),
            "ema_structure" | "ema" => Ok(Self::EmaStructure),
            other => Err(format!(
                "unknown classifier '{other}' (expected randomized or ema_structure)"
            )),
        }
    }
}

/// Classification thresholds. Every cut-off is a named, overridable value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    pub kind: ClassifierKind,
    /// Signals need trend strength strictly above this.
    pub min_trend_strength: u8,
    /// Regime draw above this → UP.
    pub trend_up_above: f64,
    /// Regime draw below this → DOWN.
    pub trend_down_below: f64,
    /// Pullback draw above this → pullback found.
    pub pullback_above: f64,
    /// Pullback draw above this → labelled EMA-20, otherwise 50% Fib.
    pub ema20_label_above: f64,
    pub ema_structure: EmaStructureParams,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            kind: ClassifierKind::Randomized,
            min_trend_strength: 6,
            trend_up_above: 0.6,
            trend_down_below: 0.4,
            pullback_above: 0.3,
            ema20_label_above: 0.7,
            ema_structure: EmaStructureParams::default(),
        }
    }
}

impl ClassifierConfig {
    /// Draw the regime trend that biases series generation.
    pub fn draw_regime(&self, rng: &mut dyn RngCore) -> TrendDirection {
        let draw: f64 = rng.gen();
        if draw > self.trend_up_above {
            TrendDirection::Up
        } else if draw < self.trend_down_below {
            TrendDirection::Down
        } else {
            TrendDirection::Neutral
        }
    }
}

/// Build the configured classifier.
pub fn create_classifier(config: &ClassifierConfig) -> Box<dyn PullbackClassifier> {
    match config.kind {
        ClassifierKind::Randomized => Box::new(RandomizedClassifier::new(config)),
        ClassifierKind::EmaStructure => {
            Box::new(EmaStructureClassifier::new(config.ema_structure.clone()))
        }
    }
}
