//! Trend and pullback vocabulary plus the classifier verdict.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::setup::TradeDirection;

/// Prevailing trend of a series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TrendDirection {
    Up,
    Down,
    Neutral,
}

impl TrendDirection {
    pub fn is_directional(self) -> bool {
        !matches!(self, Self::Neutral)
    }

    /// Trade direction that follows this trend, if any.
    pub fn trade_direction(self) -> Option<TradeDirection> {
        match self {
            Self::Up => Some(TradeDirection::Buy),
            Self::Down => Some(TradeDirection::Sell),
            Self::Neutral => None,
        }
    }
}

impl fmt::Display for TrendDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Up => "UP",
            Self::Down => "DOWN",
            Self::Neutral => "NEUTRAL",
        };
        f.write_str(label)
    }
}

/// Reference level the price retraced to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PullbackType {
    #[serde(rename = "FIB_38")]
    Fib38,
    #[serde(rename = "FIB_50")]
    Fib50,
    #[serde(rename = "FIB_61")]
    Fib61,
    #[serde(rename = "EMA_20")]
    Ema20,
    #[serde(rename = "EMA_50")]
    Ema50,
    Structure,
    /// No pullback detected.
    None,
}

impl PullbackType {
    pub fn is_none(self) -> bool {
        matches!(self, Self::None)
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Fib38 => "38.2% Fib Retracement",
            Self::Fib50 => "50% Fib Retracement",
            Self::Fib61 => "61.8% Fib Retracement",
            Self::Ema20 => "20 EMA Dynamic Support",
            Self::Ema50 => "50 EMA Dynamic Support",
            Self::Structure => "Structure Retest",
            Self::None => "None",
        }
    }
}

impl fmt::Display for PullbackType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Verdict produced by a pullback classifier for one series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Classification {
    pub trend_direction: TrendDirection,
    /// 0..=10. Neutral trends score 0..=3, directional trends 6..=10.
    pub trend_strength: u8,
    pub pullback_type: PullbackType,
    /// 0..=10. Zero whenever `pullback_type` is `None`.
    pub pullback_quality: u8,
}

impl Classification {
    /// A ranging-market verdict with no pullback.
    pub fn neutral(trend_strength: u8) -> Self {
        Self {
            trend_direction: TrendDirection::Neutral,
            trend_strength: trend_strength.min(3),
            pullback_type: PullbackType::None,
            pullback_quality: 0,
        }
    }

    /// Trend present, but price has not pulled back to a reference level.
    pub fn trend_without_pullback(trend_direction: TrendDirection, trend_strength: u8) -> Self {
        Self {
            trend_direction,
            trend_strength,
            pullback_type: PullbackType::None,
            pullback_quality: 0,
        }
    }

    /// Directional trend, a detected pullback, and strength above `min_trend_strength`.
    pub fn is_valid(&self, min_trend_strength: u8) -> bool {
        self.trend_direction.is_directional()
            && !self.pullback_type.is_none()
            && self.trend_strength > min_trend_strength
    }

    /// floor((strength + quality) / 2) for valid verdicts, else 0.
    pub fn confidence(&self, min_trend_strength: u8) -> u8 {
        if self.is_valid(min_trend_strength) {
            (self.trend_strength + self.pullback_quality) / 2
        } else {
            0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn confidence_floors_the_mean() {
        let verdict = Classification {
            trend_direction: TrendDirection::Up,
            trend_strength: 8,
            pullback_type: PullbackType::Ema20,
            pullback_quality: 9,
        };
        assert!(verdict.is_valid(6));
        assert_eq!(verdict.confidence(6), 8);
    }

    #[test]
    fn strength_at_threshold_is_not_valid() {
        let verdict = Classification {
            trend_direction: TrendDirection::Down,
            trend_strength: 6,
            pullback_type: PullbackType::Fib50,
            pullback_quality: 9,
        };
        assert!(!verdict.is_valid(6));
        assert_eq!(verdict.confidence(6), 0);
    }

    #[test]
    fn neutral_is_never_valid() {
        let verdict = Classification::neutral(9);
        assert_eq!(verdict.trend_strength, 3);
        assert_eq!(verdict.pullback_type, PullbackType::None);
        assert!(!verdict.is_valid(0));
    }

    #[test]
    fn trend_maps_to_trade_direction() {
        assert_eq!(TrendDirection::Up.trade_direction(), Some(TradeDirection::Buy));
        assert_eq!(TrendDirection::Down.trade_direction(), Some(TradeDirection::Sell));
        assert_eq!(TrendDirection::Neutral.trade_direction(), None);
    }

    #[test]
    fn pullback_labels() {
        assert_eq!(PullbackType::Fib61.to_string(), "61.8% Fib Retracement");
        assert_eq!(PullbackType::Ema20.to_string(), "20 EMA Dynamic Support");
        let json = serde_json::to_string(&PullbackType::Ema50).unwrap();
        assert_eq!(json, "\"EMA_50\"");
    }
}
