//! Trade setup — entry, protective stop, and three profit targets.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TradeDirection {
    Buy,
    Sell,
}

impl TradeDirection {
    /// +1.0 for buys, -1.0 for sells. Multiplies price offsets.
    pub fn sign(self) -> f64 {
        match self {
            Self::Buy => 1.0,
            Self::Sell => -1.0,
        }
    }
}

impl fmt::Display for TradeDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Buy => "BUY",
            Self::Sell => "SELL",
        })
    }
}

/// How the entry is executed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ExecutionType {
    Market,
    BuyLimit,
    SellLimit,
    BuyStop,
    SellStop,
}

impl ExecutionType {
    /// Resting limit order for the given direction.
    pub fn limit(direction: TradeDirection) -> Self {
        match direction {
            TradeDirection::Buy => Self::BuyLimit,
            TradeDirection::Sell => Self::SellLimit,
        }
    }

    /// Resting stop (breakout confirmation) order for the given direction.
    pub fn stop(direction: TradeDirection) -> Self {
        match direction {
            TradeDirection::Buy => Self::BuyStop,
            TradeDirection::Sell => Self::SellStop,
        }
    }

    pub fn is_pending(self) -> bool {
        !matches!(self, Self::Market)
    }
}

impl fmt::Display for ExecutionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Market => "Market Execution",
            Self::BuyLimit => "Buy Limit",
            Self::SellLimit => "Sell Limit",
            Self::BuyStop => "Buy Stop",
            Self::SellStop => "Sell Stop",
        })
    }
}

/// Fully priced trade setup.
///
/// Buys satisfy `stop_loss < entry < tp1 < tp2 < tp3`; sells invert every inequality.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeSetup {
    pub direction: TradeDirection,
    pub execution_type: ExecutionType,
    pub entry: f64,
    pub stop_loss: f64,
    pub tp1: f64,
    pub tp2: f64,
    pub tp3: f64,
    /// Reward to tp2 per unit of risk, rounded to 2 decimals.
    pub rr_ratio: f64,
}

impl TradeSetup {
    /// Distance from entry to stop (always positive for a well-formed setup).
    pub fn risk(&self) -> f64 {
        (self.entry - self.stop_loss) * self.direction.sign()
    }

    /// Distance from entry to tp2.
    pub fn reward(&self) -> f64 {
        (self.tp2 - self.entry) * self.direction.sign()
    }

    /// Checks the strict price-ladder ordering for the setup's direction.
    pub fn is_ordered(&self) -> bool {
        let s = self.direction.sign();
        let ladder = [self.stop_loss, self.entry, self.tp1, self.tp2, self.tp3];
        ladder.windows(2).all(|w| (w[1] - w[0]) * s > 0.0)
    }
}

/// Round to 2 decimal places.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn buy_setup() -> TradeSetup {
        TradeSetup {
            direction: TradeDirection::Buy,
            execution_type: ExecutionType::Market,
            entry: 45_000.0,
            stop_loss: 44_325.0,
            tp1: 45_900.0,
            tp2: 46_575.0,
            tp3: 47_250.0,
            rr_ratio: 2.33,
        }
    }

    #[test]
    fn buy_ladder_is_ordered() {
        let setup = buy_setup();
        assert!(setup.is_ordered());
        assert_eq!(setup.risk(), 675.0);
        assert_eq!(setup.reward(), 1575.0);
    }

    #[test]
    fn sell_ladder_is_ordered() {
        let setup = TradeSetup {
            direction: TradeDirection::Sell,
            execution_type: ExecutionType::SellLimit,
            entry: 100.0,
            stop_loss: 101.5,
            tp1: 98.0,
            tp2: 96.5,
            tp3: 95.0,
            rr_ratio: 2.33,
        };
        assert!(setup.is_ordered());
        assert_eq!(setup.risk(), 1.5);
    }

    #[test]
    fn inverted_ladder_is_rejected() {
        let mut setup = buy_setup();
        setup.direction = TradeDirection::Sell;
        assert!(!setup.is_ordered());
    }

    #[test]
    fn execution_type_helpers() {
        assert_eq!(ExecutionType::limit(TradeDirection::Sell), ExecutionType::SellLimit);
        assert_eq!(ExecutionType::stop(TradeDirection::Buy), ExecutionType::BuyStop);
        assert!(!ExecutionType::Market.is_pending());
        assert_eq!(ExecutionType::Market.to_string(), "Market Execution");
    }

    #[test]
    fn round2_rounds_half_away() {
        assert_eq!(round2(1575.0 / 675.0), 2.33);
        assert_eq!(round2(2.335_000_1), 2.34);
    }
}
