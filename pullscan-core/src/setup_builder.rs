//! Trade setup construction.
//!
//! # Price ladder
//! ```text
//! atr       = atr_pct * current_price
//! stop_loss = entry - sign * 1.5 * atr
//! tp1       = entry + sign * 2.0 * atr
//! tp2       = entry + sign * 3.5 * atr
//! tp3       = entry + sign * 5.0 * atr
//! rr_ratio  = round2(|tp2 - entry| / |entry - stop_loss|)
//! ```
//! `sign` is +1 for buys and -1 for sells.
//!
//! # Execution style
//! A uniform draw picks the entry:
//! - draw > `limit_above`: resting limit `entry_offset_pct` better than price
//! - draw < `stop_below`: resting stop `entry_offset_pct` worse than price
//! - otherwise: market at current price

use rand::{Rng, RngCore};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::{round2, ExecutionType, TradeDirection, TradeSetup};
use crate::indicators::atr_proxy;

#[derive(Debug, Error, PartialEq)]
pub enum SetupError {
    #[error("current price must be positive and finite, got {0}")]
    InvalidPrice(f64),

    #[error("degenerate risk: entry {entry} and stop {stop_loss} leave no risk distance")]
    DegenerateRisk { entry: f64, stop_loss: f64 },

    #[error("target ladder is not strictly ordered for a {0} setup")]
    UnorderedLadder(TradeDirection),
}

/// Setup geometry and execution-band cut-offs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SetupConfig {
    /// ATR proxy as a fraction of current price.
    pub atr_pct: f64,
    /// Limit/stop entry offset as a fraction of current price.
    pub entry_offset_pct: f64,
    /// Execution draw above this → limit order.
    pub limit_above: f64,
    /// Execution draw below this → stop order.
    pub stop_below: f64,
    pub stop_atr: f64,
    pub tp1_atr: f64,
    pub tp2_atr: f64,
    pub tp3_atr: f64,
    /// Risk distances at or below this fraction of entry count as zero.
    pub min_risk_fraction: f64,
}

impl Default for SetupConfig {
    fn default() -> Self {
        Self {
            atr_pct: 0.01,
            entry_offset_pct: 0.002,
            limit_above: 0.6,
            stop_below: 0.2,
            stop_atr: 1.5,
            tp1_atr: 2.0,
            tp2_atr: 3.5,
            tp3_atr: 5.0,
            min_risk_fraction: 1e-9,
        }
    }
}

/// A priced setup plus the reasoning lines describing it.
#[derive(Debug, Clone, PartialEq)]
pub struct BuiltSetup {
    pub setup: TradeSetup,
    pub notes: Vec<String>,
}

#[derive(Debug, Clone, Default)]
pub struct SetupBuilder {
    config: SetupConfig,
}

impl SetupBuilder {
    pub fn new(config: SetupConfig) -> Self {
        Self { config }
    }

    /// ATR proxy for a given price.
    pub fn atr_for(&self, current_price: f64) -> f64 {
        atr_proxy(current_price, self.config.atr_pct)
    }

    /// Build a setup, drawing the execution style from `rng`.
    pub fn build(
        &self,
        direction: TradeDirection,
        current_price: f64,
        atr: f64,
        rng: &mut dyn RngCore,
    ) -> Result<BuiltSetup, SetupError> {
        let draw: f64 = rng.gen();
        self.build_with_draw(direction, current_price, atr, draw)
    }

    /// Build a setup for an explicit execution draw in [0, 1).
    pub fn build_with_draw(
        &self,
        direction: TradeDirection,
        current_price: f64,
        atr: f64,
        draw: f64,
    ) -> Result<BuiltSetup, SetupError> {
        if !(current_price.is_finite() && current_price > 0.0) {
            return Err(SetupError::InvalidPrice(current_price));
        }

        let c = &self.config;
        let sign = direction.sign();
        let (execution_type, entry) = if draw > c.limit_above {
            (
                ExecutionType::limit(direction),
                current_price * (1.0 - sign * c.entry_offset_pct),
            )
        } else if draw < c.stop_below {
            (
                ExecutionType::stop(direction),
                current_price * (1.0 + sign * c.entry_offset_pct),
            )
        } else {
            (ExecutionType::Market, current_price)
        };

        let mut setup = TradeSetup {
            direction,
            execution_type,
            entry,
            stop_loss: entry - sign * c.stop_atr * atr,
            tp1: entry + sign * c.tp1_atr * atr,
            tp2: entry + sign * c.tp2_atr * atr,
            tp3: entry + sign * c.tp3_atr * atr,
            rr_ratio: 0.0,
        };
        let risk = setup.risk();
        if !risk.is_finite() || risk <= entry.abs() * c.min_risk_fraction {
            return Err(SetupError::DegenerateRisk {
                entry,
                stop_loss: setup.stop_loss,
            });
        }
        setup.rr_ratio = round2(setup.reward() / risk);
        if !setup.is_ordered() {
            return Err(SetupError::UnorderedLadder(direction));
        }

        let notes = vec![
            execution_note(execution_type, direction).to_string(),
            format!(
                "Stop {:.1} ATR from entry; TP2 offers {:.2}R.",
                c.stop_atr, setup.rr_ratio
            ),
        ];
        Ok(BuiltSetup { setup, notes })
    }
}

fn execution_note(execution_type: ExecutionType, direction: TradeDirection) -> &'static str {
    match (execution_type, direction) {
        (ExecutionType::BuyLimit, _) => "Pending Buy Limit placed at precise support level.",
        (ExecutionType::BuyStop, _) => {
            "Buy Stop set above recent consolidation high for confirmation."
        }
        (ExecutionType::SellLimit, _) => "Pending Sell Limit placed at resistance test.",
        (ExecutionType::SellStop, _) => "Sell Stop set below recent consolidation low.",
        (ExecutionType::Market, TradeDirection::Buy) => {
            "Bullish candlestick rejection detected. Instant execution valid."
        }
        (ExecutionType::Market, TradeDirection::Sell) => {
            "Bearish momentum shift confirmed. Instant execution valid."
        }
    }
}
