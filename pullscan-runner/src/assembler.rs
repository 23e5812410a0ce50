//! Signal assembly — one instrument in, one `Signal` out.
//!
//! Per instrument the assembler:
//! 1. draws the regime trend
//! 2. generates the synthetic series at the asset class's base price
//! 3. classifies trend and pullback
//! 4. for valid verdicts, prices a setup off the last close
//!
//! Assembly is total. Series or setup failures become invalid signals with
//! an explanatory reasoning line instead of errors, so one bad instrument
//! never aborts a scan.

use chrono::{DateTime, Utc};
use pullscan_core::domain::{Classification, Instrument, Signal, TradeDirection, TrendDirection};
use pullscan_core::{
    create_classifier, ClassifierConfig, PullbackClassifier, SeriesGenerator, SetupBuilder,
};
use rand::RngCore;
use tracing::{debug, warn};

use crate::config::{BasePrices, ScanConfig};

pub struct SignalAssembler {
    generator: SeriesGenerator,
    classifier: Box<dyn PullbackClassifier>,
    setup_builder: SetupBuilder,
    base_prices: BasePrices,
    regime: ClassifierConfig,
}

impl SignalAssembler {
    /// Assembler using the classifier named in `config`.
    pub fn new(config: &ScanConfig) -> Self {
        Self::with_classifier(config, create_classifier(&config.classifier))
    }

    /// Assembler with an explicit classifier. Regime cut-offs and the minimum
    /// trend strength still come from `config.classifier`.
    pub fn with_classifier(config: &ScanConfig, classifier: Box<dyn PullbackClassifier>) -> Self {
        Self {
            generator: SeriesGenerator::new(config.series.clone()),
            classifier,
            setup_builder: SetupBuilder::new(config.setup.clone()),
            base_prices: config.base_prices.clone(),
            regime: config.classifier.clone(),
        }
    }

    pub fn classifier_name(&self) -> &str {
        self.classifier.name()
    }

    /// Build the signal for `instrument`, drawing all randomness from `rng`.
    pub fn assemble(
        &self,
        instrument: &Instrument,
        rng: &mut dyn RngCore,
        generated_at: DateTime<Utc>,
    ) -> Signal {
        let regime = self.regime.draw_regime(rng);
        let base_price = self.base_prices.for_class(instrument.asset_class);
        let count = self.generator.config().candle_count;

        let candles = match self
            .generator
            .generate(base_price, count, regime, generated_at, &mut *rng)
        {
            Ok(candles) => candles,
            Err(err) => {
                warn!(symbol = %instrument.symbol, error = %err, "series generation failed");
                return Signal::invalid(
                    instrument.clone(),
                    generated_at,
                    Classification::neutral(0),
                    vec![format!("No price series available: {err}.")],
                    Vec::new(),
                );
            }
        };

        let verdict = self.classifier.classify(&candles, regime, rng);
        let min_strength = self.regime.min_trend_strength;
        debug!(
            symbol = %instrument.symbol,
            %regime,
            trend = %verdict.trend_direction,
            strength = verdict.trend_strength,
            pullback = %verdict.pullback_type,
            quality = verdict.pullback_quality,
            "classified"
        );

        let direction = match verdict.trend_direction.trade_direction() {
            Some(direction) if verdict.is_valid(min_strength) => direction,
            _ => {
                let reason = rejection_reason(&verdict);
                return Signal::invalid(instrument.clone(), generated_at, verdict, vec![reason], candles);
            }
        };

        let current_price = candles.last().map_or(base_price, |c| c.close);
        let atr = self.setup_builder.atr_for(current_price);
        match self.setup_builder.build(direction, current_price, atr, rng) {
            Ok(built) => {
                let mut reasoning = trend_reasoning(&verdict, direction);
                reasoning.extend(built.notes);
                Signal::valid(
                    instrument.clone(),
                    generated_at,
                    verdict,
                    built.setup,
                    verdict.confidence(min_strength),
                    reasoning,
                    candles,
                )
            }
            Err(err) => {
                warn!(symbol = %instrument.symbol, error = %err, "setup rejected");
                Signal::invalid(
                    instrument.clone(),
                    generated_at,
                    verdict,
                    vec![format!("Setup rejected: {err}.")],
                    candles,
                )
            }
        }
    }
}

fn trend_reasoning(verdict: &Classification, direction: TradeDirection) -> Vec<String> {
    let extremes = match direction {
        TradeDirection::Buy => "highs",
        TradeDirection::Sell => "lows",
    };
    vec![
        format!(
            "Higher Timeframe (4H) is in a clear {} trend.",
            verdict.trend_direction
        ),
        format!(
            "Trend Strength Score: {}/10. Higher {extremes} observed.",
            verdict.trend_strength
        ),
        format!(
            "Price has pulled back to {}, offering a value entry.",
            verdict.pullback_type
        ),
    ]
}

/// Directional verdicts below the strength threshold read as "no tradable pullback".
fn rejection_reason(verdict: &Classification) -> String {
    if verdict.trend_direction == TrendDirection::Neutral {
        "Market is ranging/choppy. No valid trend identified.".to_string()
    } else {
        "Trend exists, but no valid pullback to value area detected yet.".to_string()
    }
}
