//! Signal — the immutable per-instrument scan result.

use chrono::{DateTime, Utc};
use serde::ser::SerializeStruct;
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;

use super::{Candle, Classification, Instrument, PullbackType, TradeSetup, TrendDirection};

/// Signal identifier: `<symbol>-<generation time in epoch millis>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SignalId(pub String);

impl SignalId {
    pub fn new(symbol: &str, generated_at: DateTime<Utc>) -> Self {
        Self(format!("{symbol}-{}", generated_at.timestamp_millis()))
    }
}

impl fmt::Display for SignalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One scored pullback candidate.
///
/// Validity is not stored separately: a signal is valid exactly when it
/// carries a trade setup, so the two can never disagree. The serialized form
/// adds a derived `is_valid` field, which is ignored on the way back in.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Signal {
    pub id: SignalId,
    pub instrument: Instrument,
    pub timestamp: DateTime<Utc>,
    pub trend_direction: TrendDirection,
    pub trend_strength: u8,
    pub pullback_type: PullbackType,
    pub pullback_quality: u8,
    pub setup: Option<TradeSetup>,
    pub confidence: u8,
    pub reasoning: Vec<String>,
    pub candles: Vec<Candle>,
}

impl Signal {
    /// Signal with a priced setup. Confidence comes from the verdict.
    pub fn valid(
        instrument: Instrument,
        generated_at: DateTime<Utc>,
        verdict: Classification,
        setup: TradeSetup,
        confidence: u8,
        reasoning: Vec<String>,
        candles: Vec<Candle>,
    ) -> Self {
        Self::build(instrument, generated_at, verdict, Some(setup), confidence, reasoning, candles)
    }

    /// Signal without a setup; confidence is always 0.
    pub fn invalid(
        instrument: Instrument,
        generated_at: DateTime<Utc>,
        verdict: Classification,
        reasoning: Vec<String>,
        candles: Vec<Candle>,
    ) -> Self {
        Self::build(instrument, generated_at, verdict, None, 0, reasoning, candles)
    }

    fn build(
        instrument: Instrument,
        generated_at: DateTime<Utc>,
        verdict: Classification,
        setup: Option<TradeSetup>,
        confidence: u8,
        reasoning: Vec<String>,
        candles: Vec<Candle>,
    ) -> Self {
        Self {
            id: SignalId::new(&instrument.symbol, generated_at),
            instrument,
            timestamp: generated_at,
            trend_direction: verdict.trend_direction,
            trend_strength: verdict.trend_strength,
            pullback_type: verdict.pullback_type,
            pullback_quality: verdict.pullback_quality,
            setup,
            confidence,
            reasoning,
            candles,
        }
    }

    pub fn is_valid(&self) -> bool {
        self.setup.is_some()
    }

    /// Close of the most recent candle, if the series is non-empty.
    pub fn last_close(&self) -> Option<f64> {
        self.candles.last().map(|c| c.close)
    }
}

impl Serialize for Signal {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut st = serializer.serialize_struct("Signal", 12)?;
        st.serialize_field("id", &self.id)?;
        st.serialize_field("instrument", &self.instrument)?;
        st.serialize_field("timestamp", &self.timestamp)?;
        st.serialize_field("trend_direction", &self.trend_direction)?;
        st.serialize_field("trend_strength", &self.trend_strength)?;
        st.serialize_field("pullback_type", &self.pullback_type)?;
        st.serialize_field("pullback_quality", &self.pullback_quality)?;
        st.serialize_field("is_valid", &self.is_valid())?;
        st.serialize_field("setup", &self.setup)?;
        st.serialize_field("confidence", &self.confidence)?;
        st.serialize_field("reasoning", &self.reasoning)?;
        st.serialize_field("candles", &self.candles)?;
        st.end()
    }
}
