//! PullScan Core — domain types, synthetic series, indicators, classifiers, trade setups.
//!
//! This crate contains the per-instrument building blocks of a pullback scan:
//! - Domain types (instruments, candles, classifications, setups, signals)
//! - Deterministic RNG hierarchy for reproducible scans
//! - EMA and ATR indicators
//! - Synthetic series generator (biased random walk)
//! - Pluggable trend/pullback classifiers
//! - Setup builder (execution style, stop, targets, risk/reward)

pub mod classify;
pub mod domain;
pub mod indicators;
pub mod rng;
pub mod series;
pub mod setup_builder;

pub use classify::{create_classifier, ClassifierConfig, ClassifierKind, PullbackClassifier};
pub use rng::RngHierarchy;
pub use series::{SeriesConfig, SeriesError, SeriesGenerator};
pub use setup_builder::{BuiltSetup, SetupBuilder, SetupConfig, SetupError};
