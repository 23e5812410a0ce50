//! Scanner — fan signal assembly out over a universe and rank the results.
//!
//! Every instrument gets its own RNG stream derived from the master seed and
//! its symbol, so results do not depend on iteration order or thread count:
//! a parallel scan and a sequential scan with the same seed agree exactly.
//!
//! Ranking is a stable sort on confidence, highest first. Instruments with
//! equal confidence keep their input order.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use pullscan_core::domain::{Instrument, Signal, TradeDirection};
use pullscan_core::RngHierarchy;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::assembler::SignalAssembler;
use crate::config::ScanConfig;

/// Aggregate counts over one scan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanSummary {
    pub total: usize,
    pub valid: usize,
    pub buys: usize,
    pub sells: usize,
    /// Mean confidence over valid signals; `None` when nothing is tradable.
    pub mean_confidence: Option<f64>,
    /// Master seed that reproduces the scan.
    pub master_seed: u64,
}

impl ScanSummary {
    pub fn from_signals(signals: &[Signal], master_seed: u64) -> Self {
        let valid: Vec<&Signal> = signals.iter().filter(|s| s.is_valid()).collect();
        let buys = valid
            .iter()
            .filter(|s| s.setup.as_ref().map(|t| t.direction) == Some(TradeDirection::Buy))
            .count();
        let mean_confidence = if valid.is_empty() {
            None
        } else {
            let sum: u32 = valid.iter().map(|s| u32::from(s.confidence)).sum();
            Some(f64::from(sum) / valid.len() as f64)
        };
        Self {
            total: signals.len(),
            valid: valid.len(),
            buys,
            sells: valid.len() - buys,
            mean_confidence,
            master_seed,
        }
    }
}

/// Ranked output of one scan plus what is needed to replay it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanReport {
    pub generated_at: DateTime<Utc>,
    pub classifier: String,
    pub summary: ScanSummary,
    pub signals: Vec<Signal>,
}

impl ScanReport {
    /// Signals with a trade setup, in rank order.
    pub fn valid_signals(&self) -> impl Iterator<Item = &Signal> {
        self.signals.iter().filter(|s| s.is_valid())
    }

    /// Keep the `n` highest-ranked signals.
    pub fn top(&mut self, n: usize) {
        self.signals.truncate(n);
    }

    /// Drop signals without a setup.
    pub fn retain_valid(&mut self) {
        self.signals.retain(Signal::is_valid);
    }
}

pub struct Scanner {
    assembler: SignalAssembler,
    seed: Option<u64>,
    parallel: bool,
}

impl Scanner {
    pub fn new(config: &ScanConfig) -> Self {
        Self {
            assembler: SignalAssembler::new(config),
            seed: config.seed,
            parallel: config.parallel,
        }
    }

    /// Scanner around a prepared assembler. Draws a fresh seed per scan and
    /// runs in parallel until told otherwise.
    pub fn from_assembler(assembler: SignalAssembler) -> Self {
        Self {
            assembler,
            seed: None,
            parallel: true,
        }
    }

    /// Fix the master seed so repeated scans reproduce.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Enables or disables parallel execution.
    pub fn with_parallelism(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Scan `instruments` now and return the ranked signals.
    pub fn scan(&self, instruments: &[Instrument]) -> Vec<Signal> {
        self.scan_with_summary(instruments).signals
    }

    /// Scan `instruments` now and return signals with summary and seed.
    pub fn scan_with_summary(&self, instruments: &[Instrument]) -> ScanReport {
        let hierarchy = match self.seed {
            Some(seed) => RngHierarchy::new(seed),
            None => RngHierarchy::from_entropy(),
        };
        self.scan_at(instruments, &hierarchy, Utc::now())
    }

    /// Scan with an explicit RNG hierarchy and generation time.
    ///
    /// Identical inputs give identical reports.
    pub fn scan_at(
        &self,
        instruments: &[Instrument],
        hierarchy: &RngHierarchy,
        generated_at: DateTime<Utc>,
    ) -> ScanReport {
        warn_on_duplicates(instruments);

        let assemble = |instrument: &Instrument| {
            let mut rng = hierarchy.rng_for(&instrument.symbol, 0);
            self.assembler.assemble(instrument, &mut rng, generated_at)
        };
        let mut signals: Vec<Signal> = if self.parallel {
            instruments.par_iter().map(assemble).collect()
        } else {
            instruments.iter().map(assemble).collect()
        };

        // Stable: ties keep input order.
        signals.sort_by(|a, b| b.confidence.cmp(&a.confidence));

        let summary = ScanSummary::from_signals(&signals, hierarchy.master_seed());
        info!(
            seed = hierarchy.master_seed(),
            classifier = self.assembler.classifier_name(),
            total = summary.total,
            valid = summary.valid,
            buys = summary.buys,
            sells = summary.sells,
            "scan complete"
        );

        ScanReport {
            generated_at,
            classifier: self.assembler.classifier_name().to_string(),
            summary,
            signals,
        }
    }
}

fn warn_on_duplicates(instruments: &[Instrument]) {
    let mut seen = HashSet::new();
    for inst in instruments {
        if !seen.insert(inst.symbol.as_str()) {
            warn!(symbol = %inst.symbol, "duplicate symbol in universe; signals will share an id");
        }
    }
}
