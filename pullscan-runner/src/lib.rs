//! PullScan Runner — scan orchestration over an instrument universe.
//!
//! This crate builds on `pullscan-core` to provide:
//! - Serializable scan configuration (TOML)
//! - Default instrument catalog and TOML universes
//! - Per-instrument signal assembly
//! - Parallel, seed-reproducible scanning with confidence ranking
//! - JSON and CSV export

pub mod assembler;
pub mod catalog;
pub mod config;
pub mod export;
pub mod scanner;

pub use assembler::SignalAssembler;
pub use catalog::Catalog;
pub use config::{BasePrices, ConfigError, ScanConfig};
pub use export::{export_csv, export_json, import_json, write_csv, write_json};
pub use scanner::{ScanReport, ScanSummary, Scanner};
