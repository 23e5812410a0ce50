//! Domain types for PullScan

pub mod candle;
pub mod instrument;
pub mod setup;
pub mod signal;
pub mod trend;

pub use candle::Candle;
pub use instrument::{AssetClass, Instrument};
pub use setup::{round2, ExecutionType, TradeDirection, TradeSetup};
pub use signal::{Signal, SignalId};
pub use trend::{Classification, PullbackType, TrendDirection};
