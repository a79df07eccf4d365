// =============================================================================
// Signal Engine — composite buy/sell signal scoring
// =============================================================================
//
// The scoring core (`indicators`, `signals`, `engine`) is synchronous and
// pure. `market_data`, `scan`, `runtime_config`, `app_state` and `api` form
// the host around it.
// =============================================================================

pub mod api;
pub mod app_state;
pub mod engine;
pub mod indicators;
pub mod market_data;
pub mod runtime_config;
pub mod scan;
pub mod scoring_config;
pub mod signals;
pub mod types;

pub use engine::{evaluate_series, evaluate_signals, SeriesSignals};
pub use market_data::{Candle, DatasetStore, MarketDataSource, MoneyFlowPoint, SeriesKey};
pub use scan::{run_scan, ScanLimits, ScanReport, ScanRequest};
pub use scoring_config::{ScoringConfig, ScoringWeights};
pub use types::{Direction, KeyLevel, KeyLevelKind, Signal};
