pub mod candle;
pub mod loader;
pub mod store;

use anyhow::Result;

use crate::types::KeyLevel;

// Re-export the data types for convenient access (e.g. `use crate::market_data::Candle`).
pub use candle::{normalize_candles, Candle, MoneyFlowPoint};
pub use loader::load_dataset_dir;
pub use store::{DatasetStore, MarketDataset, SeriesKey};

/// Supplier of the three input series the scorer consumes.
///
/// Implementations may be backed by a database, a remote quote service or
/// the in-memory [`DatasetStore`]. Candles must be returned oldest first.
pub trait MarketDataSource: Send + Sync {
    /// The most recent `bars` candles for `key`.
    fn candles(&self, key: &SeriesKey, bars: usize) -> Result<Vec<Candle>>;

    /// Support/resistance annotations, in priority order.
    fn key_levels(&self, key: &SeriesKey) -> Result<Vec<KeyLevel>>;

    /// Per-bar main-fund net flow at the candle granularity.
    fn money_flow(&self, key: &SeriesKey) -> Result<Vec<MoneyFlowPoint>>;

    /// Every series this source can serve.
    fn keys(&self) -> Vec<SeriesKey>;
}
