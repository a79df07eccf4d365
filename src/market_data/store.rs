use std::collections::HashMap;

use anyhow::{anyhow, Result};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{normalize_candles, Candle, MarketDataSource, MoneyFlowPoint};
use crate::types::KeyLevel;

// ---------------------------------------------------------------------------
// Keys & datasets
// ---------------------------------------------------------------------------

/// Composite key that identifies one instrument series at one bar period.
#[derive(Debug, Clone, Hash, Eq, PartialEq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SeriesKey {
    pub symbol: String,
    pub period: String,
}

impl SeriesKey {
    pub fn new(symbol: impl Into<String>, period: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            period: period.into(),
        }
    }
}

impl std::fmt::Display for SeriesKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}@{}", self.symbol, self.period)
    }
}

/// Everything the scorer needs for one series.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MarketDataset {
    #[serde(default)]
    pub candles: Vec<Candle>,
    #[serde(default)]
    pub key_levels: Vec<KeyLevel>,
    #[serde(default)]
    pub money_flow: Vec<MoneyFlowPoint>,
}

// ---------------------------------------------------------------------------
// DatasetStore -- thread-safe map of series
// ---------------------------------------------------------------------------

/// Thread-safe in-memory supplier of candles, key levels and money flow.
///
/// Candles are normalised on insert so readers always see an ascending,
/// duplicate-free series.
pub struct DatasetStore {
    datasets: RwLock<HashMap<SeriesKey, MarketDataset>>,
}

impl DatasetStore {
    pub fn new() -> Self {
        Self {
            datasets: RwLock::new(HashMap::new()),
        }
    }

    /// Insert or replace the dataset for `key`.
    pub fn insert(&self, key: SeriesKey, mut dataset: MarketDataset) {
        dataset.candles = normalize_candles(dataset.candles);
        debug!(
            series = %key,
            candles = dataset.candles.len(),
            key_levels = dataset.key_levels.len(),
            money_flow = dataset.money_flow.len(),
            "dataset stored"
        );
        self.datasets.write().insert(key, dataset);
    }

    /// Remove a dataset, returning whether it existed.
    pub fn remove(&self, key: &SeriesKey) -> bool {
        self.datasets.write().remove(key).is_some()
    }

    pub fn get(&self, key: &SeriesKey) -> Option<MarketDataset> {
        self.datasets.read().get(key).cloned()
    }

    pub fn len(&self) -> usize {
        self.datasets.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.datasets.read().is_empty()
    }
}

impl Default for DatasetStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MarketDataSource for DatasetStore {
    fn candles(&self, key: &SeriesKey, bars: usize) -> Result<Vec<Candle>> {
        let map = self.datasets.read();
        let dataset = map
            .get(key)
            .ok_or_else(|| anyhow!("no candles stored for {key}"))?;
        let start = dataset.candles.len().saturating_sub(bars);
        Ok(dataset.candles[start..].to_vec())
    }

    fn key_levels(&self, key: &SeriesKey) -> Result<Vec<KeyLevel>> {
        Ok(self
            .datasets
            .read()
            .get(key)
            .map(|d| d.key_levels.clone())
            .unwrap_or_default())
    }

    fn money_flow(&self, key: &SeriesKey) -> Result<Vec<MoneyFlowPoint>> {
        Ok(self
            .datasets
            .read()
            .get(key)
            .map(|d| d.money_flow.clone())
            .unwrap_or_default())
    }

    fn keys(&self) -> Vec<SeriesKey> {
        let mut keys: Vec<SeriesKey> = self.datasets.read().keys().cloned().collect();
        keys.sort();
        keys
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dataset(n: usize) -> MarketDataset {
        MarketDataset {
            candles: (0..n)
                .map(|i| Candle::flat(format!("2024-01-{:02}", i + 1), 10.0, 100.0))
                .collect(),
            key_levels: vec![KeyLevel::resistance(11.0, "R1")],
            money_flow: Vec::new(),
        }
    }

    #[test]
    fn candles_returns_most_recent_bars() {
        let store = DatasetStore::new();
        let key = SeriesKey::new("600000", "1d");
        store.insert(key.clone(), dataset(10));

        let candles = store.candles(&key, 3).unwrap();
        assert_eq!(candles.len(), 3);
        assert_eq!(candles[0].time, "2024-01-08");
        assert_eq!(candles[2].time, "2024-01-10");

        // Asking for more than stored returns everything.
        assert_eq!(store.candles(&key, 500).unwrap().len(), 10);
    }

    #[test]
    fn unknown_key_errors_for_candles_but_not_levels() {
        let store = DatasetStore::new();
        let key = SeriesKey::new("missing", "1d");
        assert!(store.candles(&key, 10).is_err());
        assert!(store.key_levels(&key).unwrap().is_empty());
        assert!(store.money_flow(&key).unwrap().is_empty());
    }

    #[test]
    fn insert_normalises_candle_order() {
        let store = DatasetStore::new();
        let key = SeriesKey::new("000001", "1d");
        let mut ds = dataset(3);
        ds.candles.reverse();
        store.insert(key.clone(), ds);
        let stored = store.get(&key).unwrap();
        assert_eq!(stored.candles[0].time, "2024-01-01");
    }

    #[test]
    fn keys_are_sorted_and_remove_works() {
        let store = DatasetStore::new();
        store.insert(SeriesKey::new("b", "1d"), dataset(1));
        store.insert(SeriesKey::new("a", "1d"), dataset(1));
        let keys = store.keys();
        assert_eq!(keys[0].symbol, "a");
        assert_eq!(keys[1].symbol, "b");

        assert!(store.remove(&SeriesKey::new("a", "1d")));
        assert!(!store.remove(&SeriesKey::new("a", "1d")));
        assert_eq!(store.len(), 1);
    }
}
