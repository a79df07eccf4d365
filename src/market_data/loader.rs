// =============================================================================
// Dataset Loader: seed the store from a directory of JSON documents
// =============================================================================
//
// Layout: `<dir>/<SYMBOL>@<PERIOD>.json`, each file a `MarketDataset`.
// A file stem without `@` is stored under `default_period`.
// =============================================================================

use std::path::Path;

use anyhow::{Context, Result};
use tracing::{info, warn};

use super::{DatasetStore, MarketDataset, SeriesKey};

/// Load every `*.json` dataset under `dir` into `store`.
///
/// Returns how many datasets were stored. Unreadable or malformed files are
/// logged and skipped so one bad export does not block the rest.
pub fn load_dataset_dir(
    dir: impl AsRef<Path>,
    default_period: &str,
    store: &DatasetStore,
) -> Result<usize> {
    let dir = dir.as_ref();
    let entries = std::fs::read_dir(dir)
        .with_context(|| format!("failed to read dataset dir {}", dir.display()))?;

    let mut loaded = 0;
    for entry in entries {
        let path = match entry {
            Ok(e) => e.path(),
            Err(e) => {
                warn!(error = %e, "skipping unreadable dir entry");
                continue;
            }
        };
        if path.extension().and_then(|e| e.to_str()) != Some("json") {
            continue;
        }
        let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
            continue;
        };
        let key = match stem.split_once('@') {
            Some((symbol, period)) => SeriesKey::new(symbol, period),
            None => SeriesKey::new(stem, default_period),
        };

        match read_dataset(&path) {
            Ok(dataset) => {
                store.insert(key, dataset);
                loaded += 1;
            }
            Err(e) => warn!(path = %path.display(), error = %e, "skipping dataset file"),
        }
    }

    info!(dir = %dir.display(), loaded, "datasets loaded");
    Ok(loaded)
}

fn read_dataset(path: &Path) -> Result<MarketDataset> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("failed to parse {}", path.display()))
}
