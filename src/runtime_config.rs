// =============================================================================
// Runtime Configuration — host settings with atomic save
// =============================================================================
//
// Everything the host process needs besides the market data itself: where
// to listen, where to seed datasets from, scan limits, and the scoring
// config used when a request does not bring its own.
//
// Persistence uses an atomic tmp + rename pattern to prevent corruption on
// crash. All fields carry `#[serde(default)]` so that adding new fields
// never breaks loading an older config file.
// =============================================================================

use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::scan::ScanLimits;
use crate::scoring_config::ScoringConfig;

// =============================================================================
// Default-value helpers (required by serde `default = "..."` attribute)
// =============================================================================

fn default_bind_addr() -> String {
    "0.0.0.0:3001".to_string()
}

fn default_period() -> String {
    "1d".to_string()
}

fn default_scan_bars() -> usize {
    250
}

fn default_scan_concurrency() -> usize {
    8
}

fn default_scan_timeout_secs() -> u64 {
    30
}

// =============================================================================
// RuntimeConfig
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuntimeConfig {
    /// Address the REST API binds to.
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    /// Directory of `<SYMBOL>@<PERIOD>.json` datasets loaded at startup.
    #[serde(default)]
    pub data_dir: Option<String>,

    /// Bar period assumed when a request or file name omits one.
    #[serde(default = "default_period")]
    pub default_period: String,

    /// Candles fetched per symbol for evaluation.
    #[serde(default = "default_scan_bars")]
    pub scan_bars: usize,

    /// Maximum symbols evaluated at once during a market scan.
    #[serde(default = "default_scan_concurrency")]
    pub scan_concurrency: usize,

    /// Wall-clock budget for a whole market scan.
    #[serde(default = "default_scan_timeout_secs")]
    pub scan_timeout_secs: u64,

    #[serde(default)]
    pub scoring: ScoringConfig,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            data_dir: None,
            default_period: default_period(),
            scan_bars: default_scan_bars(),
            scan_concurrency: default_scan_concurrency(),
            scan_timeout_secs: default_scan_timeout_secs(),
            scoring: ScoringConfig::default(),
        }
    }
}

impl RuntimeConfig {
    /// Load configuration from a JSON file at `path`.
    ///
    /// If the file does not exist, returns an error so the caller can fall
    /// back to defaults with a warning.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read runtime config from {}", path.display()))?;

        let config: Self = serde_json::from_str(&content)
            .with_context(|| format!("failed to parse runtime config from {}", path.display()))?;

        config
            .scoring
            .validate()
            .with_context(|| format!("invalid scoring config in {}", path.display()))?;

        info!(
            path = %path.display(),
            bind_addr = %config.bind_addr,
            break_pct = config.scoring.break_pct,
            "runtime config loaded"
        );

        Ok(config)
    }

    /// Persist the current configuration to `path` using an atomic write
    /// (write to `.tmp`, then rename).
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();

        let content = serde_json::to_string_pretty(self)
            .context("failed to serialise runtime config to JSON")?;

        let tmp_path = path.with_extension("json.tmp");

        std::fs::write(&tmp_path, &content)
            .with_context(|| format!("failed to write tmp config to {}", tmp_path.display()))?;

        std::fs::rename(&tmp_path, path)
            .with_context(|| format!("failed to rename tmp config to {}", path.display()))?;

        info!(path = %path.display(), "runtime config saved (atomic)");
        Ok(())
    }

    /// Apply `SIGNAL_ENGINE_*` environment overrides.
    pub fn apply_env(&mut self) {
        if let Ok(addr) = std::env::var("SIGNAL_ENGINE_BIND_ADDR") {
            if !addr.trim().is_empty() {
                self.bind_addr = addr.trim().to_string();
            }
        }
        if let Ok(dir) = std::env::var("SIGNAL_ENGINE_DATA_DIR") {
            if !dir.trim().is_empty() {
                self.data_dir = Some(dir.trim().to_string());
            }
        }
    }

    pub fn scan_limits(&self) -> ScanLimits {
        ScanLimits {
            concurrency: self.scan_concurrency.max(1),
            timeout: Duration::from_secs(self.scan_timeout_secs),
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_has_expected_values() {
        let cfg = RuntimeConfig::default();
        assert_eq!(cfg.bind_addr, "0.0.0.0:3001");
        assert_eq!(cfg.default_period, "1d");
        assert_eq!(cfg.scan_bars, 250);
        assert_eq!(cfg.scan_concurrency, 8);
        assert!(cfg.data_dir.is_none());
        assert_eq!(cfg.scoring, ScoringConfig::default());
    }

    #[test]
    fn deserialise_partial_json_fills_defaults() {
        let json = r#"{ "scan_concurrency": 2, "scoring": { "break_pct": 2.5 } }"#;
        let cfg: RuntimeConfig = serde_json::from_str(json).unwrap();
        assert_eq!(cfg.scan_concurrency, 2);
        assert!((cfg.scoring.break_pct - 2.5).abs() < f64::EPSILON);
        assert_eq!(cfg.scoring.obv_lookback, 10);
        assert_eq!(cfg.bind_addr, "0.0.0.0:3001");
    }

    #[test]
    fn scan_limits_never_zero_concurrency() {
        let cfg = RuntimeConfig {
            scan_concurrency: 0,
            scan_timeout_secs: 5,
            ..RuntimeConfig::default()
        };
        let limits = cfg.scan_limits();
        assert_eq!(limits.concurrency, 1);
        assert_eq!(limits.timeout, Duration::from_secs(5));
    }

    #[test]
    fn save_then_load_roundtrip() {
        let dir = std::env::temp_dir().join(format!("signal-engine-cfg-{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("runtime_config.json");

        let mut cfg = RuntimeConfig::default();
        cfg.scoring.money_flow_days = 3;
        cfg.save(&path).unwrap();
        assert!(!path.with_extension("json.tmp").exists());

        let loaded = RuntimeConfig::load(&path).unwrap();
        assert_eq!(loaded.scoring.money_flow_days, 3);

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn load_rejects_invalid_scoring() {
        let dir = std::env::temp_dir().join(format!("signal-engine-cfg-{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("runtime_config.json");
        std::fs::write(&path, r#"{ "scoring": { "break_pct": -3 } }"#).unwrap();

        assert!(RuntimeConfig::load(&path).is_err());
        std::fs::remove_dir_all(&dir).unwrap();
    }
}
