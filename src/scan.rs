// =============================================================================
// Market Scan — evaluate many symbols on a bounded worker pool
// =============================================================================
//
// One task per symbol, at most `concurrency` evaluating at once (semaphore
// permits). Tasks read disjoint series and push their `SymbolScan` into an
// mpsc channel drained by a single aggregator. The aggregator stops on
// completion, on timeout, or when the cancel flag flips to `true`; in the
// latter two cases every unfinished task is aborted and the partial results
// are returned at once.
//
// Supplier calls are synchronous and may block, so each one runs on the
// blocking pool. A supplier call still in flight when the scan stops is
// detached: it finishes in the background and its result is discarded.
// =============================================================================

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::{mpsc, watch, Semaphore};
use tokio::task::JoinSet;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::engine::{evaluate_series, SeriesSignals};
use crate::market_data::{MarketDataSource, SeriesKey};
use crate::scoring_config::ScoringConfig;
use crate::types::Signal;

fn default_bars() -> usize {
    250
}

/// What to scan.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanRequest {
    /// Symbols to evaluate; empty means every symbol the source has for
    /// `period`.
    #[serde(default)]
    pub symbols: Vec<String>,
    pub period: String,
    /// Candles fetched per symbol.
    #[serde(default = "default_bars")]
    pub bars: usize,
    /// Overrides the host's scoring config for this scan only.
    #[serde(default)]
    pub scoring: Option<ScoringConfig>,
}

/// Batch-level resource limits.
#[derive(Debug, Clone, Copy)]
pub struct ScanLimits {
    pub concurrency: usize,
    pub timeout: Duration,
}

impl Default for ScanLimits {
    fn default() -> Self {
        Self {
            concurrency: 8,
            timeout: Duration::from_secs(30),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScanStatus {
    Completed,
    Cancelled,
    TimedOut,
}

impl std::fmt::Display for ScanStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Completed => write!(f, "completed"),
            Self::Cancelled => write!(f, "cancelled"),
            Self::TimedOut => write!(f, "timed_out"),
        }
    }
}

/// Outcome for one symbol.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SymbolScan {
    pub symbol: String,
    pub signals: Vec<Signal>,
    /// Time key of the newest candle evaluated.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_bar: Option<String>,
    /// Supplier failure, if any. The symbol then carries no signals.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl SymbolScan {
    /// Whether the newest signal sits on the newest candle.
    pub fn is_fresh_hit(&self) -> bool {
        match (self.signals.first(), &self.last_bar) {
            (Some(signal), Some(last)) => &signal.time == last,
            _ => false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanReport {
    pub id: Uuid,
    pub period: String,
    pub status: ScanStatus,
    /// Symbols requested, including ones that never finished.
    pub requested: usize,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    /// Sorted by symbol.
    pub results: Vec<SymbolScan>,
}

impl ScanReport {
    /// Symbols with a signal on their most recent bar.
    pub fn fresh_hits(&self) -> Vec<&SymbolScan> {
        self.results.iter().filter(|r| r.is_fresh_hit()).collect()
    }

    pub fn failures(&self) -> usize {
        self.results.iter().filter(|r| r.error.is_some()).count()
    }
}

/// Evaluate one symbol; supplier errors are folded into the result.
fn scan_symbol(
    source: &dyn MarketDataSource,
    key: &SeriesKey,
    bars: usize,
    config: &ScoringConfig,
) -> SymbolScan {
    match evaluate_series(source, key, bars, config) {
        Ok(SeriesSignals { signals, last_bar }) => SymbolScan {
            symbol: key.symbol.clone(),
            signals,
            last_bar,
            error: None,
        },
        Err(e) => {
            let error = format!("{e:#}");
            warn!(series = %key, error = %error, "symbol scan failed");
            SymbolScan {
                symbol: key.symbol.clone(),
                signals: Vec::new(),
                last_bar: None,
                error: Some(error),
            }
        }
    }
}

/// Run a full scan. Always returns a report, possibly partial.
pub async fn run_scan(
    source: Arc<dyn MarketDataSource>,
    request: ScanRequest,
    scoring: ScoringConfig,
    limits: ScanLimits,
    mut cancel: watch::Receiver<bool>,
) -> ScanReport {
    let id = Uuid::new_v4();
    let started_at = Utc::now();
    let config = Arc::new(request.scoring.clone().unwrap_or(scoring));

    let keys: Vec<SeriesKey> = if request.symbols.is_empty() {
        source
            .keys()
            .into_iter()
            .filter(|k| k.period == request.period)
            .collect()
    } else {
        request
            .symbols
            .iter()
            .map(|s| SeriesKey::new(s.clone(), request.period.clone()))
            .collect()
    };
    let requested = keys.len();
    let concurrency = limits.concurrency.max(1);

    info!(
        scan_id = %id,
        period = %request.period,
        symbols = requested,
        concurrency,
        "market scan started"
    );

    // ── Workers ──────────────────────────────────────────────────────────
    let semaphore = Arc::new(Semaphore::new(concurrency));
    let (tx, mut rx) = mpsc::channel::<SymbolScan>(concurrency * 2);
    let mut tasks = JoinSet::new();

    for key in keys {
        let semaphore = semaphore.clone();
        let source = source.clone();
        let config = config.clone();
        let tx = tx.clone();
        let bars = request.bars;
        tasks.spawn(async move {
            let Ok(_permit) = semaphore.acquire_owned().await else {
                return;
            };
            let series = key.to_string();
            let scanned = tokio::task::spawn_blocking(move || {
                scan_symbol(source.as_ref(), &key, bars, &config)
            })
            .await;
            match scanned {
                Ok(result) => {
                    debug!(series = %series, signals = result.signals.len(), "symbol scanned");
                    // Receiver gone means the batch was abandoned.
                    let _ = tx.send(result).await;
                }
                Err(e) => warn!(series = %series, error = %e, "symbol scan task failed"),
            }
        });
    }
    drop(tx);

    // ── Aggregator ───────────────────────────────────────────────────────
    let mut results = Vec::with_capacity(requested);
    let mut status = ScanStatus::Completed;
    let deadline = tokio::time::sleep(limits.timeout);
    tokio::pin!(deadline);
    let mut cancel_live = true;

    if *cancel.borrow_and_update() {
        status = ScanStatus::Cancelled;
    } else {
        loop {
            tokio::select! {
                received = rx.recv() => match received {
                    Some(result) => results.push(result),
                    None => break,
                },
                _ = &mut deadline => {
                    status = ScanStatus::TimedOut;
                    break;
                }
                changed = cancel.changed(), if cancel_live => {
                    if changed.is_err() {
                        // Sender dropped; nobody can cancel any more.
                        cancel_live = false;
                    } else if *cancel.borrow_and_update() {
                        status = ScanStatus::Cancelled;
                        break;
                    }
                }
            }
        }
    }

    if status == ScanStatus::Completed {
        while tasks.join_next().await.is_some() {}
    } else {
        // Do not wait: a blocked supplier call would hold the scan open.
        tasks.abort_all();
        drop(tasks);
        warn!(
            scan_id = %id,
            %status,
            finished = results.len(),
            requested,
            "market scan stopped early"
        );
    }

    results.sort_by(|a, b| a.symbol.cmp(&b.symbol));

    let report = ScanReport {
        id,
        period: request.period,
        status,
        requested,
        started_at,
        finished_at: Utc::now(),
        results,
    };

    info!(
        scan_id = %id,
        %status,
        scanned = report.results.len(),
        fresh_hits = report.fresh_hits().len(),
        failures = report.failures(),
        "market scan finished"
    );
    report
}
