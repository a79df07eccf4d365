// =============================================================================
// Signal Engine — candles, key levels and money flow in; ranked signals out
// =============================================================================
//
// Pipeline (one pass over the series):
//   1. Normalise candles (ascending, unique time keys)
//   2. Precompute the 20-bar volume MA and OBV
//   3. Build the key-level set, the money-flow join map and its running
//      positive count
//   4. For every bar from index 20: score volume, key level, money flow, OBV
//   5. Weighted total, gate at 60, assign direction
//   6. Most recent first, capped at 20
//
// The engine holds no state. Identical inputs always produce identical
// output, and a changed config needs a full re-evaluation.
// =============================================================================

use anyhow::{Context, Result};
use tracing::debug;

use crate::indicators::{calculate_obv, calculate_volume_ma, VOLUME_MA_PERIOD};
use crate::market_data::{normalize_candles, Candle, MarketDataSource, MoneyFlowPoint, SeriesKey};
use crate::scoring_config::ScoringConfig;
use crate::signals::weighted_score::{build_summary, decide_direction, passes_gate};
use crate::signals::{
    score_alignment, score_obv_momentum, score_volume_anomaly, KeyLevelSet, MoneyFlowIndex,
    SubScores,
};
use crate::types::{KeyLevel, Signal};

/// Shorter histories produce no signals at all.
pub const MIN_CANDLES: usize = 30;

/// First bar index that is scored.
pub const FIRST_SCORED_BAR: usize = 20;

/// Maximum number of signals returned.
pub const MAX_SIGNALS: usize = 20;

/// Score every bar and return the gate-passing signals, most recent first.
///
/// Never fails: short histories return an empty list and every degenerate
/// input (missing flow, zero baselines, zero-priced levels) only removes
/// that sub-score's contribution.
pub fn evaluate_signals(
    candles: &[Candle],
    key_levels: &[KeyLevel],
    money_flow: &[MoneyFlowPoint],
    config: &ScoringConfig,
) -> Vec<Signal> {
    if candles.len() < MIN_CANDLES {
        debug!(candles = candles.len(), "insufficient history, skipping evaluation");
        return Vec::new();
    }

    // ── 1. Normalise ─────────────────────────────────────────────────────
    let candles = normalize_candles(candles.to_vec());
    if candles.len() < MIN_CANDLES {
        debug!(
            candles = candles.len(),
            "insufficient history after collapsing duplicate times"
        );
        return Vec::new();
    }

    // ── 2. Indicators ────────────────────────────────────────────────────
    let volumes: Vec<f64> = candles.iter().map(|c| c.volume).collect();
    let volume_ma = calculate_volume_ma(&volumes, VOLUME_MA_PERIOD);
    let obv = calculate_obv(&candles);

    // ── 3. Lookup structures ─────────────────────────────────────────────
    let levels = KeyLevelSet::from_levels(key_levels);
    let flows = MoneyFlowIndex::from_points(money_flow);
    let positive_flow = flows.positive_prefix(&candles);

    // ── 4–5. Score each bar ──────────────────────────────────────────────
    let mut signals = Vec::new();
    for i in FIRST_SCORED_BAR..candles.len() {
        let bar = &candles[i];
        let prev_close = candles[i - 1].close;

        let window_start = (i + 1).saturating_sub(config.money_flow_days);
        let scores = SubScores {
            volume: score_volume_anomaly(bar.volume, volume_ma[i]),
            breakout: levels.score(prev_close, bar.close, config.break_pct),
            money_flow: score_alignment(
                positive_flow[i + 1] - positive_flow[window_start],
                i + 1 - window_start,
            ),
            obv: score_obv_momentum(&obv, i, config.obv_lookback),
        };

        let total = scores.weighted_total(&config.weights);
        if !passes_gate(total) {
            continue;
        }

        let price_change_pct = if prev_close != 0.0 {
            (bar.close - prev_close) / prev_close * 100.0
        } else {
            0.0
        };
        let direction = decide_direction(price_change_pct, total);
        let reasons = scores.reasons();
        let summary = build_summary(&reasons, total, direction);

        signals.push(Signal {
            time: bar.time.clone(),
            price: bar.close,
            direction,
            score: total,
            reasons,
            summary,
        });
    }

    // ── 6. Most recent first, capped ─────────────────────────────────────
    let qualified = signals.len();
    signals.reverse();
    signals.truncate(MAX_SIGNALS);

    debug!(
        bars = candles.len(),
        qualified,
        emitted = signals.len(),
        "signal evaluation complete"
    );
    signals
}

/// Signals for one fetched series.
#[derive(Debug, Clone, PartialEq)]
pub struct SeriesSignals {
    pub signals: Vec<Signal>,
    /// Time key of the newest candle the supplier returned.
    pub last_bar: Option<String>,
}

/// Fetch one series from `source` and evaluate it.
pub fn evaluate_series(
    source: &dyn MarketDataSource,
    key: &SeriesKey,
    bars: usize,
    config: &ScoringConfig,
) -> Result<SeriesSignals> {
    let candles = source
        .candles(key, bars)
        .with_context(|| format!("candle supplier failed for {key}"))?;
    let key_levels = source
        .key_levels(key)
        .with_context(|| format!("key-level supplier failed for {key}"))?;
    let money_flow = source
        .money_flow(key)
        .with_context(|| format!("money-flow supplier failed for {key}"))?;

    Ok(SeriesSignals {
        signals: evaluate_signals(&candles, &key_levels, &money_flow, config),
        last_bar: candles.iter().map(|c| &c.time).max().cloned(),
    })
}
