// =============================================================================
// Money-Flow Alignment — directional consistency of main-fund net flow
// =============================================================================
//
// Over the trailing window of bars ending at i, count the bars whose
// time-matched net main flow is strictly positive. A bar with no matching
// flow record counts as not positive.
//
//   positive fraction >= 0.7  =>  100, "sustained inflow"
//   positive fraction <= 0.3  =>  100, "sustained outflow"
//   otherwise                 =>  0
// =============================================================================

use std::collections::HashMap;

use super::SubScore;
use crate::market_data::{Candle, MoneyFlowPoint};

pub const INFLOW_FRACTION: f64 = 0.7;
pub const OUTFLOW_FRACTION: f64 = 0.3;

pub const INFLOW_LABEL: &str = "sustained inflow";
pub const OUTFLOW_LABEL: &str = "sustained outflow";

/// Money-flow records keyed by candle time for O(1) joins.
#[derive(Debug, Clone, Default)]
pub struct MoneyFlowIndex<'a> {
    by_time: HashMap<&'a str, f64>,
}

impl<'a> MoneyFlowIndex<'a> {
    /// Build the join map. A repeated time key keeps the last record.
    pub fn from_points(points: &'a [MoneyFlowPoint]) -> Self {
        let by_time = points
            .iter()
            .map(|p| (p.time.as_str(), p.net_main_flow))
            .collect();
        Self { by_time }
    }

    /// Whether the flow at `time` is strictly positive; missing is `false`.
    pub fn is_positive(&self, time: &str) -> bool {
        self.by_time.get(time).is_some_and(|&flow| flow > 0.0)
    }

    /// Running count of positive-flow bars: `prefix[k]` covers `candles[..k]`,
    /// so any trailing window's count is one subtraction.
    pub fn positive_prefix(&self, candles: &[Candle]) -> Vec<usize> {
        let mut prefix = Vec::with_capacity(candles.len() + 1);
        let mut running = 0;
        prefix.push(running);
        for candle in candles {
            if self.is_positive(&candle.time) {
                running += 1;
            }
            prefix.push(running);
        }
        prefix
    }

    pub fn len(&self) -> usize {
        self.by_time.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_time.is_empty()
    }
}

/// Score the alignment of `window` (the trailing bars ending at the bar
/// being evaluated). An empty window contributes nothing.
pub fn score_money_flow(window: &[Candle], index: &MoneyFlowIndex<'_>) -> SubScore {
    let positive = window.iter().filter(|c| index.is_positive(&c.time)).count();
    score_alignment(positive, window.len())
}

/// Score a window of `bars` bars of which `positive` had inflow.
pub fn score_alignment(positive: usize, bars: usize) -> SubScore {
    if bars == 0 {
        return SubScore::none();
    }

    let fraction = positive as f64 / bars as f64;

    if fraction >= INFLOW_FRACTION {
        SubScore::fired(INFLOW_LABEL)
    } else if fraction <= OUTFLOW_FRACTION {
        SubScore::fired(OUTFLOW_LABEL)
    } else {
        SubScore::none()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;

    fn bars(n: usize) -> Vec<Candle> {
        (0..n)
            .map(|i| Candle::flat(format!("d{i}"), 10.0, 100.0))
            .collect()
    }

    fn flows(signs: &[f64]) -> Vec<MoneyFlowPoint> {
        signs
            .iter()
            .enumerate()
            .map(|(i, &s)| MoneyFlowPoint {
                time: format!("d{i}"),
                net_main_flow: s * 1_000.0,
            })
            .collect()
    }

    #[test]
    fn all_positive_is_sustained_inflow() {
        let points = flows(&[1.0, 1.0, 1.0]);
        let index = MoneyFlowIndex::from_points(&points);
        let sub = score_money_flow(&bars(3), &index);
        assert_eq!(sub.score, 100.0);
        assert_eq!(sub.reason.as_deref(), Some(INFLOW_LABEL));
    }

    #[test]
    fn mixed_window_scores_zero() {
        let points = flows(&[1.0, -1.0, 1.0]);
        let index = MoneyFlowIndex::from_points(&points);
        assert_eq!(score_money_flow(&bars(3), &index), SubScore::none());
    }

    #[test]
    fn all_negative_is_sustained_outflow() {
        let points = flows(&[-1.0, -1.0, 0.0]);
        let index = MoneyFlowIndex::from_points(&points);
        let sub = score_money_flow(&bars(3), &index);
        assert_eq!(sub.reason.as_deref(), Some(OUTFLOW_LABEL));
    }

    #[test]
    fn missing_records_count_as_not_positive() {
        // Only d0 has a record; d1..d3 are missing.
        let points = flows(&[1.0]);
        let index = MoneyFlowIndex::from_points(&points);
        let sub = score_money_flow(&bars(4), &index);
        assert_eq!(sub.reason.as_deref(), Some(OUTFLOW_LABEL));
    }

    #[test]
    fn boundary_fractions_fire() {
        // 7 of 10 positive is exactly 0.7.
        let signs = [1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, -1.0, -1.0, -1.0];
        let points = flows(&signs);
        let index = MoneyFlowIndex::from_points(&points);
        assert_eq!(
            score_money_flow(&bars(10), &index).reason.as_deref(),
            Some(INFLOW_LABEL)
        );

        // 3 of 10 positive is exactly 0.3.
        let signs = [1.0, 1.0, 1.0, -1.0, -1.0, -1.0, -1.0, -1.0, -1.0, -1.0];
        let points = flows(&signs);
        let index = MoneyFlowIndex::from_points(&points);
        assert_eq!(
            score_money_flow(&bars(10), &index).reason.as_deref(),
            Some(OUTFLOW_LABEL)
        );
    }

    #[test]
    fn empty_window_contributes_nothing() {
        let index = MoneyFlowIndex::default();
        assert_eq!(score_money_flow(&[], &index), SubScore::none());
    }

    #[test]
    fn prefix_counts_match_window_scan() {
        let signs = [1.0, -1.0, 1.0, 1.0, 1.0, -1.0, -1.0, -1.0, 1.0, 1.0, 1.0, 1.0];
        let points = flows(&signs);
        let index = MoneyFlowIndex::from_points(&points);
        // d12 and d13 have no record.
        let candles = bars(14);
        let prefix = index.positive_prefix(&candles);
        assert_eq!(prefix.len(), candles.len() + 1);
        assert_eq!(prefix[candles.len()], 8);

        for days in [1, 3, 5, 14] {
            for i in 0..candles.len() {
                let start = (i + 1).saturating_sub(days);
                assert_eq!(
                    score_alignment(prefix[i + 1] - prefix[start], i + 1 - start),
                    score_money_flow(&candles[start..=i], &index),
                    "days {days}, bar {i}"
                );
            }
        }
    }
}
