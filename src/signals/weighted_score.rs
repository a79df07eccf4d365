// =============================================================================
// Weighted Composite Scorer — combine sub-scores into a gated signal
// =============================================================================
//
//   total = volume * w.volume + breakout * w.breakout
//         + money_flow * w.money_flow + obv * w.obv
//
// The total is compared as-is against the fixed gate (60) and direction
// threshold (70); weights are never renormalised onto a 0–100 scale.
// =============================================================================

use serde::Serialize;

use super::volume_anomaly::{VOLUME_SURGE_LABEL, VOLUME_SURGE_SCORE};
use super::SubScore;
use crate::scoring_config::ScoringWeights;
use crate::types::Direction;

/// Totals below this are discarded.
pub const SIGNAL_GATE: f64 = 60.0;

/// Totals above this take their direction from the bar's price change.
pub const DIRECTION_THRESHOLD: f64 = 70.0;

/// Every sub-score computed for one bar.
#[derive(Debug, Clone, Default)]
pub struct SubScores {
    pub volume: f64,
    pub breakout: SubScore,
    pub money_flow: SubScore,
    pub obv: SubScore,
}

/// Per-component contribution, exposed for diagnostics.
#[derive(Debug, Clone, Serialize)]
pub struct ScoreBreakdown {
    pub volume: f64,
    pub breakout: f64,
    pub money_flow: f64,
    pub obv: f64,
    pub total: f64,
}

impl SubScores {
    pub fn breakdown(&self, weights: &ScoringWeights) -> ScoreBreakdown {
        let volume = self.volume * weights.volume;
        let breakout = self.breakout.score * weights.breakout;
        let money_flow = self.money_flow.score * weights.money_flow;
        let obv = self.obv.score * weights.obv;
        ScoreBreakdown {
            volume,
            breakout,
            money_flow,
            obv,
            total: volume + breakout + money_flow + obv,
        }
    }

    pub fn weighted_total(&self, weights: &ScoringWeights) -> f64 {
        self.breakdown(weights).total
    }

    /// Labels in fixed order: volume, key level, money flow, OBV.
    pub fn reasons(&self) -> Vec<String> {
        let mut reasons = Vec::with_capacity(4);
        if self.volume > VOLUME_SURGE_SCORE {
            reasons.push(VOLUME_SURGE_LABEL.to_string());
        }
        for sub in [&self.breakout, &self.money_flow, &self.obv] {
            if sub.is_fired() {
                if let Some(reason) = &sub.reason {
                    reasons.push(reason.clone());
                }
            }
        }
        reasons
    }
}

/// Whether a total survives the emission gate.
pub fn passes_gate(total: f64) -> bool {
    total.is_finite() && total >= SIGNAL_GATE
}

/// Assign a direction to a gate-passing total.
///
/// Only a strong total on a down bar is a sell. Every other gate-passing
/// combination, including flat bars and totals in `[60, 70]`, is a buy.
pub fn decide_direction(price_change_pct: f64, total: f64) -> Direction {
    if price_change_pct < 0.0 && total > DIRECTION_THRESHOLD {
        Direction::Sell
    } else {
        Direction::Buy
    }
}

/// Human-readable one-liner for a signal.
pub fn build_summary(reasons: &[String], total: f64, direction: Direction) -> String {
    let verdict = format!("composite score {}, suggest {direction}", total.round() as i64);
    if reasons.is_empty() {
        verdict
    } else {
        format!("{}, {verdict}", reasons.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn all_fired() -> SubScores {
        SubScores {
            volume: 100.0,
            breakout: SubScore::fired("breakout above R1"),
            money_flow: SubScore::fired("sustained inflow"),
            obv: SubScore::fired("OBV rising"),
        }
    }

    #[test]
    fn default_weights_are_not_renormalised() {
        let total = all_fired().weighted_total(&ScoringWeights::default());
        assert_eq!(total, 10_000.0);
    }

    #[test]
    fn breakdown_sums_components() {
        let scores = SubScores {
            volume: 40.0,
            obv: SubScore::fired("OBV falling"),
            ..Default::default()
        };
        let b = scores.breakdown(&ScoringWeights::default());
        assert_eq!(b.volume, 1_000.0);
        assert_eq!(b.breakout, 0.0);
        assert_eq!(b.obv, 2_000.0);
        assert_eq!(b.total, 3_000.0);
    }

    #[test]
    fn reasons_follow_fixed_order_and_volume_threshold() {
        let reasons = all_fired().reasons();
        assert_eq!(
            reasons,
            vec![
                "volume surge",
                "breakout above R1",
                "sustained inflow",
                "OBV rising"
            ]
        );

        let quiet = SubScores {
            volume: 50.0,
            ..Default::default()
        };
        assert!(quiet.reasons().is_empty());
    }

    #[test]
    fn gate_is_inclusive_at_sixty() {
        assert!(passes_gate(60.0));
        assert!(!passes_gate(59.99));
        assert!(!passes_gate(f64::NAN));
    }

    #[test]
    fn direction_defaults_to_buy() {
        assert_eq!(decide_direction(1.0, 80.0), Direction::Buy);
        assert_eq!(decide_direction(-1.0, 80.0), Direction::Sell);
        // Weak totals and flat bars fall through to buy.
        assert_eq!(decide_direction(-1.0, 65.0), Direction::Buy);
        assert_eq!(decide_direction(-1.0, 70.0), Direction::Buy);
        assert_eq!(decide_direction(0.0, 5_000.0), Direction::Buy);
    }

    #[test]
    fn summary_rounds_total() {
        let reasons = vec!["volume surge".to_string(), "OBV rising".to_string()];
        assert_eq!(
            build_summary(&reasons, 4_499.6, Direction::Sell),
            "volume surge, OBV rising, composite score 4500, suggest sell"
        );
        assert_eq!(
            build_summary(&[], 62.4, Direction::Buy),
            "composite score 62, suggest buy"
        );
    }
}
