// =============================================================================
// Scoring Configuration — weights and thresholds for the composite scorer
// =============================================================================
//
// Operator-supplied tuning for one evaluation. Every field carries a serde
// default so a partial JSON document (e.g. only `break_pct`) deserialises
// into a complete config.
//
// Weights are raw multipliers applied to 0–100 sub-scores. They are NOT
// renormalised before the fixed 60/70 gates in the emitter.
// =============================================================================

use anyhow::{ensure, Result};
use serde::{Deserialize, Serialize};

// =============================================================================
// Default-value helpers (required by serde `default = "..."` attribute)
// =============================================================================

fn default_volume_mult() -> f64 {
    2.0
}

fn default_break_pct() -> f64 {
    1.0
}

fn default_money_flow_days() -> usize {
    5
}

fn default_obv_lookback() -> usize {
    10
}

fn default_volume_weight() -> f64 {
    25.0
}

fn default_breakout_weight() -> f64 {
    30.0
}

fn default_money_flow_weight() -> f64 {
    25.0
}

fn default_obv_weight() -> f64 {
    20.0
}

// =============================================================================
// ScoringWeights
// =============================================================================

/// Per-sub-score multipliers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoringWeights {
    #[serde(default = "default_volume_weight")]
    pub volume: f64,

    #[serde(default = "default_breakout_weight")]
    pub breakout: f64,

    #[serde(default = "default_money_flow_weight", alias = "moneyFlow")]
    pub money_flow: f64,

    #[serde(default = "default_obv_weight")]
    pub obv: f64,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            volume: default_volume_weight(),
            breakout: default_breakout_weight(),
            money_flow: default_money_flow_weight(),
            obv: default_obv_weight(),
        }
    }
}

// =============================================================================
// ScoringConfig
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoringConfig {
    /// Volume multiple an upstream screener treats as a surge.
    ///
    /// Kept for schema compatibility with level/screen suppliers; the volume
    /// anomaly scorer saturates at a fixed 1.5x of its 20-bar average.
    #[serde(default = "default_volume_mult", alias = "volumeMult")]
    pub volume_mult: f64,

    /// Margin (percent) a close must clear beyond a key level.
    #[serde(default = "default_break_pct", alias = "breakPct")]
    pub break_pct: f64,

    /// Trailing bar count for money-flow alignment.
    #[serde(default = "default_money_flow_days", alias = "moneyFlowDays")]
    pub money_flow_days: usize,

    /// Bars between the OBV value and its momentum baseline.
    #[serde(default = "default_obv_lookback", alias = "obvLookback")]
    pub obv_lookback: usize,

    #[serde(default)]
    pub weights: ScoringWeights,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            volume_mult: default_volume_mult(),
            break_pct: default_break_pct(),
            money_flow_days: default_money_flow_days(),
            obv_lookback: default_obv_lookback(),
            weights: ScoringWeights::default(),
        }
    }
}

impl ScoringConfig {
    /// Reject values that would make the arithmetic meaningless.
    ///
    /// The scorer itself stays total on any input; this is for host layers
    /// that accept configs from users.
    pub fn validate(&self) -> Result<()> {
        ensure!(
            self.break_pct.is_finite() && self.break_pct >= 0.0,
            "break_pct must be a finite, non-negative percentage (got {})",
            self.break_pct
        );
        ensure!(
            self.volume_mult.is_finite() && self.volume_mult > 0.0,
            "volume_mult must be finite and positive (got {})",
            self.volume_mult
        );
        let w = &self.weights;
        for (name, value) in [
            ("volume", w.volume),
            ("breakout", w.breakout),
            ("money_flow", w.money_flow),
            ("obv", w.obv),
        ] {
            ensure!(value.is_finite(), "weight {name} must be finite (got {value})");
        }
        Ok(())
    }
}
