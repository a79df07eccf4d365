// =============================================================================
// Signals Module
// =============================================================================
//
// Independent sub-scorers feeding the composite scorer:
// - Key-level breakout / breakdown matching
// - Money-flow alignment over a trailing window
// - OBV momentum
// - Volume anomaly vs. the 20-bar average
//
// Binary scorers fire at exactly 100 or stay at 0; only the volume scorer is
// continuous.

pub mod key_level;
pub mod money_flow;
pub mod obv_momentum;
pub mod volume_anomaly;
pub mod weighted_score;

pub use key_level::{KeyLevelCross, KeyLevelSet};
pub use money_flow::{score_alignment, score_money_flow, MoneyFlowIndex};
pub use obv_momentum::score_obv_momentum;
pub use volume_anomaly::score_volume_anomaly;
pub use weighted_score::SubScores;

/// Score assigned when a binary sub-scorer fires.
pub const FIRED_SCORE: f64 = 100.0;

/// Output of a binary sub-scorer.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SubScore {
    pub score: f64,
    /// Label describing why it fired; `None` when it did not.
    pub reason: Option<String>,
}

impl SubScore {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn fired(reason: impl Into<String>) -> Self {
        Self {
            score: FIRED_SCORE,
            reason: Some(reason.into()),
        }
    }

    pub fn is_fired(&self) -> bool {
        self.score > 0.0
    }
}
