// =============================================================================
// Shared types used across the signal engine
// =============================================================================

use serde::{Deserialize, Serialize};

/// Which side of price a key level sits on.
///
/// Trendline annotations may arrive from upstream level suppliers; they are
/// carried through but never matched against closes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KeyLevelKind {
    Support,
    Resistance,
    Trendline,
}

impl std::fmt::Display for KeyLevelKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Support => write!(f, "support"),
            Self::Resistance => write!(f, "resistance"),
            Self::Trendline => write!(f, "trendline"),
        }
    }
}

/// A previously identified support/resistance price.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeyLevel {
    #[serde(rename = "type")]
    pub kind: KeyLevelKind,
    pub price: f64,
    #[serde(default)]
    pub label: String,
}

impl KeyLevel {
    pub fn support(price: f64, label: impl Into<String>) -> Self {
        Self {
            kind: KeyLevelKind::Support,
            price,
            label: label.into(),
        }
    }

    pub fn resistance(price: f64, label: impl Into<String>) -> Self {
        Self {
            kind: KeyLevelKind::Resistance,
            price,
            label: label.into(),
        }
    }
}

/// Trade direction of an emitted signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Buy,
    Sell,
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Buy => write!(f, "buy"),
            Self::Sell => write!(f, "sell"),
        }
    }
}

/// A scored buy/sell signal anchored to a single candle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Signal {
    /// Time key of the candle that produced the signal.
    pub time: String,
    /// Close of that candle.
    pub price: f64,
    pub direction: Direction,
    /// Raw weighted total, not renormalised.
    pub score: f64,
    /// Labels of the sub-scores that contributed, in fixed order.
    pub reasons: Vec<String>,
    pub summary: String,
}
