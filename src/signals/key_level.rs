// =============================================================================
// Key-Level Matcher — strict breakout / breakdown crossings
// =============================================================================
//
// Breakout through resistance R at bar i:
//   close_i > R * (1 + break_pct / 100)   AND   close_{i-1} <= R
//
// Breakdown through support S at bar i:
//   close_i < S * (1 - break_pct / 100)   AND   close_{i-1} >= S
//
// Levels are tested in supply order and the first match wins. Resistances
// are tested before supports, so at most one crossing fires per bar. The
// prior-close condition means a bar that was already beyond the level does
// not fire again.
// =============================================================================

use super::SubScore;
use crate::types::{KeyLevel, KeyLevelKind};

/// A decisive close beyond one of the supplied levels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum KeyLevelCross<'a> {
    Breakout(&'a KeyLevel),
    Breakdown(&'a KeyLevel),
}

impl KeyLevelCross<'_> {
    pub fn level(&self) -> &KeyLevel {
        match self {
            Self::Breakout(level) | Self::Breakdown(level) => level,
        }
    }

    pub fn label(&self) -> String {
        let level = self.level();
        let name = if level.label.is_empty() {
            format!("{:.2}", level.price)
        } else {
            level.label.clone()
        };
        match self {
            Self::Breakout(_) => format!("breakout above {name}"),
            Self::Breakdown(_) => format!("breakdown below {name}"),
        }
    }
}

/// Resistances and supports split out of a supplier's level list,
/// preserving priority order.
#[derive(Debug, Clone, Default)]
pub struct KeyLevelSet<'a> {
    resistances: Vec<&'a KeyLevel>,
    supports: Vec<&'a KeyLevel>,
}

impl<'a> KeyLevelSet<'a> {
    /// Partition `levels` by kind. Trendlines and levels whose price is not
    /// a positive finite number are dropped.
    pub fn from_levels(levels: &'a [KeyLevel]) -> Self {
        let mut set = Self::default();
        for level in levels {
            if !(level.price.is_finite() && level.price > 0.0) {
                continue;
            }
            match level.kind {
                KeyLevelKind::Resistance => set.resistances.push(level),
                KeyLevelKind::Support => set.supports.push(level),
                KeyLevelKind::Trendline => {}
            }
        }
        set
    }

    pub fn is_empty(&self) -> bool {
        self.resistances.is_empty() && self.supports.is_empty()
    }

    /// Find the crossing (if any) between two consecutive closes.
    pub fn match_close(
        &self,
        prev_close: f64,
        close: f64,
        break_pct: f64,
    ) -> Option<KeyLevelCross<'a>> {
        let up = 1.0 + break_pct / 100.0;
        let down = 1.0 - break_pct / 100.0;

        if let Some(level) = self
            .resistances
            .iter()
            .copied()
            .find(|r| close > r.price * up && prev_close <= r.price)
        {
            return Some(KeyLevelCross::Breakout(level));
        }

        self.supports
            .iter()
            .copied()
            .find(|s| close < s.price * down && prev_close >= s.price)
            .map(KeyLevelCross::Breakdown)
    }

    /// Binary sub-score for the crossing between two consecutive closes.
    pub fn score(&self, prev_close: f64, close: f64, break_pct: f64) -> SubScore {
        match self.match_close(prev_close, close, break_pct) {
            Some(cross) => SubScore::fired(cross.label()),
            None => SubScore::none(),
        }
    }
}
