// =============================================================================
// OBV Momentum — percent change of On-Balance Volume over a lookback
// =============================================================================
//
//   change% = (OBV_i - OBV_{i-L}) / |OBV_{i-L}| * 100
//
// A zero baseline has no meaningful percent change and never fires.
// =============================================================================

use super::SubScore;

/// Percent change beyond which OBV momentum fires.
pub const OBV_MOMENTUM_PCT: f64 = 2.0;

pub const OBV_RISING_LABEL: &str = "OBV rising";
pub const OBV_FALLING_LABEL: &str = "OBV falling";

/// Percent change of `obv[i]` against `obv[i - lookback]`.
///
/// Returns `None` when the lookback is zero, reaches before the series
/// start, or the baseline is zero.
pub fn obv_change_pct(obv: &[f64], i: usize, lookback: usize) -> Option<f64> {
    if lookback == 0 || i < lookback || i >= obv.len() {
        return None;
    }
    let base = obv[i - lookback];
    if base == 0.0 {
        return None;
    }
    let change = (obv[i] - base) / base.abs() * 100.0;
    change.is_finite().then_some(change)
}

/// Binary OBV momentum sub-score at bar `i`.
pub fn score_obv_momentum(obv: &[f64], i: usize, lookback: usize) -> SubScore {
    match obv_change_pct(obv, i, lookback) {
        Some(change) if change > OBV_MOMENTUM_PCT => SubScore::fired(OBV_RISING_LABEL),
        Some(change) if change < -OBV_MOMENTUM_PCT => SubScore::fired(OBV_FALLING_LABEL),
        _ => SubScore::none(),
    }
}
