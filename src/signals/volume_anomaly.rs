// =============================================================================
// Volume Anomaly — relative volume vs. its 20-bar average
// =============================================================================
//
//   score = clamp((volume / MA20 - 1) * 200, 0, 100)
//
// 1.5x the average or more saturates at 100; at or below average is 0.
// =============================================================================

/// Sub-score above which the bar is labelled a volume surge.
pub const VOLUME_SURGE_SCORE: f64 = 50.0;

pub const VOLUME_SURGE_LABEL: &str = "volume surge";

/// Continuous volume anomaly score in `[0, 100]`.
///
/// An undefined or non-positive average scores 0.
pub fn score_volume_anomaly(volume: f64, volume_ma: Option<f64>) -> f64 {
    let Some(ma) = volume_ma.filter(|ma| *ma > 0.0) else {
        return 0.0;
    };
    let score = (volume / ma - 1.0) * 200.0;
    if score.is_finite() {
        score.clamp(0.0, 100.0)
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scales_linearly_between_bounds() {
        assert!((score_volume_anomaly(125.0, Some(100.0)) - 50.0).abs() < 1e-9);
        assert!((score_volume_anomaly(110.0, Some(100.0)) - 20.0).abs() < 1e-9);
    }

    #[test]
    fn clamps_at_both_ends() {
        assert_eq!(score_volume_anomaly(300.0, Some(100.0)), 100.0);
        assert_eq!(score_volume_anomaly(150.0, Some(100.0)), 100.0);
        assert_eq!(score_volume_anomaly(50.0, Some(100.0)), 0.0);
        assert_eq!(score_volume_anomaly(100.0, Some(100.0)), 0.0);
    }

    #[test]
    fn missing_or_zero_average_scores_zero() {
        assert_eq!(score_volume_anomaly(100.0, None), 0.0);
        assert_eq!(score_volume_anomaly(100.0, Some(0.0)), 0.0);
        assert_eq!(score_volume_anomaly(f64::INFINITY, Some(10.0)), 0.0);
    }
}
