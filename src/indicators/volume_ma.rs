// =============================================================================
// Volume Moving Average — trailing simple average of bar volume
// =============================================================================
//
//   MA_t = (volume_{t-period+1} + ... + volume_t) / period
//
// Computed with a running sum so the whole series costs O(n).
// =============================================================================

/// Window used by the volume anomaly scorer.
pub const VOLUME_MA_PERIOD: usize = 20;

/// Compute the trailing volume average aligned to the input indices.
///
/// Element `i` is `None` until the window has filled (`i < period - 1`).
/// `period == 0` yields an all-`None` series.
pub fn calculate_volume_ma(volumes: &[f64], period: usize) -> Vec<Option<f64>> {
    let mut result = vec![None; volumes.len()];
    if period == 0 || volumes.len() < period {
        return result;
    }

    let divisor = period as f64;
    let mut sum: f64 = volumes[..period].iter().sum();
    result[period - 1] = Some(sum / divisor);

    for i in period..volumes.len() {
        sum += volumes[i] - volumes[i - period];
        result[i] = Some(sum / divisor);
    }

    result
}
