// =============================================================================
// On-Balance Volume (OBV)
// =============================================================================
//
// Cumulative volume accumulator used as an accumulation/distribution proxy:
//   OBV_0 = 0
//   OBV_t = OBV_{t-1} + volume_t   if close_t > close_{t-1}
//         = OBV_{t-1} - volume_t   if close_t < close_{t-1}
//         = OBV_{t-1}              otherwise
// =============================================================================

use crate::market_data::Candle;

/// Compute the OBV series, one value per candle (oldest first).
pub fn calculate_obv(candles: &[Candle]) -> Vec<f64> {
    let mut result = Vec::with_capacity(candles.len());
    if candles.is_empty() {
        return result;
    }

    let mut obv = 0.0;
    result.push(obv);
    for pair in candles.windows(2) {
        let (prev, cur) = (&pair[0], &pair[1]);
        if cur.close > prev.close {
            obv += cur.volume;
        } else if cur.close < prev.close {
            obv -= cur.volume;
        }
        result.push(obv);
    }

    result
}

// =============================================================================
// Unit Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;

    fn series(closes: &[f64], volume: f64) -> Vec<Candle> {
        closes
            .iter()
            .enumerate()
            .map(|(i, &c)| Candle::flat(format!("t{i:03}"), c, volume))
            .collect()
    }

    #[test]
    fn empty_input() {
        assert!(calculate_obv(&[]).is_empty());
    }

    #[test]
    fn seeds_at_zero_and_ignores_ties() {
        let obv = calculate_obv(&series(&[10.0, 10.0, 10.0], 500.0));
        assert_eq!(obv, vec![0.0, 0.0, 0.0]);
    }

    #[test]
    fn alternating_series_matches_signed_sum() {
        // Up, down, up, down... with constant volume V.
        let v = 250.0;
        let closes: Vec<f64> = (0..21)
            .map(|i| if i % 2 == 0 { 10.0 } else { 11.0 })
            .collect();
        let obv = calculate_obv(&series(&closes, v));

        let mut expected = 0.0;
        for i in 1..closes.len() {
            expected += if closes[i] > closes[i - 1] { v } else { -v };
            assert!((obv[i] - expected).abs() < 1e-9, "bar {i}");
        }
        // 20 moves, 10 up and 10 down, cancel out.
        assert_eq!(obv[20], 0.0);
        assert_eq!(obv[19], v);
    }

    #[test]
    fn uses_each_bars_own_volume() {
        let mut candles = series(&[1.0, 2.0, 1.5], 0.0);
        candles[1].volume = 300.0;
        candles[2].volume = 100.0;
        assert_eq!(calculate_obv(&candles), vec![0.0, 300.0, 200.0]);
    }
}
