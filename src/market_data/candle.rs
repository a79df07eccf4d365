use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Data types
// ---------------------------------------------------------------------------

/// A single OHLCV bar keyed by its time string.
///
/// Time keys must sort lexicographically in chronological order
/// (`2024-03-01`, RFC 3339 timestamps, ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    pub time: String,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl Candle {
    /// Bar with identical OHLC values, handy for synthetic series.
    pub fn flat(time: impl Into<String>, price: f64, volume: f64) -> Self {
        Self {
            time: time.into(),
            open: price,
            high: price,
            low: price,
            close: price,
            volume,
        }
    }
}

/// Signed main-fund net flow for one bar, joined to candles by `time`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoneyFlowPoint {
    pub time: String,
    #[serde(alias = "netMainFlow")]
    pub net_main_flow: f64,
}

// ---------------------------------------------------------------------------
// Normalisation
// ---------------------------------------------------------------------------

/// Sort candles ascending by time and collapse duplicate time keys.
///
/// OBV and the moving sums depend on bar order, so every evaluation runs on
/// the output of this function. When a time key repeats, the candle supplied
/// last wins (suppliers append revised bars after stale ones).
pub fn normalize_candles(mut candles: Vec<Candle>) -> Vec<Candle> {
    if candles.windows(2).all(|w| w[0].time < w[1].time) {
        return candles;
    }

    // Stable sort keeps supply order among equal keys.
    candles.sort_by(|a, b| a.time.cmp(&b.time));

    let mut out: Vec<Candle> = Vec::with_capacity(candles.len());
    for candle in candles {
        match out.last_mut() {
            Some(last) if last.time == candle.time => *last = candle,
            _ => out.push(candle),
        }
    }
    out
}
