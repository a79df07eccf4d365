// =============================================================================
// Technical Indicators Module
// =============================================================================
//
// Pure, side-effect-free, single-pass precomputations shared by the
// sub-scorers. Each returns a series aligned to the candle indices.

pub mod obv;
pub mod volume_ma;

pub use obv::calculate_obv;
pub use volume_ma::{calculate_volume_ma, VOLUME_MA_PERIOD};
