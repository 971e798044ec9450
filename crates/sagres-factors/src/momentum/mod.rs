//! Momentum factors based on historical price returns.
//!
//! - Short-term: 1-month momentum (21 trading days)
//! - Long-term: 12-month momentum (252 trading days), skipping the most recent month
//!
//! Values are raw cumulative returns; cross-sectional standardization happens in
//! the score aggregator.

mod long_term;
mod short_term;

pub use long_term::{LongTermMomentum, LongTermMomentumConfig};
pub use short_term::{ShortTermMomentum, ShortTermMomentumConfig};
