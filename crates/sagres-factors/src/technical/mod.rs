//! Technical indicators computed from adjusted closes.

mod rate_of_change;
mod rsi;

pub use rate_of_change::{RateOfChange, RateOfChangeConfig};
pub use rsi::{Rsi, RsiConfig};
