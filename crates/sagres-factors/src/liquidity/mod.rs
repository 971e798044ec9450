//! Liquidity factors computed from traded volume.

mod trading_volume;

pub use trading_volume::{TradingVolume, TradingVolumeConfig};
