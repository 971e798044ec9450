#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! Core types for the Sagres factor research engine.

/// The version of the sagres-traits crate.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod error;
pub mod factor;
pub mod series;
pub mod stats;
pub mod types;

pub use error::{DegenerateInput, Result, SagresError};
pub use factor::{Factor, FactorCategory, FactorContext};
pub use series::{
    CrossSection, FactorPanel, MarketCapPanel, Panel, PriceBar, PriceSeries, TimeSeries,
};
pub use types::{Date, MarketData, Symbol};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
        assert!(VERSION.contains('.'));
    }
}
