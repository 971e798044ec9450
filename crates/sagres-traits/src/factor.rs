//! The factor capability.
//!
//! A factor is anything that can turn the available market inputs into a
//! [`FactorPanel`]. Concrete factors are independent implementations registered by
//! name in `sagres-factors`; the evaluation engine only ever sees the panel.

use std::collections::BTreeMap;

use derive_more::Display;
use serde::{Deserialize, Serialize};

use crate::{FactorPanel, MarketCapPanel, PriceSeries, Result, Symbol};

/// Factor category classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, Serialize, Deserialize)]
pub enum FactorCategory {
    /// Price momentum and trend-following factors
    #[display("momentum")]
    Momentum,
    /// Technical indicators computed from prices
    #[display("technical")]
    Technical,
    /// Trading activity and liquidity factors
    #[display("liquidity")]
    Liquidity,
    /// Valuation factors
    #[display("value")]
    Value,
    /// Profitability and quality factors
    #[display("quality")]
    Quality,
    /// Sentiment and alternative data factors
    #[display("sentiment")]
    Sentiment,
    /// Panels produced outside this workspace
    #[display("external")]
    External,
}

impl FactorCategory {
    /// Human-readable description of the category.
    #[must_use]
    pub const fn description(&self) -> &str {
        match self {
            Self::Momentum => "Price momentum and trend-following factors",
            Self::Technical => "Technical indicators computed from prices",
            Self::Liquidity => "Trading volume and other liquidity measures",
            Self::Value => "Valuation metrics comparing fundamentals to price",
            Self::Quality => "Profitability and operational efficiency metrics",
            Self::Sentiment => "News, filings and other alternative data",
            Self::External => "Precomputed panels supplied by an upstream producer",
        }
    }
}

/// Inputs available to a factor computation.
#[derive(Debug, Clone, Copy)]
pub struct FactorContext<'a> {
    /// Price history per asset.
    pub prices: &'a BTreeMap<Symbol, PriceSeries>,
    /// Optional market capitalizations.
    pub market_caps: Option<&'a MarketCapPanel>,
}

impl<'a> FactorContext<'a> {
    /// Context over prices only.
    pub const fn new(prices: &'a BTreeMap<Symbol, PriceSeries>) -> Self {
        Self {
            prices,
            market_caps: None,
        }
    }

    /// Attaches a market-cap panel.
    #[must_use]
    pub const fn with_market_caps(mut self, market_caps: &'a MarketCapPanel) -> Self {
        self.market_caps = Some(market_caps);
        self
    }
}

/// A factor that scores assets through time.
///
/// Implementations must be thread-safe so panels can be computed from worker
/// threads.
///
/// # Example
///
/// ```
/// use sagres_traits::{Factor, FactorCategory, FactorContext, FactorPanel, Result};
///
/// struct Constant;
///
/// impl Factor for Constant {
///     fn name(&self) -> &str { "constant" }
///     fn description(&self) -> &str { "One for every asset on its last price date" }
///     fn category(&self) -> FactorCategory { FactorCategory::Technical }
///     fn lookback(&self) -> usize { 0 }
///
///     fn compute(&self, ctx: &FactorContext<'_>) -> Result<FactorPanel> {
///         let mut panel = FactorPanel::new();
///         for (symbol, prices) in ctx.prices {
///             if let Some(bar) = prices.bars().last() {
///                 panel.insert_value(bar.date, symbol.clone(), 1.0);
///             }
///         }
///         Ok(panel)
///     }
/// }
/// ```
pub trait Factor: Send + Sync {
    /// Unique name used for registration, logging and result keys.
    fn name(&self) -> &str;

    /// One-line description.
    fn description(&self) -> &str;

    /// Category classification.
    fn category(&self) -> FactorCategory;

    /// Number of price observations needed before the first value is produced.
    fn lookback(&self) -> usize;

    /// Computes the factor panel.
    ///
    /// Values on date `t` may only use information available at the close of `t`.
    /// Assets without enough history are left out of a date rather than given a
    /// placeholder value.
    fn compute(&self, ctx: &FactorContext<'_>) -> Result<FactorPanel>;
}
