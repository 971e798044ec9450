#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

/// Version information for the sagres crate.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// ============================================================================
// Core Types
// ============================================================================

/// Core types and the factor capability.
///
/// - [`Factor`] - scores assets through time
/// - [`TimeSeries`], [`CrossSection`], [`Panel`] - date-aligned containers
/// - [`SagresError`] - the error type shared by every crate
pub mod traits {
    pub use sagres_traits::*;
}

// Re-export core traits at top level for convenience
pub use sagres_combine::Combiner;
pub use sagres_traits::Factor;

// Re-export error types
pub use sagres_traits::{DegenerateInput, Result, SagresError};

// Re-export common types
pub use sagres_traits::{
    CrossSection, Date, FactorContext, FactorPanel, MarketCapPanel, MarketData, Panel,
    PriceSeries, Symbol, TimeSeries,
};

// ============================================================================
// Factor Implementations
// ============================================================================

/// Factor implementations and the registry.
///
/// ## Momentum
///
/// - `short_term_momentum`: 1-month cumulative return
/// - `long_term_momentum`: 12-month cumulative return skipping the last month
///
/// ## Technical
///
/// - `rsi`: 14-day Relative Strength Index
/// - `rate_of_change`: 20-day percent change
///
/// ## Liquidity
///
/// - `trading_volume`: daily volume over its 20-session average
///
/// Panels computed elsewhere are wrapped with [`factors::PrecomputedFactor`].
pub mod factors {
    pub use sagres_factors::*;
}

// ============================================================================
// Evaluation
// ============================================================================

/// Returns, portfolio construction, significance tests and performance metrics.
///
/// ```text
/// prices ──► returns ──► high/low portfolios ──► spread ──► performance
///                 │                                 │
///                 └────────► per-asset OLS ◄────────┘
/// ```
pub mod eval {
    pub use sagres_eval::*;
}

// ============================================================================
// Factor Combination
// ============================================================================

/// Composite scores from several factors.
pub mod combine {
    pub use sagres_combine::*;
}

// ============================================================================
// Strategies
// ============================================================================

/// Rebalance calendars, position sizing, risk rules and strategy backtests.
pub mod strategy {
    pub use sagres_strategy::*;
}

// ============================================================================
// Data
// ============================================================================

/// Long-format frame and CSV adapters.
pub mod data {
    pub use sagres_data::*;
}

// ============================================================================
// Prelude
// ============================================================================

/// Prelude module for convenient imports.
///
/// ```ignore
/// use sagres::prelude::*;
/// ```
pub mod prelude {
    pub use crate::traits::*;
    pub use crate::Combiner;
    pub use sagres_eval::{FactorAnalysis, FactorReport, PortfolioConfig, ResultSink, Weighting};
    pub use sagres_strategy::{StrategyBacktest, StrategyConfig};
}

// ============================================================================
// Tests
// ============================================================================
