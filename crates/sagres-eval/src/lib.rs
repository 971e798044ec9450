//! Factor evaluation for sagres.
//!
//! This crate turns a factor panel and a set of price histories into:
//! - periodic returns per asset ([`compute_returns`])
//! - look-ahead-free high/low factor portfolios and their spread ([`construct_portfolios`])
//! - per-asset OLS significance of the spread ([`test_factor`])
//! - annualized return, volatility, Sharpe ratio and drawdown ([`evaluate`])
//!
//! [`FactorAnalysis`] chains all four and produces a [`FactorReport`].
//!
//! # Example
//!
//! ```rust,ignore
//! use sagres_eval::{FactorAnalysis, PortfolioConfig, MemorySink};
//!
//! let analysis = FactorAnalysis::new(PortfolioConfig::default());
//! let report = analysis.run("rsi", &prices, &factor_panel, Some(&market_caps))?;
//! println!("spread sharpe: {:.2}", report.performance.spread.metrics.sharpe_ratio);
//!
//! let mut sink = MemorySink::new();
//! report.publish(&mut sink)?;
//! ```

pub mod analysis;
pub mod performance;
pub mod portfolio;
pub mod regression;
pub mod returns;

// Re-export main types
pub use analysis::{
    FactorAnalysis, FactorReport, MemorySink, RecordKey, RecordPayload, RegressionSummary,
    ResultRecord, ResultSink, SubjectKind,
};
pub use performance::{
    PerformanceMetrics, PerformanceReport, PortfolioPerformance, cumulative_returns, evaluate,
    evaluate_portfolio, evaluate_series, max_drawdown,
};
pub use portfolio::{
    GroupHoldings, PortfolioConfig, PortfolioConstructor, PortfolioDay, PortfolioReturns,
    SkipReason, SkippedDate, Weighting, cap_weights, construct_portfolios,
};
pub use regression::{RegressionResult, ols, test_factor};
pub use returns::{compute_returns, compute_returns_by_asset};
