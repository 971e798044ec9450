//! Factor-driven trading strategies for sagres.
//!
//! A strategy combines several factors into a composite score on a rebalance
//! calendar, turns the score into long-only or long-short positions, optionally
//! closes positions early on stop-loss or take-profit, and evaluates the resulting
//! daily return series with the same metrics as factor portfolios.
//!
//! # Example
//!
//! ```rust,ignore
//! use sagres_strategy::{StrategyBacktest, StrategyConfig};
//!
//! let mut config = StrategyConfig::default();
//! config.factor_weights.insert("rsi".to_string(), 0.6);
//! config.factor_weights.insert("short_term_momentum".to_string(), 0.4);
//!
//! let result = StrategyBacktest::new(config)?.run(start, end, &prices, &factors, None)?;
//! println!("sharpe: {:.2}", result.performance.metrics.sharpe_ratio);
//! ```

pub mod backtest;
pub mod config;
pub mod risk;
pub mod schedule;
pub mod sizing;

// Re-export main types
pub use backtest::{Rebalance, RiskExit, SkippedRebalance, StrategyBacktest, StrategyResult};
pub use config::{LongOnlyConfig, LongShortConfig, SizingConfig, StrategyConfig};
pub use risk::{ExitKind, RiskRules};
pub use schedule::RebalanceFrequency;
pub use sizing::{LongOnlySizer, LongShortSizer, PositionSizer, sizer_for};
