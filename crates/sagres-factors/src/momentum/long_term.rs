//! Long-term momentum factor based on 12-month returns, skipping the most recent month.

use sagres_traits::{Factor, FactorCategory, FactorContext, FactorPanel, Result, SagresError};
use serde::{Deserialize, Serialize};

use crate::window::trailing_panel;

/// Configuration for the long-term momentum factor.
///
/// Returns are measured from `t - lookback_days` to `t - skip_days`, leaving out
/// the most recent month to avoid short-term reversal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LongTermMomentumConfig {
    /// Number of trading days to look back (default: 252 days ≈ 12 months)
    pub lookback_days: usize,

    /// Number of recent days to skip (default: 21 days ≈ 1 month)
    pub skip_days: usize,
}

impl Default for LongTermMomentumConfig {
    fn default() -> Self {
        Self {
            lookback_days: 252,
            skip_days: 21,
        }
    }
}

/// Long-term momentum factor.
///
/// `close[t - skip] / close[t - lookback] - 1` on every date with a full lookback.
#[derive(Debug, Clone)]
pub struct LongTermMomentum {
    config: LongTermMomentumConfig,
}

impl LongTermMomentum {
    /// Create a new long-term momentum factor with the given configuration.
    #[must_use]
    pub const fn new(config: LongTermMomentumConfig) -> Self {
        Self { config }
    }

    /// Get the lookback period in days.
    #[must_use]
    pub const fn lookback_days(&self) -> usize {
        self.config.lookback_days
    }

    /// Get the number of skipped recent days.
    #[must_use]
    pub const fn skip_days(&self) -> usize {
        self.config.skip_days
    }
}

impl Default for LongTermMomentum {
    fn default() -> Self {
        Self::new(LongTermMomentumConfig::default())
    }
}

impl Factor for LongTermMomentum {
    fn name(&self) -> &str {
        "long_term_momentum"
    }

    fn description(&self) -> &str {
        "12-month cumulative returns (skipping last month)"
    }

    fn category(&self) -> FactorCategory {
        FactorCategory::Momentum
    }

    fn lookback(&self) -> usize {
        self.config.lookback_days
    }

    fn compute(&self, ctx: &FactorContext<'_>) -> Result<FactorPanel> {
        let LongTermMomentumConfig {
            lookback_days,
            skip_days,
        } = self.config;
        if skip_days >= lookback_days {
            return Err(SagresError::Configuration(format!(
                "skip_days ({skip_days}) must be smaller than lookback_days ({lookback_days})"
            )));
        }
        Ok(trailing_panel(self.name(), ctx, lookback_days, |closes| {
            let n = closes.len();
            Some(closes[n - 1 - skip_days] / closes[n - 1 - lookback_days] - 1.0)
        }))
    }
}
