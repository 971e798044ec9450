//! Short-term momentum factor based on 1-month returns.

use sagres_traits::{Factor, FactorCategory, FactorContext, FactorPanel, Result, SagresError};
use serde::{Deserialize, Serialize};

use crate::window::trailing_panel;

/// Configuration for the short-term momentum factor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShortTermMomentumConfig {
    /// Number of trading days to look back (default: 21 days ≈ 1 month)
    pub lookback_days: usize,
}

impl Default for ShortTermMomentumConfig {
    fn default() -> Self {
        Self { lookback_days: 21 }
    }
}

/// Short-term momentum factor.
///
/// Cumulative return over the lookback: `close[t] / close[t - lookback] - 1`.
#[derive(Debug, Clone)]
pub struct ShortTermMomentum {
    config: ShortTermMomentumConfig,
}

impl ShortTermMomentum {
    /// Create a new short-term momentum factor with the given configuration.
    #[must_use]
    pub const fn new(config: ShortTermMomentumConfig) -> Self {
        Self { config }
    }

    /// Get the lookback period in days.
    #[must_use]
    pub const fn lookback_days(&self) -> usize {
        self.config.lookback_days
    }
}

impl Default for ShortTermMomentum {
    fn default() -> Self {
        Self::new(ShortTermMomentumConfig::default())
    }
}

impl Factor for ShortTermMomentum {
    fn name(&self) -> &str {
        "short_term_momentum"
    }

    fn description(&self) -> &str {
        "1-month cumulative returns"
    }

    fn category(&self) -> FactorCategory {
        FactorCategory::Momentum
    }

    fn lookback(&self) -> usize {
        self.config.lookback_days
    }

    fn compute(&self, ctx: &FactorContext<'_>) -> Result<FactorPanel> {
        let lookback = self.config.lookback_days;
        if lookback == 0 {
            return Err(SagresError::Configuration(
                "momentum lookback must be at least 1 day".to_string(),
            ));
        }
        Ok(trailing_panel(self.name(), ctx, lookback, |closes| {
            let n = closes.len();
            Some(closes[n - 1] / closes[n - 1 - lookback] - 1.0)
        }))
    }
}
