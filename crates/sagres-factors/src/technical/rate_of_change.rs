//! Rate of change in percent.

use sagres_traits::{Factor, FactorCategory, FactorContext, FactorPanel, Result, SagresError};
use serde::{Deserialize, Serialize};

use crate::window::trailing_panel;

/// Configuration for the rate-of-change factor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateOfChangeConfig {
    /// Distance in trading days between the compared closes (default: 20)
    pub window: usize,
}

impl Default for RateOfChangeConfig {
    fn default() -> Self {
        Self { window: 20 }
    }
}

/// `(close[t] / close[t - window] - 1) * 100`.
#[derive(Debug, Clone)]
pub struct RateOfChange {
    config: RateOfChangeConfig,
}

impl RateOfChange {
    /// Create a new rate-of-change factor with the given configuration.
    #[must_use]
    pub const fn new(config: RateOfChangeConfig) -> Self {
        Self { config }
    }
}

impl Default for RateOfChange {
    fn default() -> Self {
        Self::new(RateOfChangeConfig::default())
    }
}

impl Factor for RateOfChange {
    fn name(&self) -> &str {
        "rate_of_change"
    }

    fn description(&self) -> &str {
        "Percent price change over a fixed window"
    }

    fn category(&self) -> FactorCategory {
        FactorCategory::Technical
    }

    fn lookback(&self) -> usize {
        self.config.window
    }

    fn compute(&self, ctx: &FactorContext<'_>) -> Result<FactorPanel> {
        let window = self.config.window;
        if window == 0 {
            return Err(SagresError::Configuration(
                "rate of change window must be at least 1".to_string(),
            ));
        }
        Ok(trailing_panel(self.name(), ctx, window, |closes| {
            let n = closes.len();
            Some((closes[n - 1] / closes[n - 1 - window] - 1.0) * 100.0)
        }))
    }
}
