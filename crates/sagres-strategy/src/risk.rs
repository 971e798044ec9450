//! Stop-loss and take-profit rules.

use derive_more::Display;
use sagres_traits::{Result, SagresError};
use serde::{Deserialize, Serialize};

/// Why a position was closed before the next rebalance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExitKind {
    /// Loss beyond the stop-loss threshold
    #[display("stop-loss")]
    StopLoss,
    /// Gain beyond the take-profit threshold
    #[display("take-profit")]
    TakeProfit,
}

/// Per-position exit thresholds, as fractions of the entry price.
///
/// The position's return is signed by its direction, so a short gains when the
/// price falls.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct RiskRules {
    /// Close when the signed return falls below `-stop_loss`
    pub stop_loss: Option<f64>,
    /// Close when the signed return rises above `take_profit`
    pub take_profit: Option<f64>,
}

impl RiskRules {
    /// Whether any rule is active.
    pub const fn is_active(&self) -> bool {
        self.stop_loss.is_some() || self.take_profit.is_some()
    }

    /// Thresholds must be positive and finite.
    pub fn validate(&self) -> Result<()> {
        for (name, value) in [("stop_loss", self.stop_loss), ("take_profit", self.take_profit)] {
            if let Some(v) = value
                && !(v.is_finite() && v > 0.0)
            {
                return Err(SagresError::Configuration(format!(
                    "{name} must be a positive fraction, got {v}"
                )));
            }
        }
        Ok(())
    }

    /// Exit triggered by a position with `weight` whose price moved from `entry`
    /// to `price`, if any.
    pub fn check(&self, weight: f64, entry: f64, price: f64) -> Option<ExitKind> {
        if entry <= 0.0 || weight == 0.0 {
            return None;
        }
        let signed = (price / entry - 1.0) * weight.signum();
        if self.stop_loss.is_some_and(|sl| signed < -sl) {
            Some(ExitKind::StopLoss)
        } else if self.take_profit.is_some_and(|tp| signed > tp) {
            Some(ExitKind::TakeProfit)
        } else {
            None
        }
    }
}
