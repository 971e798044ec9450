//! Strategy configuration.

use std::collections::BTreeMap;

use derive_more::Display;
use sagres_traits::{Result, SagresError};
use serde::{Deserialize, Serialize};

use crate::risk::RiskRules;
use crate::schedule::RebalanceFrequency;

fn check_fraction(name: &str, value: f64) -> Result<()> {
    if value.is_finite() && value > 0.0 && value <= 1.0 {
        Ok(())
    } else {
        Err(SagresError::Configuration(format!(
            "{name} must be in (0, 1], got {value}"
        )))
    }
}

fn check_allocation(name: &str, value: f64) -> Result<()> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(SagresError::Configuration(format!(
            "{name} must be a non-negative number, got {value}"
        )))
    }
}

/// Long-only selection parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LongOnlyConfig {
    /// Fraction of the scored universe to hold (default: 0.5)
    pub selection_pct: f64,
    /// Lower bound on the number of holdings (default: 5)
    pub min_stocks: usize,
    /// Equal weights instead of capitalization weights (default: false)
    pub equal_weight: bool,
}

impl Default for LongOnlyConfig {
    fn default() -> Self {
        Self {
            selection_pct: 0.5,
            min_stocks: 5,
            equal_weight: false,
        }
    }
}

impl LongOnlyConfig {
    /// Checks the selection fraction.
    pub fn validate(&self) -> Result<()> {
        check_fraction("selection_pct", self.selection_pct)
    }
}

/// Long-short selection parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LongShortConfig {
    /// Fraction of the universe held long (default: 0.4)
    pub long_pct: f64,
    /// Fraction of the universe held short (default: 0.2)
    pub short_pct: f64,
    /// Gross weight of the long book (default: 0.8)
    pub long_allocation: f64,
    /// Gross weight of the short book (default: 0.5)
    pub short_allocation: f64,
}

impl Default for LongShortConfig {
    fn default() -> Self {
        Self {
            long_pct: 0.4,
            short_pct: 0.2,
            long_allocation: 0.8,
            short_allocation: 0.5,
        }
    }
}

impl LongShortConfig {
    /// Checks fractions and allocations; the two books may not overlap.
    pub fn validate(&self) -> Result<()> {
        check_fraction("long_pct", self.long_pct)?;
        check_fraction("short_pct", self.short_pct)?;
        if self.long_pct + self.short_pct > 1.0 {
            return Err(SagresError::Configuration(format!(
                "long_pct + short_pct must not exceed 1, got {}",
                self.long_pct + self.short_pct
            )));
        }
        check_allocation("long_allocation", self.long_allocation)?;
        check_allocation("short_allocation", self.short_allocation)
    }
}

/// Which position sizer a strategy uses.
#[derive(Debug, Clone, PartialEq, Display, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SizingConfig {
    /// Top-scored assets only
    #[display("long-only")]
    LongOnly(LongOnlyConfig),
    /// Long the top, short the bottom
    #[display("long-short")]
    LongShort(LongShortConfig),
}

impl Default for SizingConfig {
    fn default() -> Self {
        Self::LongOnly(LongOnlyConfig::default())
    }
}

impl SizingConfig {
    /// Validates the selected sizer's parameters.
    pub fn validate(&self) -> Result<()> {
        match self {
            Self::LongOnly(config) => config.validate(),
            Self::LongShort(config) => config.validate(),
        }
    }
}

/// Complete strategy configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StrategyConfig {
    /// Composite score weight per factor name
    pub factor_weights: BTreeMap<String, f64>,
    /// Rebalance calendar
    pub rebalance: RebalanceFrequency,
    /// Position sizing
    pub sizing: SizingConfig,
    /// Stop-loss and take-profit thresholds
    pub risk: RiskRules,
}

impl StrategyConfig {
    /// Validates every section.
    ///
    /// # Errors
    ///
    /// [`SagresError::Configuration`] if no factor has a finite non-zero weight or
    /// any section is invalid.
    pub fn validate(&self) -> Result<()> {
        if let Some((name, w)) = self.factor_weights.iter().find(|(_, w)| !w.is_finite()) {
            return Err(SagresError::Configuration(format!(
                "weight of factor '{name}' is not finite: {w}"
            )));
        }
        if self.factor_weights.values().all(|w| *w == 0.0) {
            return Err(SagresError::Configuration(
                "at least one factor needs a non-zero weight".to_string(),
            ));
        }
        self.sizing.validate()?;
        self.risk.validate()
    }
}
