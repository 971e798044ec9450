//! Factor registry for discovering and constructing available factors.
//!
//! Every price-based factor in this crate is registered here by name with its
//! default configuration.

use sagres_traits::{Factor, FactorCategory, Result, SagresError};
use serde::Serialize;

use crate::liquidity::TradingVolume;
use crate::momentum::{LongTermMomentum, ShortTermMomentum};
use crate::technical::{RateOfChange, Rsi};

/// Metadata about a registered factor.
#[derive(Debug, Clone, Serialize)]
pub struct FactorInfo {
    /// Unique identifier for the factor
    pub name: &'static str,

    /// Category classification
    pub category: FactorCategory,

    /// Human-readable description
    pub description: &'static str,

    /// Typical lookback period in days
    pub typical_lookback: usize,
}

/// Get information about all registered factors.
#[must_use]
pub fn available_factors() -> Vec<FactorInfo> {
    vec![
        // Momentum factors
        FactorInfo {
            name: "short_term_momentum",
            category: FactorCategory::Momentum,
            description: "1-month cumulative returns",
            typical_lookback: 21,
        },
        FactorInfo {
            name: "long_term_momentum",
            category: FactorCategory::Momentum,
            description: "12-month cumulative returns (skipping last month)",
            typical_lookback: 252,
        },
        // Technical factors
        FactorInfo {
            name: "rsi",
            category: FactorCategory::Technical,
            description: "Relative Strength Index comparing recent gains to recent losses",
            typical_lookback: 14,
        },
        FactorInfo {
            name: "rate_of_change",
            category: FactorCategory::Technical,
            description: "Percent price change over a fixed window",
            typical_lookback: 20,
        },
        // Liquidity factors
        FactorInfo {
            name: "trading_volume",
            category: FactorCategory::Liquidity,
            description: "Daily volume relative to its trailing average",
            typical_lookback: 20,
        },
    ]
}

/// Get all factors in a specific category.
#[must_use]
pub fn factors_by_category(category: FactorCategory) -> Vec<FactorInfo> {
    available_factors()
        .into_iter()
        .filter(|info| info.category == category)
        .collect()
}

/// Get information about a specific factor by name.
#[must_use]
pub fn get_factor_info(name: &str) -> Option<FactorInfo> {
    available_factors()
        .into_iter()
        .find(|info| info.name == name)
}

/// Construct a registered factor with its default configuration.
///
/// # Errors
///
/// [`SagresError::FactorNotFound`] if no factor is registered under `name`.
pub fn create_factor(name: &str) -> Result<Box<dyn Factor>> {
    match name {
        "short_term_momentum" => Ok(Box::new(ShortTermMomentum::default())),
        "long_term_momentum" => Ok(Box::new(LongTermMomentum::default())),
        "rsi" => Ok(Box::new(Rsi::default())),
        "rate_of_change" => Ok(Box::new(RateOfChange::default())),
        "trading_volume" => Ok(Box::new(TradingVolume::default())),
        other => Err(SagresError::FactorNotFound(other.to_string())),
    }
}
