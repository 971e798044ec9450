//! Strategy defaults from the environment.
//!
//! Values are read from the process environment after loading a `.env` file if
//! one is present. Unset keys keep the library defaults; command-line flags
//! override both.

use std::collections::BTreeMap;
use std::env;
use std::str::FromStr;

use anyhow::{Context, Result};
use sagres::strategy::{LongOnlyConfig, LongShortConfig, RebalanceFrequency, RiskRules};

use crate::data::parse_weights;

/// Default number of portfolio groups.
const DEFAULT_N_GROUPS: usize = 3;

/// Analysis and strategy defaults.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Settings {
    pub(crate) n_groups: usize,
    pub(crate) long_only: LongOnlyConfig,
    pub(crate) long_short: LongShortConfig,
    pub(crate) risk: RiskRules,
    pub(crate) rebalance: RebalanceFrequency,
    pub(crate) factor_weights: BTreeMap<String, f64>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            n_groups: DEFAULT_N_GROUPS,
            long_only: LongOnlyConfig::default(),
            long_short: LongShortConfig::default(),
            risk: RiskRules::default(),
            rebalance: RebalanceFrequency::default(),
            factor_weights: BTreeMap::new(),
        }
    }
}

fn parsed<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    lookup(key)
        .filter(|v| !v.trim().is_empty())
        .map(|v| v.trim().parse::<T>().with_context(|| format!("invalid value for {key}: '{v}'")))
        .transpose()
}

impl Settings {
    /// Settings from `.env` and the process environment.
    pub(crate) fn from_env() -> Result<Self> {
        // A missing .env file is fine.
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut settings = Self::default();

        if let Some(n) = parsed(&lookup, "SAGRES_N_GROUPS")? {
            settings.n_groups = n;
        }

        let ls = &mut settings.long_short;
        if let Some(v) = parsed(&lookup, "LS_LONG_PCT")? {
            ls.long_pct = v;
        }
        if let Some(v) = parsed(&lookup, "LS_SHORT_PCT")? {
            ls.short_pct = v;
        }
        if let Some(v) = parsed(&lookup, "LS_LONG_ALLOCATION")? {
            ls.long_allocation = v;
        }
        if let Some(v) = parsed(&lookup, "LS_SHORT_ALLOCATION")? {
            ls.short_allocation = v;
        }

        let lo = &mut settings.long_only;
        if let Some(v) = parsed(&lookup, "LO_SELECTION_PCT")? {
            lo.selection_pct = v;
        }
        if let Some(v) = parsed(&lookup, "LO_MIN_STOCKS")? {
            lo.min_stocks = v;
        }
        if let Some(v) = parsed(&lookup, "LO_EQUAL_WEIGHT")? {
            lo.equal_weight = v;
        }

        settings.risk.stop_loss = parsed(&lookup, "STOP_LOSS")?;
        settings.risk.take_profit = parsed(&lookup, "TAKE_PROFIT")?;

        if let Some(freq) = lookup("REBALANCE_FREQ").filter(|v| !v.trim().is_empty()) {
            settings.rebalance = freq.parse().context("invalid value for REBALANCE_FREQ")?;
        }
        if let Some(weights) = lookup("FACTOR_WEIGHTS") {
            settings.factor_weights =
                parse_weights(&weights).context("invalid value for FACTOR_WEIGHTS")?;
        }

        Ok(settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn settings(vars: &[(&str, &str)]) -> Result<Settings> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Settings::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults_without_environment() {
        assert_eq!(settings(&[]).unwrap(), Settings::default());
    }

    #[test]
    fn test_overrides() {
        let s = settings(&[
            ("SAGRES_N_GROUPS", "5"),
            ("LS_LONG_PCT", "0.3"),
            ("LS_SHORT_ALLOCATION", "0.25"),
            ("LO_MIN_STOCKS", "10"),
            ("LO_EQUAL_WEIGHT", "true"),
            ("STOP_LOSS", "0.1"),
            ("REBALANCE_FREQ", "W"),
            ("FACTOR_WEIGHTS", "rsi:0.6,rate_of_change:0.4"),
        ])
        .unwrap();

        assert_eq!(s.n_groups, 5);
        assert_eq!(s.long_short.long_pct, 0.3);
        assert_eq!(s.long_short.short_pct, 0.2);
        assert_eq!(s.long_short.short_allocation, 0.25);
        assert_eq!(s.long_only.min_stocks, 10);
        assert!(s.long_only.equal_weight);
        assert_eq!(s.risk.stop_loss, Some(0.1));
        assert_eq!(s.risk.take_profit, None);
        assert_eq!(s.rebalance, RebalanceFrequency::Weekly);
        assert_eq!(s.factor_weights["rsi"], 0.6);
    }

    #[test]
    fn test_blank_values_are_ignored() {
        let s = settings(&[("SAGRES_N_GROUPS", " "), ("REBALANCE_FREQ", "")]).unwrap();
        assert_eq!(s.n_groups, DEFAULT_N_GROUPS);
        assert_eq!(s.rebalance, RebalanceFrequency::Monthly);
    }

    #[test]
    fn test_invalid_values() {
        assert!(settings(&[("SAGRES_N_GROUPS", "three")]).is_err());
        assert!(settings(&[("REBALANCE_FREQ", "Q")]).is_err());
        assert!(settings(&[("FACTOR_WEIGHTS", "rsi")]).is_err());
    }
}
