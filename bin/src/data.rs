//! Input parsing and loading for the Sagres CLI.

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result, bail};
use sagres::data::{load_factors, load_market_caps, load_prices};
use sagres::{Date, FactorPanel, MarketCapPanel, PriceSeries, Symbol};

/// Parse a date string in YYYY-MM-DD format.
pub(crate) fn parse_date(date_str: &str) -> Result<Date> {
    Date::parse_from_str(date_str.trim(), "%Y-%m-%d")
        .with_context(|| format!("invalid date '{date_str}', expected YYYY-MM-DD"))
}

/// Parse `name:weight` pairs separated by commas.
pub(crate) fn parse_weights(spec: &str) -> Result<BTreeMap<String, f64>> {
    let mut weights = BTreeMap::new();
    for entry in spec.split(',').map(str::trim).filter(|e| !e.is_empty()) {
        let Some((name, weight)) = entry.split_once(':') else {
            bail!("invalid factor weight '{entry}', expected name:weight");
        };
        let name = name.trim();
        if name.is_empty() {
            bail!("factor weight '{entry}' has no factor name");
        }
        let weight: f64 = weight
            .trim()
            .parse()
            .with_context(|| format!("invalid weight for factor '{name}'"))?;
        weights.insert(name.to_string(), weight);
    }
    Ok(weights)
}

/// Price histories from a CSV file.
pub(crate) fn prices(path: &Path) -> Result<BTreeMap<Symbol, PriceSeries>> {
    load_prices(path).with_context(|| format!("loading prices from {}", path.display()))
}

/// Factor panels from a CSV file.
pub(crate) fn factors(path: &Path) -> Result<BTreeMap<String, FactorPanel>> {
    load_factors(path).with_context(|| format!("loading factors from {}", path.display()))
}

/// Optional market caps from a CSV file.
pub(crate) fn market_caps(path: Option<&Path>) -> Result<Option<MarketCapPanel>> {
    path.map(|p| {
        load_market_caps(p).with_context(|| format!("loading market caps from {}", p.display()))
    })
    .transpose()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Datelike;

    #[test]
    fn test_parse_date() {
        let date = parse_date("2024-01-15").unwrap();
        assert_eq!(date.year(), 2024);
        assert_eq!(date.month(), 1);
        assert_eq!(date.day(), 15);
    }

    #[test]
    fn test_parse_date_invalid() {
        assert!(parse_date("invalid").is_err());
        assert!(parse_date("2024-13-01").is_err());
    }

    #[test]
    fn test_parse_weights() {
        let weights = parse_weights("rsi:0.6, short_term_momentum:0.4,").unwrap();
        assert_eq!(weights.len(), 2);
        assert_eq!(weights["rsi"], 0.6);
        assert_eq!(weights["short_term_momentum"], 0.4);

        assert!(parse_weights("").unwrap().is_empty());
        assert!(parse_weights("rsi").is_err());
        assert!(parse_weights("rsi:high").is_err());
        assert!(parse_weights(":1.0").is_err());
    }

    #[test]
    fn test_market_caps_optional() {
        assert!(market_caps(None).unwrap().is_none());
    }
}
