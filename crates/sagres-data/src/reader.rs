//! CSV files in the long-format layouts.

use std::collections::BTreeMap;
use std::path::Path;

use polars::prelude::*;
use sagres_traits::{FactorPanel, MarketCapPanel, MarketData, PriceSeries, Result, Symbol};
use tracing::info;

use crate::convert::{factors_from_frame, market_caps_from_frame, prices_from_frame};

/// Reads a CSV file with a header row.
pub fn read_csv(path: impl AsRef<Path>) -> Result<MarketData> {
    let path = path.as_ref();
    let df = CsvReadOptions::default()
        .with_has_header(true)
        .try_into_reader_with_file_path(Some(path.to_path_buf()))?
        .finish()?;
    info!(path = %path.display(), rows = df.height(), "loaded csv");
    Ok(MarketData::new(df))
}

/// Price histories from a `symbol,date,adjusted_close[,volume]` file.
pub fn load_prices(path: impl AsRef<Path>) -> Result<BTreeMap<Symbol, PriceSeries>> {
    prices_from_frame(&read_csv(path)?)
}

/// Market caps from a `symbol,date,market_cap` file.
pub fn load_market_caps(path: impl AsRef<Path>) -> Result<MarketCapPanel> {
    market_caps_from_frame(&read_csv(path)?)
}

/// Factor panels from a `symbol,date[,factor_name],value` file.
///
/// A file without `factor_name` holds a single factor named after the file stem.
pub fn load_factors(path: impl AsRef<Path>) -> Result<BTreeMap<String, FactorPanel>> {
    let path = path.as_ref();
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "factor".to_string());
    factors_from_frame(&read_csv(path)?, &stem)
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;
    use sagres_traits::{Date, SagresError};
    use tempfile::tempdir;

    #[test]
    fn test_load_prices_and_factors() {
        let dir = tempdir().unwrap();
        let prices_path = dir.path().join("prices.csv");
        fs::write(
            &prices_path,
            "symbol,date,adjusted_close,volume\n\
             AAPL,2024-01-02,185.6,1000\n\
             AAPL,2024-01-03,184.2,1100\n\
             MSFT,2024-01-02,370.9,800\n",
        )
        .unwrap();
        let factor_path = dir.path().join("rsi.csv");
        fs::write(
            &factor_path,
            "symbol,date,value\nAAPL,2024-01-02,61.5\nMSFT,2024-01-02,48.0\n",
        )
        .unwrap();

        let prices = load_prices(&prices_path).unwrap();
        assert_eq!(prices["AAPL"].len(), 2);
        assert_eq!(prices["MSFT"].closes(), vec![370.9]);

        let factors = load_factors(&factor_path).unwrap();
        let day = Date::from_ymd_opt(2024, 1, 2).unwrap();
        assert_eq!(factors["rsi"].get(&day).unwrap().get("MSFT"), Some(48.0));
    }

    #[test]
    fn test_load_market_caps() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("caps.csv");
        fs::write(&path, "symbol,date,market_cap\nAAPL,2024-01-02,2.9e12\n").unwrap();
        let caps = load_market_caps(&path).unwrap();
        assert_eq!(caps.len(), 1);
    }

    #[test]
    fn test_missing_file() {
        let dir = tempdir().unwrap();
        assert!(matches!(
            read_csv(dir.path().join("absent.csv")),
            Err(SagresError::Polars(_))
        ));
    }
}
