//! Common types used throughout the Sagres workspace.

use polars::prelude::*;

use crate::{Result, SagresError};

// Re-export date type from chrono
pub use chrono::NaiveDate as Date;

/// An asset identifier, typically a ticker such as "AAPL".
pub type Symbol = String;

/// Long-format tabular market data.
///
/// Wraps a Polars DataFrame with one row per `(symbol, date)` observation. The
/// adapters in `sagres-data` turn it into typed [`crate::PriceSeries`] and
/// [`crate::Panel`] values; the numeric core never touches the frame directly.
///
/// # Expected Schema
///
/// - `symbol`: asset identifier
/// - `date`: trading date (`YYYY-MM-DD` string or Polars `Date`)
/// - `adjusted_close`, `volume` for prices
/// - `market_cap` or a factor value column for panels
///
/// # Example
///
/// ```no_run
/// use sagres_traits::MarketData;
/// use polars::prelude::*;
///
/// let df = df! {
///     "symbol" => &["AAPL", "MSFT"],
///     "date" => &["2024-01-02", "2024-01-02"],
///     "adjusted_close" => &[185.6, 370.9],
/// }.unwrap();
///
/// let market_data = MarketData::new(df);
/// assert!(market_data.has_column("adjusted_close"));
/// ```
#[derive(Debug, Clone)]
pub struct MarketData {
    data: DataFrame,
}

impl MarketData {
    /// Creates a new `MarketData` instance from a DataFrame.
    pub const fn new(data: DataFrame) -> Self {
        Self { data }
    }

    /// Returns a reference to the underlying DataFrame.
    pub const fn data(&self) -> &DataFrame {
        &self.data
    }

    /// Consumes self and returns the underlying DataFrame.
    pub fn into_inner(self) -> DataFrame {
        self.data
    }

    /// Returns the number of rows.
    pub fn len(&self) -> usize {
        self.data.height()
    }

    /// Returns whether the frame has no rows.
    pub fn is_empty(&self) -> bool {
        self.data.height() == 0
    }

    /// Returns the column names.
    pub fn columns(&self) -> Vec<String> {
        self.data
            .get_column_names()
            .iter()
            .map(|s| s.to_string())
            .collect()
    }

    /// Checks if a column exists.
    pub fn has_column(&self, name: &str) -> bool {
        self.data
            .get_column_names()
            .iter()
            .any(|s| s.as_str() == name)
    }

    /// Gets a column by name.
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.data.column(name).ok()
    }

    /// Fails with [`SagresError::MissingColumn`] naming the first absent column.
    pub fn require_columns(&self, names: &[&str]) -> Result<()> {
        match names.iter().find(|name| !self.has_column(name)) {
            Some(missing) => Err(SagresError::MissingColumn((*missing).to_string())),
            None => Ok(()),
        }
    }
}

impl From<DataFrame> for MarketData {
    fn from(data: DataFrame) -> Self {
        Self::new(data)
    }
}

impl AsRef<DataFrame> for MarketData {
    fn as_ref(&self) -> &DataFrame {
        &self.data
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> MarketData {
        let df = df! {
            "symbol" => &["AAPL", "MSFT"],
            "date" => &["2024-01-02", "2024-01-02"],
            "adjusted_close" => &[185.6, 370.9],
        }
        .unwrap();
        MarketData::from(df)
    }

    #[test]
    fn test_market_data_empty() {
        let market_data = MarketData::new(DataFrame::default());
        assert!(market_data.is_empty());
        assert_eq!(market_data.len(), 0);
    }

    #[test]
    fn test_market_data_columns() {
        let market_data = sample();
        assert_eq!(market_data.len(), 2);
        assert_eq!(market_data.columns().len(), 3);
        assert!(market_data.has_column("symbol"));
        assert!(!market_data.has_column("volume"));
        assert!(market_data.column("date").is_some());
    }

    #[test]
    fn test_require_columns() {
        let market_data = sample();
        assert!(market_data.require_columns(&["symbol", "date"]).is_ok());

        let err = market_data
            .require_columns(&["symbol", "market_cap", "volume"])
            .unwrap_err();
        assert!(matches!(err, SagresError::MissingColumn(ref c) if c == "market_cap"));
    }

    #[test]
    fn test_into_inner() {
        let inner = sample().into_inner();
        assert_eq!(inner.height(), 2);
    }
}
