//! Periodic returns from price series.

use std::collections::BTreeMap;

use sagres_traits::{DegenerateInput, PriceSeries, Result, SagresError, Symbol, TimeSeries};
use tracing::{debug, warn};

/// Simple percentage returns of the adjusted close.
///
/// The first date has no prior period and is defined as exactly `0.0`, so the
/// output always has the same length as the input. A non-positive previous close
/// makes the return undefined; that date gets `0.0` and a degenerate-input warning.
///
/// # Errors
///
/// [`SagresError::InsufficientData`] for fewer than two prices.
///
/// # Example
///
/// ```
/// use sagres_eval::compute_returns;
/// use sagres_traits::{Date, PriceSeries};
///
/// let day = |d| Date::from_ymd_opt(2024, 1, d).unwrap();
/// let prices = PriceSeries::from_closes([(day(2), 100.0), (day(3), 102.0)]).unwrap();
/// let returns = compute_returns(&prices).unwrap();
/// assert_eq!(returns.get(&day(2)), Some(0.0));
/// ```
pub fn compute_returns(prices: &PriceSeries) -> Result<TimeSeries> {
    let bars = prices.bars();
    if bars.len() < 2 {
        return Err(SagresError::insufficient("return calculation", 2, bars.len()));
    }

    let mut returns = TimeSeries::new();
    returns.insert(bars[0].date, 0.0);

    for pair in bars.windows(2) {
        let (prev, curr) = (&pair[0], &pair[1]);
        let ret = if prev.adjusted_close > 0.0 {
            curr.adjusted_close / prev.adjusted_close - 1.0
        } else {
            DegenerateInput::NonPositivePrice.report(&format!("return on {}", curr.date), "0.0");
            0.0
        };
        returns.insert(curr.date, ret);
    }

    Ok(returns)
}

/// Applies [`compute_returns`] to every asset.
///
/// Assets with fewer than two prices are skipped with a warning; the remaining
/// assets are still returned.
///
/// # Errors
///
/// [`SagresError::InsufficientData`] when no asset has a usable series.
pub fn compute_returns_by_asset(
    prices: &BTreeMap<Symbol, PriceSeries>,
) -> Result<BTreeMap<Symbol, TimeSeries>> {
    let mut out = BTreeMap::new();
    for (symbol, series) in prices {
        match compute_returns(series) {
            Ok(returns) => {
                out.insert(symbol.clone(), returns);
            }
            Err(e) => warn!(%symbol, error = %e, "skipping asset"),
        }
    }

    if out.is_empty() {
        return Err(SagresError::insufficient(
            "returns by asset",
            1,
            out.len(),
        ));
    }
    debug!(assets = out.len(), "computed returns");
    Ok(out)
}
