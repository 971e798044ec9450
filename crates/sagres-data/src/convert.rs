//! Long-format frames to typed price histories and panels.
//!
//! Every layout has one row per `(symbol, date)`. Rows with a null symbol, date
//! or value are dropped; a later row for the same `(symbol, date)` replaces an
//! earlier one.

use std::collections::BTreeMap;

use sagres_traits::{
    Date, FactorPanel, MarketCapPanel, MarketData, Panel, PriceBar, PriceSeries, Result,
    SagresError, Symbol,
};
use tracing::{debug, warn};

use crate::columns::{
    self, ADJUSTED_CLOSE, CLOSE, DATE, FACTOR_NAME, MARKET_CAP, SYMBOL, VALUE, VOLUME,
};

/// Price histories from `symbol, date, adjusted_close[, volume]`.
///
/// `close` is accepted when `adjusted_close` is absent. Rows with a non-finite
/// close are dropped with a warning.
///
/// # Errors
///
/// - [`SagresError::MissingColumn`] if a required column is absent
/// - [`SagresError::InvalidDate`] for an unparseable date
/// - [`SagresError::InsufficientData`] if no row survives
pub fn prices_from_frame(data: &MarketData) -> Result<BTreeMap<Symbol, PriceSeries>> {
    let price_column = if data.has_column(ADJUSTED_CLOSE) {
        ADJUSTED_CLOSE
    } else if data.has_column(CLOSE) {
        CLOSE
    } else {
        return Err(SagresError::MissingColumn(ADJUSTED_CLOSE.to_string()));
    };
    data.require_columns(&[SYMBOL, DATE])?;

    let symbols = columns::strings(data, SYMBOL)?;
    let dates = columns::dates(data, DATE)?;
    let closes = columns::floats(data, price_column)?;
    let volumes = if data.has_column(VOLUME) {
        columns::floats(data, VOLUME)?
    } else {
        vec![None; data.len()]
    };

    let mut bars: BTreeMap<Symbol, BTreeMap<Date, PriceBar>> = BTreeMap::new();
    let mut dropped = 0usize;
    for (((symbol, date), close), volume) in symbols.into_iter().zip(dates).zip(closes).zip(volumes)
    {
        let (Some(symbol), Some(date), Some(close)) = (symbol, date, close) else {
            dropped += 1;
            continue;
        };
        if !close.is_finite() {
            warn!(%symbol, %date, close, "dropping non-finite close");
            dropped += 1;
            continue;
        }
        bars.entry(symbol).or_default().insert(
            date,
            PriceBar {
                date,
                adjusted_close: close,
                volume: volume.filter(|v| v.is_finite()),
            },
        );
    }
    if dropped > 0 {
        debug!(dropped, "dropped incomplete price rows");
    }

    let prices: BTreeMap<Symbol, PriceSeries> = bars
        .into_iter()
        .map(|(symbol, bars)| Ok((symbol, PriceSeries::new(bars.into_values().collect())?)))
        .collect::<Result<_>>()?;
    if prices.is_empty() {
        return Err(SagresError::insufficient("price frame", 1, 0));
    }
    Ok(prices)
}

/// A panel from `symbol, date, <value_column>`.
pub fn panel_from_frame(data: &MarketData, value_column: &str) -> Result<Panel> {
    data.require_columns(&[SYMBOL, DATE, value_column])?;
    let symbols = columns::strings(data, SYMBOL)?;
    let dates = columns::dates(data, DATE)?;
    let values = columns::floats(data, value_column)?;

    let mut panel = Panel::new();
    for ((symbol, date), value) in symbols.into_iter().zip(dates).zip(values) {
        if let (Some(symbol), Some(date), Some(value)) = (symbol, date, value) {
            panel.insert_value(date, symbol, value);
        }
    }
    Ok(panel)
}

/// Market caps from `symbol, date, market_cap`.
pub fn market_caps_from_frame(data: &MarketData) -> Result<MarketCapPanel> {
    panel_from_frame(data, MARKET_CAP)
}

/// Factor panels by name from `symbol, date, factor_name, value`.
///
/// Without a `factor_name` column the whole frame is one factor called
/// `default_name`.
pub fn factors_from_frame(
    data: &MarketData,
    default_name: &str,
) -> Result<BTreeMap<String, FactorPanel>> {
    if !data.has_column(FACTOR_NAME) {
        let panel = panel_from_frame(data, VALUE)?;
        return Ok(BTreeMap::from([(default_name.to_string(), panel)]));
    }

    data.require_columns(&[SYMBOL, DATE, VALUE])?;
    let names = columns::strings(data, FACTOR_NAME)?;
    let symbols = columns::strings(data, SYMBOL)?;
    let dates = columns::dates(data, DATE)?;
    let values = columns::floats(data, VALUE)?;

    let mut panels: BTreeMap<String, FactorPanel> = BTreeMap::new();
    for (((name, symbol), date), value) in names.into_iter().zip(symbols).zip(dates).zip(values) {
        if let (Some(name), Some(symbol), Some(date), Some(value)) = (name, symbol, date, value) {
            panels.entry(name).or_default().insert_value(date, symbol, value);
        }
    }
    Ok(panels)
}
