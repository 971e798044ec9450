//! Shared trailing-window evaluation over price histories.

use sagres_traits::{FactorContext, FactorPanel, PriceBar};
use tracing::debug;

/// Builds a panel by evaluating `value` at every bar with at least `lookback`
/// earlier bars.
///
/// `value` receives the closes up to and including the current bar. Non-finite
/// outputs are left out of the panel.
pub(crate) fn trailing_panel<F>(
    factor: &str,
    ctx: &FactorContext<'_>,
    lookback: usize,
    value: F,
) -> FactorPanel
where
    F: Fn(&[f64]) -> Option<f64>,
{
    let mut panel = FactorPanel::new();
    for (symbol, prices) in ctx.prices {
        if prices.len() <= lookback {
            debug!(factor, %symbol, bars = prices.len(), lookback, "not enough history");
            continue;
        }
        let closes = prices.closes();
        for (i, bar) in prices.bars().iter().enumerate().skip(lookback) {
            if let Some(v) = value(&closes[..=i]).filter(|v| v.is_finite()) {
                panel.insert_value(bar.date, symbol.clone(), v);
            }
        }
    }
    panel
}

/// Like [`trailing_panel`], but `value` sees the last `lookback + 1` bars
/// (oldest first, current bar last) instead of closes.
pub(crate) fn trailing_bar_panel<F>(
    factor: &str,
    ctx: &FactorContext<'_>,
    lookback: usize,
    value: F,
) -> FactorPanel
where
    F: Fn(&[PriceBar]) -> Option<f64>,
{
    let mut panel = FactorPanel::new();
    for (symbol, prices) in ctx.prices {
        if prices.len() <= lookback {
            debug!(factor, %symbol, bars = prices.len(), lookback, "not enough history");
            continue;
        }
        for window in prices.bars().windows(lookback + 1) {
            let bar = &window[lookback];
            if let Some(v) = value(window).filter(|v| v.is_finite()) {
                panel.insert_value(bar.date, symbol.clone(), v);
            }
        }
    }
    panel
}
