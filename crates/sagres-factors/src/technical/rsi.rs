//! Relative Strength Index.

use sagres_traits::{Factor, FactorCategory, FactorContext, FactorPanel, Result, SagresError};
use serde::{Deserialize, Serialize};

use crate::window::trailing_panel;

/// Configuration for the RSI factor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RsiConfig {
    /// Number of price changes averaged (default: 14)
    pub window: usize,
}

impl Default for RsiConfig {
    fn default() -> Self {
        Self { window: 14 }
    }
}

/// Relative Strength Index with simple moving averages.
///
/// Over the last `window` close-to-close changes, `RS = mean(gains) / mean(losses)`
/// and `RSI = 100 - 100 / (1 + RS)`. A window with no losses scores 100; a window
/// with no movement at all has no value.
#[derive(Debug, Clone)]
pub struct Rsi {
    config: RsiConfig,
}

impl Rsi {
    /// Create a new RSI factor with the given configuration.
    #[must_use]
    pub const fn new(config: RsiConfig) -> Self {
        Self { config }
    }

    /// Get the averaging window.
    #[must_use]
    pub const fn window(&self) -> usize {
        self.config.window
    }
}

impl Default for Rsi {
    fn default() -> Self {
        Self::new(RsiConfig::default())
    }
}

fn rsi(closes: &[f64]) -> Option<f64> {
    let (gain, loss) = closes
        .windows(2)
        .map(|w| w[1] - w[0])
        .fold((0.0, 0.0), |(g, l), delta| {
            if delta > 0.0 { (g + delta, l) } else { (g, l - delta) }
        });
    let n = (closes.len() - 1) as f64;
    let (avg_gain, avg_loss) = (gain / n, loss / n);

    if avg_loss == 0.0 {
        return (avg_gain > 0.0).then_some(100.0);
    }
    let rs = avg_gain / avg_loss;
    Some(100.0 - 100.0 / (1.0 + rs))
}

impl Factor for Rsi {
    fn name(&self) -> &str {
        "rsi"
    }

    fn description(&self) -> &str {
        "Relative Strength Index comparing recent gains to recent losses"
    }

    fn category(&self) -> FactorCategory {
        FactorCategory::Technical
    }

    fn lookback(&self) -> usize {
        self.config.window
    }

    fn compute(&self, ctx: &FactorContext<'_>) -> Result<FactorPanel> {
        let window = self.config.window;
        if window == 0 {
            return Err(SagresError::Configuration(
                "RSI window must be at least 1".to_string(),
            ));
        }
        Ok(trailing_panel(self.name(), ctx, window, |closes| {
            rsi(&closes[closes.len() - 1 - window..])
        }))
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;
    use approx::assert_relative_eq;
    use sagres_traits::{Date, PriceSeries};

    fn day(i: i64) -> Date {
        Date::from_ymd_opt(2024, 1, 1).unwrap() + chrono::Duration::days(i)
    }

    fn prices(closes: &[f64]) -> BTreeMap<String, PriceSeries> {
        let series =
            PriceSeries::from_closes(closes.iter().enumerate().map(|(i, &c)| (day(i as i64), c)))
                .unwrap();
        BTreeMap::from([("A".to_string(), series)])
    }

    #[test]
    fn test_default_window() {
        assert_eq!(Rsi::default().window(), 14);
        assert_eq!(Rsi::default().lookback(), 14);
    }

    #[test]
    fn test_rsi_values() {
        // changes: +1, -0.5, +1
        let prices = prices(&[10.0, 11.0, 10.5, 11.5]);
        let panel = Rsi::new(RsiConfig { window: 2 })
            .compute(&FactorContext::new(&prices))
            .unwrap();

        assert_eq!(panel.len(), 2);
        // gains (1 + 0) / 2, losses (0 + 0.5) / 2, RS = 2
        assert_relative_eq!(
            panel.get(&day(2)).unwrap().get("A").unwrap(),
            100.0 - 100.0 / 3.0,
            epsilon = 1e-9
        );
        assert_relative_eq!(
            panel.get(&day(3)).unwrap().get("A").unwrap(),
            100.0 - 100.0 / 3.0,
            epsilon = 1e-9
        );
    }

    #[test]
    fn test_rsi_bounds() {
        let rising = prices(&[1.0, 2.0, 3.0, 4.0]);
        let panel = Rsi::new(RsiConfig { window: 3 })
            .compute(&FactorContext::new(&rising))
            .unwrap();
        assert_eq!(panel.get(&day(3)).unwrap().get("A"), Some(100.0));

        let falling = prices(&[4.0, 3.0, 2.0, 1.0]);
        let panel = Rsi::new(RsiConfig { window: 3 })
            .compute(&FactorContext::new(&falling))
            .unwrap();
        assert_eq!(panel.get(&day(3)).unwrap().get("A"), Some(0.0));
    }

    #[test]
    fn test_flat_window_has_no_value() {
        let flat = prices(&[5.0, 5.0, 5.0, 5.0]);
        let panel = Rsi::new(RsiConfig { window: 3 })
            .compute(&FactorContext::new(&flat))
            .unwrap();
        assert!(panel.is_empty());
    }
}
