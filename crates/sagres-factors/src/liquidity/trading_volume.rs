//! Relative trading volume.

use sagres_traits::{Factor, FactorCategory, FactorContext, FactorPanel, Result, SagresError};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::window::trailing_bar_panel;

/// Configuration for the trading volume factor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TradingVolumeConfig {
    /// Number of prior sessions in the reference average (default: 20)
    pub window: usize,
}

impl Default for TradingVolumeConfig {
    fn default() -> Self {
        Self { window: 20 }
    }
}

/// Today's volume over the average volume of the prior `window` sessions.
///
/// A value of 1.0 is an ordinary day. No value is produced on a date whose
/// window has a missing volume or a non-positive average.
#[derive(Debug, Clone)]
pub struct TradingVolume {
    config: TradingVolumeConfig,
}

impl TradingVolume {
    /// Create a new trading volume factor with the given configuration.
    #[must_use]
    pub const fn new(config: TradingVolumeConfig) -> Self {
        Self { config }
    }
}

impl Default for TradingVolume {
    fn default() -> Self {
        Self::new(TradingVolumeConfig::default())
    }
}

impl Factor for TradingVolume {
    fn name(&self) -> &str {
        "trading_volume"
    }

    fn description(&self) -> &str {
        "Daily volume relative to its trailing average"
    }

    fn category(&self) -> FactorCategory {
        FactorCategory::Liquidity
    }

    fn lookback(&self) -> usize {
        self.config.window
    }

    fn compute(&self, ctx: &FactorContext<'_>) -> Result<FactorPanel> {
        let window = self.config.window;
        if window == 0 {
            return Err(SagresError::Configuration(
                "trading volume window must be at least 1".to_string(),
            ));
        }
        let panel = trailing_bar_panel(self.name(), ctx, window, |bars| {
            let volumes = bars.iter().map(|b| b.volume).collect::<Option<Vec<f64>>>()?;
            let (today, prior) = volumes.split_last()?;
            let average = prior.iter().sum::<f64>() / prior.len() as f64;
            (average > 0.0).then(|| today / average)
        });
        if panel.is_empty() && !ctx.prices.is_empty() {
            warn!(factor = self.name(), "no volume data; factor panel is empty");
        }
        Ok(panel)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;
    use approx::assert_relative_eq;
    use sagres_traits::{Date, PriceBar, PriceSeries};

    fn day(d: u32) -> Date {
        Date::from_ymd_opt(2024, 5, d).unwrap()
    }

    fn series(volumes: &[Option<f64>]) -> PriceSeries {
        PriceSeries::new(
            volumes
                .iter()
                .enumerate()
                .map(|(i, &volume)| PriceBar {
                    date: day(i as u32 + 1),
                    adjusted_close: 100.0,
                    volume,
                })
                .collect(),
        )
        .unwrap()
    }

    #[test]
    fn test_relative_to_prior_average() {
        let prices = BTreeMap::from([(
            "X".to_string(),
            series(&[Some(100.0), Some(300.0), Some(400.0), Some(100.0)]),
        )]);
        let factor = TradingVolume::new(TradingVolumeConfig { window: 2 });
        let panel = factor.compute(&FactorContext::new(&prices)).unwrap();

        assert_eq!(panel.len(), 2);
        assert!(panel.get(&day(2)).is_none());
        let x = panel.series_for("X");
        assert_relative_eq!(x.get(&day(3)).unwrap(), 2.0, epsilon = 1e-12);
        assert_relative_eq!(x.get(&day(4)).unwrap(), 100.0 / 350.0, epsilon = 1e-12);
    }

    #[test]
    fn test_missing_or_zero_volume_gives_no_value() {
        let prices = BTreeMap::from([
            (
                "GAP".to_string(),
                series(&[Some(100.0), None, Some(200.0), Some(100.0), Some(450.0)]),
            ),
            ("ZERO".to_string(), series(&[Some(0.0), Some(0.0), Some(50.0), Some(25.0)])),
            ("NONE".to_string(), series(&[None, None, None, None])),
        ]);
        let factor = TradingVolume::new(TradingVolumeConfig { window: 2 });
        let panel = factor.compute(&FactorContext::new(&prices)).unwrap();

        // GAP only recovers once the missing bar leaves the window.
        let gap = panel.series_for("GAP");
        assert_eq!(gap.dates().collect::<Vec<_>>(), vec![day(5)]);
        assert_relative_eq!(gap.get(&day(5)).unwrap(), 3.0, epsilon = 1e-12);
        // ZERO: the window before day 3 averages 0.
        assert_eq!(panel.series_for("ZERO").dates().collect::<Vec<_>>(), vec![day(4)]);
        assert!(panel.series_for("NONE").is_empty());
    }

    #[test]
    fn test_zero_window_rejected() {
        let prices = BTreeMap::new();
        let factor = TradingVolume::new(TradingVolumeConfig { window: 0 });
        assert!(matches!(
            factor.compute(&FactorContext::new(&prices)),
            Err(SagresError::Configuration(_))
        ));
    }
}
