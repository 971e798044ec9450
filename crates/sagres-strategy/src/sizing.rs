//! Position sizing from composite scores.
//!
//! A sizer turns one date's [`CompositeScore`] into signed target weights:
//! positive for long positions, negative for short ones. Each book is weighted by
//! market cap when caps are available and usable, equally otherwise.

use sagres_combine::CompositeScore;
use sagres_eval::cap_weights;
use sagres_traits::{CrossSection, DegenerateInput, Result, SagresError};

use crate::config::{LongOnlyConfig, LongShortConfig, SizingConfig};

/// Builds target positions from scores.
pub trait PositionSizer: Send + Sync {
    /// Sizer name used in logs and results.
    fn name(&self) -> &str;

    /// Signed target weights of the assets to hold.
    ///
    /// # Errors
    ///
    /// [`SagresError::InsufficientData`] when too few assets are scored to fill
    /// any book.
    fn size(&self, scores: &CompositeScore, market_caps: Option<&CrossSection>)
    -> Result<CrossSection>;
}

/// Weights of one book summing to one.
fn book_weights(
    members: &[(String, f64)],
    market_caps: Option<&CrossSection>,
    equal_weight: bool,
    context: &str,
) -> Vec<f64> {
    let caps = if equal_weight { None } else { market_caps };
    caps.and_then(|caps| {
        cap_weights(members.iter().map(|(s, _)| s.as_str()), caps).or_else(|| {
            DegenerateInput::ZeroMarketCap.report(context, "equal weights");
            None
        })
    })
    .unwrap_or_else(|| vec![1.0 / members.len() as f64; members.len()])
}

/// Holds the top-scored fraction of the universe.
#[derive(Debug, Clone, Default)]
pub struct LongOnlySizer {
    config: LongOnlyConfig,
}

impl LongOnlySizer {
    /// Create a sizer with the given configuration.
    pub const fn new(config: LongOnlyConfig) -> Self {
        Self { config }
    }

    /// Number of holdings out of `n` scored assets.
    pub fn selection_count(&self, n: usize) -> usize {
        let by_pct = (n as f64 * self.config.selection_pct).floor() as usize;
        by_pct.max(self.config.min_stocks).min(n)
    }
}

impl PositionSizer for LongOnlySizer {
    fn name(&self) -> &str {
        "long-only"
    }

    fn size(
        &self,
        scores: &CompositeScore,
        market_caps: Option<&CrossSection>,
    ) -> Result<CrossSection> {
        self.config.validate()?;
        let ranked = scores.ranked();
        let count = self.selection_count(ranked.len());
        if count == 0 {
            return Err(SagresError::insufficient("long-only sizing", 1, ranked.len()));
        }

        let selected = &ranked[..count];
        let weights = book_weights(
            selected,
            market_caps,
            self.config.equal_weight,
            &format!("long-only book on {}", scores.date),
        );
        Ok(selected
            .iter()
            .zip(weights)
            .map(|((symbol, _), w)| (symbol.clone(), w))
            .collect())
    }
}

/// Long the top of the ranking, short the bottom.
#[derive(Debug, Clone, Default)]
pub struct LongShortSizer {
    config: LongShortConfig,
}

impl LongShortSizer {
    /// Create a sizer with the given configuration.
    pub const fn new(config: LongShortConfig) -> Self {
        Self { config }
    }

    /// Long and short book sizes out of `n` scored assets.
    pub fn book_sizes(&self, n: usize) -> (usize, usize) {
        let count = |pct: f64| (n as f64 * pct).floor() as usize;
        (count(self.config.long_pct), count(self.config.short_pct))
    }
}

impl PositionSizer for LongShortSizer {
    fn name(&self) -> &str {
        "long-short"
    }

    fn size(
        &self,
        scores: &CompositeScore,
        market_caps: Option<&CrossSection>,
    ) -> Result<CrossSection> {
        self.config.validate()?;
        let ranked = scores.ranked();
        let n = ranked.len();
        let (n_long, n_short) = self.book_sizes(n);
        if n_long == 0 && n_short == 0 {
            let required = (1.0 / self.config.long_pct.max(self.config.short_pct)).ceil() as usize;
            return Err(SagresError::insufficient("long-short sizing", required, n));
        }

        let mut positions = CrossSection::new();
        if n_long > 0 {
            let longs = &ranked[..n_long];
            let weights =
                book_weights(longs, market_caps, false, &format!("long book on {}", scores.date));
            for ((symbol, _), w) in longs.iter().zip(weights) {
                positions.insert(symbol.clone(), w * self.config.long_allocation);
            }
        }
        if n_short > 0 {
            let shorts = &ranked[n - n_short..];
            let weights =
                book_weights(shorts, market_caps, false, &format!("short book on {}", scores.date));
            for ((symbol, _), w) in shorts.iter().zip(weights) {
                positions.insert(symbol.clone(), -w * self.config.short_allocation);
            }
        }
        Ok(positions)
    }
}

/// Sizer for a sizing configuration.
pub fn sizer_for(config: &SizingConfig) -> Box<dyn PositionSizer> {
    match config {
        SizingConfig::LongOnly(c) => Box::new(LongOnlySizer::new(c.clone())),
        SizingConfig::LongShort(c) => Box::new(LongShortSizer::new(c.clone())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use sagres_traits::Date;

    fn scores(n: usize) -> CompositeScore {
        // S0 scores highest.
        CompositeScore {
            date: Date::from_ymd_opt(2024, 5, 31).unwrap(),
            symbols: (0..n).map(|i| format!("S{i}")).collect(),
            scores: (0..n).map(|i| (n - i) as f64).collect(),
        }
    }

    fn total(positions: &CrossSection, long: bool) -> f64 {
        positions
            .values()
            .into_iter()
            .filter(|w| (*w > 0.0) == long)
            .sum()
    }

    #[test]
    fn test_long_only_selection_count() {
        let sizer = LongOnlySizer::default();
        assert_eq!(sizer.selection_count(30), 15);
        assert_eq!(sizer.selection_count(6), 5);
        assert_eq!(sizer.selection_count(3), 3);
        assert_eq!(sizer.selection_count(0), 0);
    }

    #[test]
    fn test_long_only_equal_fallback() {
        let sizer = LongOnlySizer::new(LongOnlyConfig {
            selection_pct: 0.5,
            min_stocks: 2,
            equal_weight: false,
        });
        let positions = sizer.size(&scores(6), None).unwrap();
        assert_eq!(positions.symbols().collect::<Vec<_>>(), vec!["S0", "S1", "S2"]);
        for w in positions.values() {
            assert_relative_eq!(w, 1.0 / 3.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_long_only_cap_weighted() {
        let caps: CrossSection = [("S0", 300.0), ("S1", 100.0), ("S2", f64::NAN)].into_iter().collect();
        let sizer = LongOnlySizer::new(LongOnlyConfig {
            selection_pct: 0.5,
            min_stocks: 1,
            equal_weight: false,
        });
        let positions = sizer.size(&scores(6), Some(&caps)).unwrap();
        assert_relative_eq!(positions.get("S0").unwrap(), 0.75, epsilon = 1e-12);
        assert_relative_eq!(positions.get("S1").unwrap(), 0.25, epsilon = 1e-12);
        assert_eq!(positions.get("S2"), Some(0.0));

        let equal = LongOnlySizer::new(LongOnlyConfig {
            selection_pct: 0.5,
            min_stocks: 1,
            equal_weight: true,
        });
        let positions = equal.size(&scores(6), Some(&caps)).unwrap();
        assert_relative_eq!(positions.get("S0").unwrap(), 1.0 / 3.0, epsilon = 1e-12);
    }

    #[test]
    fn test_long_only_empty_scores() {
        let sizer = LongOnlySizer::default();
        assert!(matches!(
            sizer.size(&scores(0), None),
            Err(SagresError::InsufficientData { .. })
        ));
    }

    #[test]
    fn test_long_short_books() {
        let sizer = LongShortSizer::default();
        assert_eq!(sizer.book_sizes(10), (4, 2));

        let positions = sizer.size(&scores(10), None).unwrap();
        assert_eq!(positions.len(), 6);
        assert_relative_eq!(total(&positions, true), 0.8, epsilon = 1e-12);
        assert_relative_eq!(total(&positions, false), -0.5, epsilon = 1e-12);
        assert!(positions.get("S0").unwrap() > 0.0);
        assert!(positions.get("S9").unwrap() < 0.0);
        assert_eq!(positions.get("S5"), None);
    }

    #[test]
    fn test_long_short_too_few_assets() {
        let sizer = LongShortSizer::default();
        assert!(matches!(
            sizer.size(&scores(2), None),
            Err(SagresError::InsufficientData { required: 3, actual: 2, .. })
        ));
    }

    #[test]
    fn test_sizer_for() {
        assert_eq!(sizer_for(&SizingConfig::default()).name(), "long-only");
        let long_short = SizingConfig::LongShort(LongShortConfig::default());
        assert_eq!(sizer_for(&long_short).name(), "long-short");
    }
}
