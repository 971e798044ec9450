//! Two-level standardized weighted combination.

use std::collections::{BTreeMap, HashSet};

use ndarray::Array1;
use sagres_traits::{
    stats, CrossSection, Date, DegenerateInput, Result, SagresError, Symbol,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::combiner::{Combiner, CompositeScore, FactorScore};

/// Configuration for weighted z-score combination.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WeightedZScoreConfig {
    /// Weight per factor name; factors without a weight contribute nothing
    pub weights: BTreeMap<String, f64>,
}

impl WeightedZScoreConfig {
    /// Config from `(name, weight)` pairs.
    pub fn from_pairs<S: Into<String>>(pairs: impl IntoIterator<Item = (S, f64)>) -> Self {
        Self {
            weights: pairs.into_iter().map(|(n, w)| (n.into(), w)).collect(),
        }
    }

    /// Rejects non-finite weights.
    pub fn validate(&self) -> Result<()> {
        match self.weights.iter().find(|(_, w)| !w.is_finite()) {
            Some((name, w)) => Err(SagresError::Configuration(format!(
                "weight of factor '{name}' is not finite: {w}"
            ))),
            None => Ok(()),
        }
    }
}

/// Weighted sum of per-factor z-scores, re-standardized.
///
/// Each factor is z-scored across the universe (sample std; all zeros for a
/// constant cross-section). A missing value is neutral: its z-score is `0.0`.
/// The weighted sum is standardized again when it has non-zero variance and left
/// as is otherwise.
///
/// # Examples
///
/// ```
/// use sagres_combine::{Combiner, FactorScore, WeightedZScoreCombiner, WeightedZScoreConfig};
/// use ndarray::Array1;
///
/// let combiner = WeightedZScoreCombiner::new(WeightedZScoreConfig::from_pairs([("rsi", 1.0)]));
/// let composite = combiner
///     .combine(&[FactorScore {
///         name: "rsi".to_string(),
///         scores: Array1::from_vec(vec![30.0, 50.0, 70.0]),
///     }])
///     .unwrap();
/// assert!((composite[2] - 1.0).abs() < 1e-12);
/// ```
#[derive(Debug, Clone, Default)]
pub struct WeightedZScoreCombiner {
    config: WeightedZScoreConfig,
}

impl WeightedZScoreCombiner {
    /// Create a combiner with the given configuration.
    pub const fn new(config: WeightedZScoreConfig) -> Self {
        Self { config }
    }

    /// Weight of a factor, if any.
    pub fn weight(&self, name: &str) -> Option<f64> {
        self.config.weights.get(name).copied()
    }

    /// Composite score on `date` of the assets named by the weighted factors.
    ///
    /// Factors without a weight are dropped before the universe is built, so they
    /// neither add assets nor move anyone's score. Weighted factors are visited in
    /// name order; the universe is every asset they name, in first-seen order.
    ///
    /// # Errors
    ///
    /// [`SagresError::InsufficientData`] if no supplied factor has a weight.
    pub fn score(
        &self,
        date: Date,
        factors: &BTreeMap<String, CrossSection>,
    ) -> Result<CompositeScore> {
        let weighted: Vec<(&String, &CrossSection)> = factors
            .iter()
            .filter(|(name, _)| self.config.weights.contains_key(*name))
            .collect();

        let mut seen = HashSet::new();
        let mut symbols: Vec<Symbol> = Vec::new();
        for (_, section) in &weighted {
            for symbol in section.symbols() {
                if seen.insert(symbol) {
                    symbols.push(symbol.to_string());
                }
            }
        }

        let aligned: Vec<FactorScore> = weighted
            .iter()
            .map(|(name, section)| FactorScore {
                name: (*name).clone(),
                scores: symbols
                    .iter()
                    .map(|s| section.get(s).unwrap_or(f64::NAN))
                    .collect(),
            })
            .collect();

        let composite = self.combine(&aligned)?;
        Ok(CompositeScore {
            date,
            symbols,
            scores: composite.to_vec(),
        })
    }
}

impl Combiner for WeightedZScoreCombiner {
    fn combine(&self, factors: &[FactorScore]) -> Result<Array1<f64>> {
        self.config.validate()?;
        let Some(first) = factors.first() else {
            return Err(SagresError::insufficient("factor combination", 1, 0));
        };
        let n_assets = first.scores.len();
        if let Some(bad) = factors.iter().find(|f| f.scores.len() != n_assets) {
            return Err(SagresError::InvalidData(format!(
                "factor '{}' has {} assets, expected {}",
                bad.name,
                bad.scores.len(),
                n_assets
            )));
        }

        let mut composite = Array1::<f64>::zeros(n_assets);
        for factor in factors {
            let Some(weight) = self.weight(&factor.name) else {
                debug!(factor = %factor.name, "no weight; factor ignored");
                continue;
            };
            let values = factor.scores.to_vec();
            let (z, result) = stats::standardize(&values);
            if !result.applied {
                DegenerateInput::ZeroVariance
                    .report(&format!("factor {}", factor.name), "zero z-scores");
            }
            let z = Array1::from_iter(z.into_iter().map(|v| if v.is_finite() { v } else { 0.0 }));
            composite.scaled_add(weight, &z);
        }

        let (restandardized, result) = stats::standardize_array(&composite);
        if result.applied {
            composite = restandardized;
        }

        Ok(composite)
    }

    fn name(&self) -> &str {
        "weighted_zscore"
    }
}

/// Composite score of `factors` on `date` using `weights`.
pub fn score(
    date: Date,
    factors: &BTreeMap<String, CrossSection>,
    weights: &BTreeMap<String, f64>,
) -> Result<CompositeScore> {
    WeightedZScoreCombiner::new(WeightedZScoreConfig {
        weights: weights.clone(),
    })
    .score(date, factors)
}
