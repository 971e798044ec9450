//! Core trait definition for factor combiners.

use ndarray::Array1;
use sagres_traits::{CrossSection, Date, Result, Symbol};
use serde::{Deserialize, Serialize};

/// One factor's values over a fixed, ordered universe.
///
/// Missing observations are `NaN`.
#[derive(Debug, Clone)]
pub struct FactorScore {
    /// Factor name, used to look up its weight
    pub name: String,

    /// Values aligned with the universe
    pub scores: Array1<f64>,
}

/// Combines several factor vectors into one composite vector.
///
/// Implementations must be thread-safe so they can be shared by parallel
/// backtests.
pub trait Combiner: Send + Sync {
    /// Combine factor vectors of equal length into a composite.
    ///
    /// # Errors
    ///
    /// Returns an error if no factors are given or their lengths differ.
    fn combine(&self, factors: &[FactorScore]) -> Result<Array1<f64>>;

    /// Name of this combination strategy.
    fn name(&self) -> &str;
}

/// Composite score of a universe on one date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompositeScore {
    /// Scoring date
    pub date: Date,
    /// Universe in first-seen order
    pub symbols: Vec<Symbol>,
    /// Scores aligned with `symbols`
    pub scores: Vec<f64>,
}

impl CompositeScore {
    /// Score of one asset.
    pub fn get(&self, symbol: &str) -> Option<f64> {
        self.symbols
            .iter()
            .position(|s| s == symbol)
            .map(|i| self.scores[i])
    }

    /// Number of scored assets.
    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    /// Whether no asset was scored.
    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    /// Assets sorted by descending score; ties keep universe order.
    pub fn ranked(&self) -> Vec<(Symbol, f64)> {
        let mut ranked: Vec<(Symbol, f64)> = self
            .symbols
            .iter()
            .cloned()
            .zip(self.scores.iter().copied())
            .filter(|(_, v)| v.is_finite())
            .collect();
        ranked.sort_by(|a, b| b.1.total_cmp(&a.1));
        ranked
    }

    /// The scores as a cross-section.
    pub fn to_cross_section(&self) -> CrossSection {
        self.symbols
            .iter()
            .cloned()
            .zip(self.scores.iter().copied())
            .collect()
    }
}
