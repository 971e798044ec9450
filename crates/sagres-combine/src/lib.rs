//! Factor score aggregation for sagres.
//!
//! This crate combines several factors observed on the same date into one
//! composite score per asset. Each factor is z-scored across the universe, the
//! z-scores are summed with per-factor weights and the sum is standardized again,
//! so factors on very different raw scales contribute in proportion to their weights.
//!
//! # Examples
//!
//! ```rust,no_run
//! use std::collections::BTreeMap;
//! use sagres_combine::score;
//! use sagres_traits::{CrossSection, Date};
//!
//! let mut factors = BTreeMap::new();
//! factors.insert(
//!     "momentum".to_string(),
//!     [("AAPL", 0.12), ("MSFT", 0.04), ("NVDA", 0.31)].into_iter().collect::<CrossSection>(),
//! );
//! factors.insert(
//!     "rsi".to_string(),
//!     [("AAPL", 61.0), ("MSFT", 44.0), ("NVDA", 72.0)].into_iter().collect::<CrossSection>(),
//! );
//! let weights = BTreeMap::from([("momentum".to_string(), 0.6), ("rsi".to_string(), 0.4)]);
//!
//! let date = Date::from_ymd_opt(2024, 6, 28).unwrap();
//! let composite = score(date, &factors, &weights).unwrap();
//! ```

mod combiner;
mod weighted;

// Re-export main types
pub use combiner::{Combiner, CompositeScore, FactorScore};
pub use weighted::{WeightedZScoreCombiner, WeightedZScoreConfig, score};
