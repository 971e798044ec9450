//! Typed time series, cross-sections and panels.
//!
//! Every container is ordered by date and exposes explicit alignment helpers, so
//! consumers never rely on implicit index matching.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::ops::Bound;

use serde::{Deserialize, Serialize};

use crate::{Date, Result, SagresError, Symbol};

/// Ordered mapping from date to a single value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TimeSeries {
    points: BTreeMap<Date, f64>,
}

impl TimeSeries {
    /// Creates an empty series.
    pub const fn new() -> Self {
        Self {
            points: BTreeMap::new(),
        }
    }

    /// Inserts a point, returning the previous value for that date.
    pub fn insert(&mut self, date: Date, value: f64) -> Option<f64> {
        self.points.insert(date, value)
    }

    /// Value on `date`, if observed.
    pub fn get(&self, date: &Date) -> Option<f64> {
        self.points.get(date).copied()
    }

    /// Number of observations.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Whether the series has no observations.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Dates in ascending order.
    pub fn dates(&self) -> impl Iterator<Item = Date> + '_ {
        self.points.keys().copied()
    }

    /// Values in date order.
    pub fn values(&self) -> impl Iterator<Item = f64> + '_ {
        self.points.values().copied()
    }

    /// `(date, value)` pairs in date order.
    pub fn iter(&self) -> impl Iterator<Item = (Date, f64)> + '_ {
        self.points.iter().map(|(d, v)| (*d, *v))
    }

    /// Values collected in date order.
    pub fn to_vec(&self) -> Vec<f64> {
        self.values().collect()
    }

    /// Earliest observation.
    pub fn first(&self) -> Option<(Date, f64)> {
        self.points.first_key_value().map(|(d, v)| (*d, *v))
    }

    /// Latest observation.
    pub fn last(&self) -> Option<(Date, f64)> {
        self.points.last_key_value().map(|(d, v)| (*d, *v))
    }

    /// Points whose date lies in `[start, end]`.
    pub fn between(&self, start: Date, end: Date) -> Self {
        if start > end {
            return Self::new();
        }
        self.points
            .range(start..=end)
            .map(|(d, v)| (*d, *v))
            .collect()
    }

    /// Aligns two series on the intersection of their dates.
    ///
    /// Returns `(date, self_value, other_value)` in ascending date order; dates
    /// present in only one series are dropped.
    pub fn intersect(&self, other: &Self) -> Vec<(Date, f64, f64)> {
        self.points
            .iter()
            .filter_map(|(d, a)| other.points.get(d).map(|b| (*d, *a, *b)))
            .collect()
    }
}

impl FromIterator<(Date, f64)> for TimeSeries {
    fn from_iter<I: IntoIterator<Item = (Date, f64)>>(iter: I) -> Self {
        Self {
            points: iter.into_iter().collect(),
        }
    }
}

/// A single daily price observation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceBar {
    /// Trading date.
    pub date: Date,
    /// Split and dividend adjusted close.
    pub adjusted_close: f64,
    /// Traded volume, when known.
    pub volume: Option<f64>,
}

/// Date-sorted price history of one asset.
///
/// Construction validates that dates are strictly increasing and closes are
/// finite; after that the series is read-only.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PriceSeries {
    bars: Vec<PriceBar>,
}

impl PriceSeries {
    /// Validates and wraps a list of bars.
    ///
    /// # Errors
    ///
    /// - [`SagresError::Configuration`] if dates are not strictly increasing
    /// - [`SagresError::InvalidData`] if a close is not finite
    pub fn new(bars: Vec<PriceBar>) -> Result<Self> {
        for pair in bars.windows(2) {
            if pair[1].date <= pair[0].date {
                return Err(SagresError::Configuration(format!(
                    "price dates must be strictly increasing: {} followed by {}",
                    pair[0].date, pair[1].date
                )));
            }
        }
        if let Some(bad) = bars.iter().find(|b| !b.adjusted_close.is_finite()) {
            return Err(SagresError::InvalidData(format!(
                "non-finite adjusted close on {}",
                bad.date
            )));
        }
        Ok(Self { bars })
    }

    /// Builds a series from `(date, close)` pairs without volume.
    pub fn from_closes(closes: impl IntoIterator<Item = (Date, f64)>) -> Result<Self> {
        Self::new(
            closes
                .into_iter()
                .map(|(date, adjusted_close)| PriceBar {
                    date,
                    adjusted_close,
                    volume: None,
                })
                .collect(),
        )
    }

    /// The validated bars.
    pub fn bars(&self) -> &[PriceBar] {
        &self.bars
    }

    /// Number of bars.
    pub fn len(&self) -> usize {
        self.bars.len()
    }

    /// Whether there are no bars.
    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    /// Adjusted closes in date order.
    pub fn closes(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.adjusted_close).collect()
    }

    /// Adjusted close on `date`, if traded.
    pub fn close_on(&self, date: Date) -> Option<f64> {
        self.bars
            .binary_search_by_key(&date, |b| b.date)
            .ok()
            .map(|i| self.bars[i].adjusted_close)
    }

    /// Latest adjusted close on or before `date`.
    pub fn close_at_or_before(&self, date: Date) -> Option<f64> {
        let idx = self.bars.partition_point(|b| b.date <= date);
        idx.checked_sub(1).map(|i| self.bars[i].adjusted_close)
    }

    /// Adjusted close as a date-keyed series.
    pub fn close_series(&self) -> TimeSeries {
        self.bars
            .iter()
            .map(|b| (b.date, b.adjusted_close))
            .collect()
    }
}

/// One date's values across assets, in insertion order.
///
/// Insertion order is the deterministic tie-break whenever assets are ranked.
/// Lookups by symbol go through a hash index over the ordered entries.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Vec<(Symbol, f64)>", into = "Vec<(Symbol, f64)>")]
pub struct CrossSection {
    entries: Vec<(Symbol, f64)>,
    index: HashMap<Symbol, usize>,
}

impl CrossSection {
    /// Creates an empty cross-section.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the value of `symbol`, keeping its original position if present.
    pub fn insert(&mut self, symbol: impl Into<Symbol>, value: f64) {
        let symbol = symbol.into();
        match self.index.get(&symbol) {
            Some(&i) => self.entries[i].1 = value,
            None => {
                self.index.insert(symbol.clone(), self.entries.len());
                self.entries.push((symbol, value));
            }
        }
    }

    /// Value of `symbol`, if present.
    pub fn get(&self, symbol: &str) -> Option<f64> {
        self.index.get(symbol).map(|&i| self.entries[i].1)
    }

    /// Whether `symbol` has a value.
    pub fn contains(&self, symbol: &str) -> bool {
        self.index.contains_key(symbol)
    }

    /// Number of assets.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the cross-section has no assets.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// `(symbol, value)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> + '_ {
        self.entries.iter().map(|(s, v)| (s.as_str(), *v))
    }

    /// Symbols in insertion order.
    pub fn symbols(&self) -> impl Iterator<Item = &str> + '_ {
        self.entries.iter().map(|(s, _)| s.as_str())
    }

    /// Values in insertion order.
    pub fn values(&self) -> Vec<f64> {
        self.entries.iter().map(|(_, v)| *v).collect()
    }

    /// Copy without non-finite values.
    pub fn finite(&self) -> Self {
        self.entries
            .iter()
            .filter(|(_, v)| v.is_finite())
            .cloned()
            .collect()
    }
}

impl From<Vec<(Symbol, f64)>> for CrossSection {
    fn from(entries: Vec<(Symbol, f64)>) -> Self {
        entries.into_iter().collect()
    }
}

impl From<CrossSection> for Vec<(Symbol, f64)> {
    fn from(section: CrossSection) -> Self {
        section.entries
    }
}

impl<S: Into<Symbol>> FromIterator<(S, f64)> for CrossSection {
    fn from_iter<I: IntoIterator<Item = (S, f64)>>(iter: I) -> Self {
        let mut section = Self::new();
        for (symbol, value) in iter {
            section.insert(symbol, value);
        }
        section
    }
}

/// Sparse date-indexed panel of cross-sections.
///
/// Used for factor values and market capitalizations. Dates need not line up
/// with price dates; lookups go through [`Panel::latest_before`] or
/// [`Panel::latest_at_or_before`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Panel {
    slices: BTreeMap<Date, CrossSection>,
}

/// Panel of factor values.
pub type FactorPanel = Panel;

/// Panel of non-negative market capitalizations.
pub type MarketCapPanel = Panel;

impl Panel {
    /// Creates an empty panel.
    pub const fn new() -> Self {
        Self {
            slices: BTreeMap::new(),
        }
    }

    /// Replaces the cross-section on `date`.
    pub fn insert(&mut self, date: Date, section: CrossSection) {
        self.slices.insert(date, section);
    }

    /// Sets a single `(date, symbol)` value.
    pub fn insert_value(&mut self, date: Date, symbol: impl Into<Symbol>, value: f64) {
        self.slices.entry(date).or_default().insert(symbol, value);
    }

    /// Cross-section on exactly `date`.
    pub fn get(&self, date: &Date) -> Option<&CrossSection> {
        self.slices.get(date)
    }

    /// Latest cross-section dated strictly before `date`.
    pub fn latest_before(&self, date: Date) -> Option<(Date, &CrossSection)> {
        self.slices
            .range((Bound::Unbounded, Bound::Excluded(date)))
            .next_back()
            .map(|(d, s)| (*d, s))
    }

    /// Latest cross-section dated on or before `date`.
    pub fn latest_at_or_before(&self, date: Date) -> Option<(Date, &CrossSection)> {
        self.slices
            .range(..=date)
            .next_back()
            .map(|(d, s)| (*d, s))
    }

    /// Dates in ascending order.
    pub fn dates(&self) -> impl Iterator<Item = Date> + '_ {
        self.slices.keys().copied()
    }

    /// `(date, cross-section)` pairs in ascending date order.
    pub fn iter(&self) -> impl Iterator<Item = (Date, &CrossSection)> + '_ {
        self.slices.iter().map(|(d, s)| (*d, s))
    }

    /// Number of dates.
    pub fn len(&self) -> usize {
        self.slices.len()
    }

    /// Whether the panel has no dates.
    pub fn is_empty(&self) -> bool {
        self.slices.is_empty()
    }

    /// All symbols, in order of first appearance.
    pub fn symbols(&self) -> Vec<Symbol> {
        let mut seen = HashSet::new();
        let mut symbols: Vec<Symbol> = Vec::new();
        for section in self.slices.values() {
            for symbol in section.symbols() {
                if seen.insert(symbol) {
                    symbols.push(symbol.to_string());
                }
            }
        }
        symbols
    }

    /// Values of one symbol through time.
    pub fn series_for(&self, symbol: &str) -> TimeSeries {
        self.slices
            .iter()
            .filter_map(|(d, s)| s.get(symbol).map(|v| (*d, v)))
            .collect()
    }
}

impl FromIterator<(Date, CrossSection)> for Panel {
    fn from_iter<I: IntoIterator<Item = (Date, CrossSection)>>(iter: I) -> Self {
        Self {
            slices: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(day: u32) -> Date {
        Date::from_ymd_opt(2024, 1, day).unwrap()
    }

    #[test]
    fn test_time_series_order_and_intersect() {
        let a: TimeSeries = [(d(3), 0.3), (d(1), 0.1), (d(2), 0.2)].into_iter().collect();
        let b: TimeSeries = [(d(2), 2.0), (d(3), 3.0), (d(4), 4.0)].into_iter().collect();

        assert_eq!(a.dates().collect::<Vec<_>>(), vec![d(1), d(2), d(3)]);
        assert_eq!(a.first(), Some((d(1), 0.1)));
        assert_eq!(a.last(), Some((d(3), 0.3)));
        assert_eq!(
            a.intersect(&b),
            vec![(d(2), 0.2, 2.0), (d(3), 0.3, 3.0)]
        );
        assert_eq!(a.between(d(2), d(9)).len(), 2);
        assert!(a.between(d(3), d(1)).is_empty());
    }

    #[test]
    fn test_price_series_rejects_unsorted_dates() {
        let err = PriceSeries::from_closes([(d(2), 100.0), (d(1), 101.0)]).unwrap_err();
        assert!(matches!(err, SagresError::Configuration(_)));

        let err = PriceSeries::from_closes([(d(1), 100.0), (d(1), 101.0)]).unwrap_err();
        assert!(matches!(err, SagresError::Configuration(_)));
    }

    #[test]
    fn test_price_series_rejects_non_finite_close() {
        let err = PriceSeries::from_closes([(d(1), 100.0), (d(2), f64::NAN)]).unwrap_err();
        assert!(matches!(err, SagresError::InvalidData(_)));
    }

    #[test]
    fn test_price_series_lookup() {
        let prices = PriceSeries::from_closes([(d(1), 100.0), (d(3), 102.0)]).unwrap();
        assert_eq!(prices.len(), 2);
        assert_eq!(prices.close_on(d(3)), Some(102.0));
        assert_eq!(prices.close_on(d(2)), None);
        assert_eq!(prices.close_at_or_before(d(2)), Some(100.0));
        assert_eq!(prices.close_at_or_before(d(9)), Some(102.0));
        assert_eq!(prices.closes(), vec![100.0, 102.0]);
        assert_eq!(prices.close_series().get(&d(1)), Some(100.0));
    }

    #[test]
    fn test_cross_section_keeps_insertion_order() {
        let mut section: CrossSection = [("B", 1.0), ("A", 2.0)].into_iter().collect();
        section.insert("B", 5.0);
        section.insert("C", f64::NAN);

        assert_eq!(section.symbols().collect::<Vec<_>>(), vec!["B", "A", "C"]);
        assert_eq!(section.get("B"), Some(5.0));
        assert_eq!(section.finite().len(), 2);
    }

    #[test]
    fn test_cross_section_index_survives_serde() {
        let symbols: Vec<String> = (0..500).map(|i| format!("S{i:03}")).collect();
        let section: CrossSection = symbols
            .iter()
            .enumerate()
            .map(|(i, s)| (s.clone(), i as f64))
            .collect();
        assert_eq!(section.get("S499"), Some(499.0));
        assert!(section.contains("S000"));
        assert!(!section.contains("S500"));

        let json = serde_json::to_string(&section).unwrap();
        assert!(json.starts_with(r#"[["S000",0.0]"#));
        let back: CrossSection = serde_json::from_str(&json).unwrap();
        assert_eq!(back, section);
        assert_eq!(back.get("S250"), Some(250.0));
    }

    #[test]
    fn test_panel_latest_before_is_strict() {
        let mut panel = Panel::new();
        panel.insert_value(d(1), "A", 1.0);
        panel.insert_value(d(3), "A", 3.0);

        assert!(panel.latest_before(d(1)).is_none());
        assert_eq!(panel.latest_before(d(3)).map(|(date, _)| date), Some(d(1)));
        assert_eq!(panel.latest_before(d(4)).map(|(date, _)| date), Some(d(3)));
        assert_eq!(
            panel.latest_at_or_before(d(3)).map(|(date, _)| date),
            Some(d(3))
        );
    }

    #[test]
    fn test_panel_symbols_and_series() {
        let mut panel = Panel::new();
        panel.insert_value(d(2), "B", 2.0);
        panel.insert_value(d(1), "A", 1.0);
        panel.insert_value(d(2), "A", 1.5);

        assert_eq!(panel.symbols(), vec!["A".to_string(), "B".to_string()]);
        assert_eq!(panel.series_for("A").to_vec(), vec![1.0, 1.5]);
        assert_eq!(panel.len(), 2);
    }

    #[test]
    fn test_time_series_serializes_as_map() {
        let series: TimeSeries = [(d(1), 0.5)].into_iter().collect();
        let json = serde_json::to_string(&series).unwrap();
        assert_eq!(json, r#"{"2024-01-01":0.5}"#);
    }
}
