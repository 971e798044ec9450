//! Factor-sorted high/low portfolio construction.
//!
//! For every evaluation date the constructor ranks assets by the latest factor
//! cross-section dated strictly before that date, takes the top and bottom buckets,
//! weights them by market cap (or equally) and realizes the bucket returns on the
//! evaluation date. Dates that cannot be evaluated are not zero-filled: they are
//! left out of [`PortfolioReturns::days`] and listed in
//! [`PortfolioReturns::skipped`] with the reason.

use std::collections::{BTreeMap, BTreeSet};

use derive_more::Display;
use rayon::prelude::*;
use sagres_traits::{
    CrossSection, Date, DegenerateInput, FactorPanel, MarketCapPanel, Result, SagresError, Symbol,
    TimeSeries,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// How members of a bucket are weighted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Display, Serialize, Deserialize)]
pub enum Weighting {
    /// Capitalization weights, falling back to equal weights per bucket.
    #[default]
    #[display("market-cap")]
    MarketCap,
    /// Equal weights.
    #[display("equal")]
    Equal,
}

/// Portfolio construction configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PortfolioConfig {
    /// Number of equal-sized buckets the ranked universe is split into
    pub n_groups: usize,
    /// Weighting scheme inside each bucket
    pub weighting: Weighting,
}

impl Default for PortfolioConfig {
    fn default() -> Self {
        Self {
            n_groups: 3,
            weighting: Weighting::MarketCap,
        }
    }
}

impl PortfolioConfig {
    /// Rejects parameters that would make every date meaningless.
    pub fn validate(&self) -> Result<()> {
        if self.n_groups == 0 {
            return Err(SagresError::Configuration(
                "n_groups must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Members, weights and realized return of one bucket.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupHoldings {
    /// Members in rank order
    pub members: Vec<Symbol>,
    /// Weights aligned with `members`, summing to one
    pub weights: Vec<f64>,
    /// Weighted return on the evaluation date
    pub ret: f64,
    /// Whether capitalization weights were used
    pub cap_weighted: bool,
}

/// One evaluated date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortfolioDay {
    /// Evaluation date on which returns are realized
    pub date: Date,
    /// Factor date used for ranking, always earlier than `date`
    pub factor_date: Date,
    /// High-factor bucket return
    pub high_return: f64,
    /// Low-factor bucket return
    pub low_return: f64,
    /// `high_return - low_return`
    pub spread_return: f64,
    /// High bucket detail
    pub high: GroupHoldings,
    /// Low bucket detail
    pub low: GroupHoldings,
}

/// Why an evaluation date produced no portfolio.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Serialize, Deserialize)]
pub enum SkipReason {
    /// No factor cross-section predates the evaluation date.
    #[display("no factor values before the evaluation date")]
    NoPriorFactorDate,
    /// Fewer ranked assets than buckets.
    #[display("{available} ranked assets for {required} groups")]
    TooFewAssets {
        /// Assets with a finite factor value
        available: usize,
        /// Configured number of groups
        required: usize,
    },
}

/// An evaluation date left out of the output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedDate {
    /// The skipped evaluation date
    pub date: Date,
    /// Why it was skipped
    pub reason: SkipReason,
}

/// Output of portfolio construction.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PortfolioReturns {
    /// Evaluated dates in ascending order
    pub days: Vec<PortfolioDay>,
    /// Dates that could not be evaluated, in ascending order
    pub skipped: Vec<SkippedDate>,
}

impl PortfolioReturns {
    /// Number of evaluated dates.
    pub fn len(&self) -> usize {
        self.days.len()
    }

    /// Whether no date was evaluated.
    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }

    /// First and last evaluated dates.
    pub fn date_range(&self) -> Option<(Date, Date)> {
        Some((self.days.first()?.date, self.days.last()?.date))
    }

    /// High bucket returns.
    pub fn high_series(&self) -> TimeSeries {
        self.days.iter().map(|d| (d.date, d.high_return)).collect()
    }

    /// Low bucket returns.
    pub fn low_series(&self) -> TimeSeries {
        self.days.iter().map(|d| (d.date, d.low_return)).collect()
    }

    /// Long-minus-short spread returns.
    pub fn spread_series(&self) -> TimeSeries {
        self.days.iter().map(|d| (d.date, d.spread_return)).collect()
    }
}

/// Builds high/low factor portfolios.
#[derive(Debug, Clone, Default)]
pub struct PortfolioConstructor {
    config: PortfolioConfig,
}

impl PortfolioConstructor {
    /// Create a constructor with the given configuration.
    pub const fn new(config: PortfolioConfig) -> Self {
        Self { config }
    }

    /// The active configuration.
    pub const fn config(&self) -> &PortfolioConfig {
        &self.config
    }

    /// Constructs the portfolios for every evaluation date.
    ///
    /// Evaluation dates are the union of all return dates except the earliest.
    /// Dates are independent and are evaluated in parallel; the output is in date
    /// order and identical for identical inputs.
    ///
    /// # Errors
    ///
    /// [`SagresError::Configuration`] if `n_groups` is zero.
    pub fn construct(
        &self,
        factors: &FactorPanel,
        returns: &BTreeMap<Symbol, TimeSeries>,
        market_caps: Option<&MarketCapPanel>,
    ) -> Result<PortfolioReturns> {
        self.config.validate()?;

        let dates: Vec<Date> = returns
            .values()
            .flat_map(|series| series.dates())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .skip(1)
            .collect();

        let outcomes: Vec<std::result::Result<PortfolioDay, SkippedDate>> = dates
            .par_iter()
            .map(|&date| {
                self.evaluate_date(date, factors, returns, market_caps)
                    .map_err(|reason| SkippedDate { date, reason })
            })
            .collect();

        let mut out = PortfolioReturns::default();
        for outcome in outcomes {
            match outcome {
                Ok(day) => out.days.push(day),
                Err(skipped) => {
                    debug!(date = %skipped.date, reason = %skipped.reason, "skipping date");
                    out.skipped.push(skipped);
                }
            }
        }

        info!(
            evaluated = out.days.len(),
            skipped = out.skipped.len(),
            n_groups = self.config.n_groups,
            weighting = %self.config.weighting,
            "constructed factor portfolios"
        );
        Ok(out)
    }

    fn evaluate_date(
        &self,
        date: Date,
        factors: &FactorPanel,
        returns: &BTreeMap<Symbol, TimeSeries>,
        market_caps: Option<&MarketCapPanel>,
    ) -> std::result::Result<PortfolioDay, SkipReason> {
        let (factor_date, section) = factors
            .latest_before(date)
            .ok_or(SkipReason::NoPriorFactorDate)?;

        let mut ranked: Vec<(&str, f64)> = section.iter().filter(|(_, v)| v.is_finite()).collect();
        let n_groups = self.config.n_groups;
        if ranked.len() < n_groups {
            return Err(SkipReason::TooFewAssets {
                available: ranked.len(),
                required: n_groups,
            });
        }

        // Stable: equal values keep cross-section order.
        ranked.sort_by(|a, b| b.1.total_cmp(&a.1));
        let group_size = ranked.len() / n_groups;
        let high_members = &ranked[..group_size];
        let low_members = &ranked[ranked.len() - group_size..];

        let caps = market_caps
            .and_then(|panel| panel.latest_at_or_before(factor_date))
            .map(|(_, section)| section);

        let high = self.holdings(high_members, caps, returns, date, "high");
        let low = self.holdings(low_members, caps, returns, date, "low");

        Ok(PortfolioDay {
            date,
            factor_date,
            high_return: high.ret,
            low_return: low.ret,
            spread_return: high.ret - low.ret,
            high,
            low,
        })
    }

    fn holdings(
        &self,
        members: &[(&str, f64)],
        caps: Option<&CrossSection>,
        returns: &BTreeMap<Symbol, TimeSeries>,
        date: Date,
        side: &str,
    ) -> GroupHoldings {
        let cap_weights = match (self.config.weighting, caps) {
            (Weighting::MarketCap, Some(caps)) => {
                cap_weights(members.iter().map(|(s, _)| *s), caps).or_else(|| {
                    DegenerateInput::ZeroMarketCap
                        .report(&format!("{side} group on {date}"), "equal weights");
                    None
                })
            }
            _ => None,
        };
        let cap_weighted = cap_weights.is_some();
        let weights =
            cap_weights.unwrap_or_else(|| vec![1.0 / members.len() as f64; members.len()]);

        let ret = members
            .iter()
            .zip(&weights)
            .map(|((symbol, _), w)| {
                let r = returns
                    .get(*symbol)
                    .and_then(|series| series.get(&date))
                    .filter(|r| r.is_finite())
                    .unwrap_or(0.0);
                w * r
            })
            .sum();

        GroupHoldings {
            members: members.iter().map(|(s, _)| (*s).to_string()).collect(),
            weights,
            ret,
            cap_weighted,
        }
    }
}

/// Normalized capitalization weights, `None` when the usable caps sum to zero.
///
/// Missing, negative and non-finite caps count as zero.
pub fn cap_weights<'a>(
    members: impl IntoIterator<Item = &'a str>,
    caps: &CrossSection,
) -> Option<Vec<f64>> {
    let raw: Vec<f64> = members
        .into_iter()
        .map(|symbol| {
            caps.get(symbol)
                .filter(|c| c.is_finite() && *c > 0.0)
                .unwrap_or(0.0)
        })
        .collect();
    let total: f64 = raw.iter().sum();
    (total > 0.0).then(|| raw.into_iter().map(|c| c / total).collect())
}

/// Convenience wrapper around [`PortfolioConstructor::construct`].
pub fn construct_portfolios(
    factors: &FactorPanel,
    returns: &BTreeMap<Symbol, TimeSeries>,
    market_caps: Option<&MarketCapPanel>,
    config: PortfolioConfig,
) -> Result<PortfolioReturns> {
    PortfolioConstructor::new(config).construct(factors, returns, market_caps)
}
