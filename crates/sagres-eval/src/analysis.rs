//! End-to-end analysis of one factor.
//!
//! Prices become returns, returns and the factor panel become high/low portfolios,
//! the spread feeds both the per-asset regressions and the performance evaluator.
//! The resulting [`FactorReport`] can be flattened into keyed records and handed
//! to any [`ResultSink`].

use std::collections::BTreeMap;

use derive_more::Display;
use sagres_traits::{
    Date, Factor, FactorContext, FactorPanel, MarketCapPanel, PriceSeries, Result, SagresError,
    Symbol,
};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::performance::{evaluate_portfolio, PerformanceMetrics, PortfolioPerformance};
use crate::portfolio::{PortfolioConfig, PortfolioConstructor, PortfolioReturns};
use crate::regression::{test_factor, RegressionResult};
use crate::returns::compute_returns_by_asset;

/// |t| above which a slope counts as significant.
pub const SIGNIFICANCE_T: f64 = 1.96;

/// Cross-asset summary of the significance regressions.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RegressionSummary {
    /// Mean slope
    pub avg_beta: f64,
    /// Mean t-statistic
    pub avg_t_stat: f64,
    /// Mean R²
    pub avg_r_squared: f64,
    /// Assets with |t| above [`SIGNIFICANCE_T`]
    pub significant_assets: usize,
    /// Assets with a regression result
    pub total_assets: usize,
}

impl RegressionSummary {
    /// Summarizes a set of per-asset results. Averages are NaN when empty.
    pub fn from_results(results: &BTreeMap<Symbol, RegressionResult>) -> Self {
        let n = results.len();
        let avg = |f: fn(&RegressionResult) -> f64| {
            if n == 0 {
                f64::NAN
            } else {
                results.values().map(f).sum::<f64>() / n as f64
            }
        };
        Self {
            avg_beta: avg(|r| r.beta),
            avg_t_stat: avg(|r| r.t_stat),
            avg_r_squared: avg(|r| r.r_squared),
            significant_assets: results
                .values()
                .filter(|r| r.t_stat.abs() > SIGNIFICANCE_T)
                .count(),
            total_assets: n,
        }
    }
}

/// What a record's subject names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Display, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubjectKind {
    /// Portfolio leg (`high`, `low`, `spread`)
    #[display("leg")]
    Leg,
    /// Asset symbol
    #[display("asset")]
    Asset,
}

/// Identity of a persisted record: subject, factor and date range.
///
/// `kind` keeps a leg apart from an asset whose ticker happens to be `high`,
/// `low` or `spread`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Display, Serialize, Deserialize)]
#[display("{kind}:{subject}/{factor_name}/{start}..{end}")]
pub struct RecordKey {
    /// Whether `subject` is a leg or an asset
    pub kind: SubjectKind,
    /// Asset symbol or portfolio leg name
    pub subject: String,
    /// Factor name
    pub factor_name: String,
    /// First evaluated date
    pub start: Date,
    /// Last evaluated date
    pub end: Date,
}

/// Payload of a persisted record.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RecordPayload {
    /// Per-asset regression
    Regression(RegressionResult),
    /// Per-leg performance
    Performance(PerformanceMetrics),
}

/// One keyed result row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultRecord {
    /// Record identity
    pub key: RecordKey,
    /// Record content
    pub payload: RecordPayload,
}

/// Write-only consumer of analysis results.
pub trait ResultSink {
    /// Stores one record.
    fn write(&mut self, record: &ResultRecord) -> Result<()>;
}

/// Sink that keeps records in memory.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    records: Vec<ResultRecord>,
}

impl MemorySink {
    /// Creates an empty sink.
    pub const fn new() -> Self {
        Self {
            records: Vec::new(),
        }
    }

    /// Records written so far.
    pub fn records(&self) -> &[ResultRecord] {
        &self.records
    }
}

impl ResultSink for MemorySink {
    fn write(&mut self, record: &ResultRecord) -> Result<()> {
        self.records.push(record.clone());
        Ok(())
    }
}

/// Complete analysis of one factor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FactorReport {
    /// Factor name
    pub factor_name: String,
    /// First evaluated date
    pub start: Date,
    /// Last evaluated date
    pub end: Date,
    /// High/low portfolios, including skipped dates
    pub portfolio: PortfolioReturns,
    /// Performance of each leg
    pub performance: PortfolioPerformance,
    /// Per-asset regressions on the spread
    pub regressions: BTreeMap<Symbol, RegressionResult>,
    /// Cross-asset regression summary
    pub summary: RegressionSummary,
}

impl FactorReport {
    fn key(&self, kind: SubjectKind, subject: &str) -> RecordKey {
        RecordKey {
            kind,
            subject: subject.to_string(),
            factor_name: self.factor_name.clone(),
            start: self.start,
            end: self.end,
        }
    }

    /// Flattens the report into keyed records: one per portfolio leg, then one per asset.
    pub fn records(&self) -> Vec<ResultRecord> {
        let legs = [
            ("high", &self.performance.high),
            ("low", &self.performance.low),
            ("spread", &self.performance.spread),
        ];
        let mut records: Vec<ResultRecord> = legs
            .into_iter()
            .map(|(leg, report)| ResultRecord {
                key: self.key(SubjectKind::Leg, leg),
                payload: RecordPayload::Performance(report.metrics),
            })
            .collect();
        records.extend(self.regressions.iter().map(|(symbol, result)| ResultRecord {
            key: self.key(SubjectKind::Asset, symbol),
            payload: RecordPayload::Regression(*result),
        }));
        records
    }

    /// Writes every record to `sink`, returning how many were written.
    pub fn publish(&self, sink: &mut dyn ResultSink) -> Result<usize> {
        let records = self.records();
        for record in &records {
            sink.write(record)?;
        }
        Ok(records.len())
    }
}

/// Runs the full pipeline for one factor.
#[derive(Debug, Clone, Default)]
pub struct FactorAnalysis {
    constructor: PortfolioConstructor,
}

impl FactorAnalysis {
    /// Create an analysis with the given portfolio configuration.
    pub const fn new(config: PortfolioConfig) -> Self {
        Self {
            constructor: PortfolioConstructor::new(config),
        }
    }

    /// Analyzes an already computed factor panel.
    ///
    /// # Errors
    ///
    /// - [`SagresError::Configuration`] for invalid portfolio parameters
    /// - [`SagresError::InsufficientData`] if no asset has returns or no date
    ///   could be evaluated
    pub fn run(
        &self,
        factor_name: &str,
        prices: &BTreeMap<Symbol, PriceSeries>,
        factors: &FactorPanel,
        market_caps: Option<&MarketCapPanel>,
    ) -> Result<FactorReport> {
        self.constructor.config().validate()?;
        let returns = compute_returns_by_asset(prices)?;
        let portfolio = self.constructor.construct(factors, &returns, market_caps)?;

        let Some((start, end)) = portfolio.date_range() else {
            return Err(SagresError::insufficient(
                format!("portfolio construction for {factor_name}"),
                1,
                0,
            ));
        };

        let performance = evaluate_portfolio(&portfolio)?;
        let regressions = test_factor(&returns, &portfolio.spread_series());
        let summary = RegressionSummary::from_results(&regressions);

        info!(
            factor = factor_name,
            %start,
            %end,
            spread_sharpe = performance.spread.metrics.sharpe_ratio,
            significant = summary.significant_assets,
            tested = summary.total_assets,
            "factor analysis complete"
        );

        Ok(FactorReport {
            factor_name: factor_name.to_string(),
            start,
            end,
            portfolio,
            performance,
            regressions,
            summary,
        })
    }

    /// Computes `factor` from the context, then analyzes it.
    pub fn run_factor(&self, factor: &dyn Factor, ctx: &FactorContext<'_>) -> Result<FactorReport> {
        let panel = factor.compute(ctx)?;
        self.run(factor.name(), ctx.prices, &panel, ctx.market_caps)
    }
}
