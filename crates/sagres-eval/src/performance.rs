//! Risk-adjusted performance of a return series.
//!
//! Every metric is derived from the same cumulative path `prod(1 + r)`, so the
//! annualized return, Sharpe ratio and drawdown always agree with each other.

use sagres_traits::{stats, DegenerateInput, Result, SagresError, TimeSeries};
use serde::{Deserialize, Serialize};

use crate::portfolio::PortfolioReturns;

/// Trading periods per year used for annualization.
pub const TRADING_DAYS_PER_YEAR: f64 = 252.0;

/// Annual risk-free rate subtracted in the Sharpe ratio.
pub const RISK_FREE_RATE: f64 = 0.02;

/// Headline metrics of a return series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PerformanceMetrics {
    /// Geometric annualized return, `-1.0` after a total loss
    pub annualized_return: f64,
    /// Sample standard deviation scaled by `sqrt(252)`
    pub annualized_volatility: f64,
    /// `(annualized_return - 0.02) / annualized_volatility`, `0.0` at zero volatility
    pub sharpe_ratio: f64,
    /// Largest peak-to-trough decline, never positive
    pub max_drawdown: f64,
}

/// Metrics plus the path they were derived from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceReport {
    /// Headline metrics
    pub metrics: PerformanceMetrics,
    /// Final cumulative value minus one
    pub total_return: f64,
    /// Fraction of periods with a strictly positive return
    pub win_rate: f64,
    /// Number of periods
    pub n_periods: usize,
    /// Cumulative growth of one unit
    pub cumulative: Vec<f64>,
}

/// Performance of the high, low and spread legs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortfolioPerformance {
    /// High-factor bucket
    pub high: PerformanceReport,
    /// Low-factor bucket
    pub low: PerformanceReport,
    /// Long-minus-short spread
    pub spread: PerformanceReport,
}

/// Running product of `1 + r`.
pub fn cumulative_returns(returns: &[f64]) -> Vec<f64> {
    returns
        .iter()
        .scan(1.0, |acc, r| {
            *acc *= 1.0 + r;
            Some(*acc)
        })
        .collect()
}

/// Minimum of `cumulative / running_max - 1`.
///
/// The running maximum starts at the first cumulative value. Returns `0.0` for a
/// non-decreasing path.
pub fn max_drawdown(cumulative: &[f64]) -> f64 {
    let mut peak = f64::NEG_INFINITY;
    let mut worst = 0.0_f64;
    for &value in cumulative {
        peak = peak.max(value);
        if peak > 0.0 {
            worst = worst.min(value / peak - 1.0);
        }
    }
    worst
}

/// Full report for a slice of periodic returns.
///
/// # Errors
///
/// [`SagresError::InsufficientData`] for fewer than two returns, where the sample
/// volatility is undefined.
pub fn report(returns: &[f64]) -> Result<PerformanceReport> {
    let n = returns.len();
    let volatility = stats::sample_std(returns)
        .ok_or_else(|| SagresError::insufficient("performance evaluation", 2, n))?;
    let annualized_volatility = volatility * TRADING_DAYS_PER_YEAR.sqrt();

    let cumulative = cumulative_returns(returns);
    let final_value = cumulative.last().copied().unwrap_or(1.0);
    let years = n as f64 / TRADING_DAYS_PER_YEAR;

    let annualized_return = if final_value > 0.0 {
        final_value.powf(1.0 / years) - 1.0
    } else {
        -1.0
    };

    // Volatility at or below MIN_STD_THRESHOLD is floating-point noise on a flat path.
    let sharpe_ratio = if annualized_volatility > stats::MIN_STD_THRESHOLD {
        (annualized_return - RISK_FREE_RATE) / annualized_volatility
    } else {
        DegenerateInput::ZeroVolatility.report("sharpe ratio", "0.0");
        0.0
    };

    let wins = returns.iter().filter(|r| **r > 0.0).count();

    Ok(PerformanceReport {
        metrics: PerformanceMetrics {
            annualized_return,
            annualized_volatility,
            sharpe_ratio,
            max_drawdown: max_drawdown(&cumulative),
        },
        total_return: final_value - 1.0,
        win_rate: wins as f64 / n as f64,
        n_periods: n,
        cumulative,
    })
}

/// Headline metrics for a slice of periodic returns.
///
/// # Example
///
/// ```
/// use sagres_eval::evaluate;
///
/// let metrics = evaluate(&[0.0, 0.02, -0.0098, 0.0396]).unwrap();
/// assert!(metrics.max_drawdown <= 0.0);
/// ```
pub fn evaluate(returns: &[f64]) -> Result<PerformanceMetrics> {
    Ok(report(returns)?.metrics)
}

/// Report for a date-keyed return series.
pub fn evaluate_series(returns: &TimeSeries) -> Result<PerformanceReport> {
    report(&returns.to_vec())
}

/// Evaluates the high, low and spread legs independently.
pub fn evaluate_portfolio(portfolio: &PortfolioReturns) -> Result<PortfolioPerformance> {
    Ok(PortfolioPerformance {
        high: evaluate_series(&portfolio.high_series())?,
        low: evaluate_series(&portfolio.low_series())?,
        spread: evaluate_series(&portfolio.spread_series())?,
    })
}
