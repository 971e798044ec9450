//! Per-asset OLS significance test against the factor spread.

use std::collections::BTreeMap;

use ndarray::Array1;
use rayon::prelude::*;
use sagres_traits::{DegenerateInput, Symbol, TimeSeries};
use serde::{Deserialize, Serialize};
use statrs::distribution::{ContinuousCDF, StudentsT};
use tracing::{debug, info};

/// Minimum number of aligned observations for a regression to be reported.
pub const MIN_REGRESSION_OBS: usize = 30;

/// Two-sided confidence level of the slope interval.
pub const CONFIDENCE_LEVEL: f64 = 0.95;

/// Result of regressing an asset's returns on `[1, spread]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RegressionResult {
    /// Intercept
    pub alpha: f64,
    /// Slope on the spread return
    pub beta: f64,
    /// t-statistic of the slope
    pub t_stat: f64,
    /// Two-sided p-value of the slope
    pub p_value: f64,
    /// Coefficient of determination
    pub r_squared: f64,
    /// Lower bound of the 95% slope interval
    pub conf_int_lower: f64,
    /// Upper bound of the 95% slope interval
    pub conf_int_upper: f64,
    /// Number of aligned observations
    pub n_obs: usize,
}

/// Closed-form OLS of `y` on an intercept and `x`.
///
/// Inference uses a Student-t distribution with `n - 2` degrees of freedom.
/// Returns `None` when the slope is not identifiable: fewer than three points,
/// mismatched lengths, or a constant regressor.
pub fn ols(y: &Array1<f64>, x: &Array1<f64>) -> Option<RegressionResult> {
    let n = y.len();
    if n < 3 || x.len() != n {
        return None;
    }

    let x_mean = x.mean()?;
    let y_mean = y.mean()?;
    let x_dev = x - x_mean;
    let y_dev = y - y_mean;

    let sxx = x_dev.dot(&x_dev);
    if !(sxx.is_finite() && sxx > 0.0) {
        return None;
    }
    let sxy = x_dev.dot(&y_dev);
    let sst = y_dev.dot(&y_dev);

    let beta = sxy / sxx;
    let alpha = y_mean - beta * x_mean;

    let residuals = y - &(x * beta) - alpha;
    let sse = residuals.dot(&residuals);
    let r_squared = if sst > 0.0 { 1.0 - sse / sst } else { 0.0 };

    let dof = (n - 2) as f64;
    let se_beta = (sse / dof / sxx).sqrt();
    let dist = StudentsT::new(0.0, 1.0, dof).ok()?;

    let t_stat = if se_beta > 0.0 {
        beta / se_beta
    } else if beta == 0.0 {
        0.0
    } else {
        f64::INFINITY.copysign(beta)
    };
    let p_value = if t_stat.is_finite() {
        (2.0 * dist.sf(t_stat.abs())).min(1.0)
    } else {
        0.0
    };

    let t_crit = dist.inverse_cdf(1.0 - (1.0 - CONFIDENCE_LEVEL) / 2.0);
    let margin = t_crit * se_beta;

    Some(RegressionResult {
        alpha,
        beta,
        t_stat,
        p_value,
        r_squared,
        conf_int_lower: beta - margin,
        conf_int_upper: beta + margin,
        n_obs: n,
    })
}

/// Regresses every asset's returns on the spread series.
///
/// Each asset is aligned with the spread on the intersection of their dates.
/// Assets with fewer than [`MIN_REGRESSION_OBS`] aligned points are absent from
/// the output, as are assets for which the spread is constant over the aligned
/// window. Assets are processed in parallel.
pub fn test_factor(
    returns: &BTreeMap<Symbol, TimeSeries>,
    spread: &TimeSeries,
) -> BTreeMap<Symbol, RegressionResult> {
    let results: BTreeMap<Symbol, RegressionResult> = returns
        .par_iter()
        .filter_map(|(symbol, series)| {
            let aligned = series.intersect(spread);
            if aligned.len() < MIN_REGRESSION_OBS {
                debug!(%symbol, n = aligned.len(), "too few aligned observations");
                return None;
            }

            let y: Array1<f64> = aligned.iter().map(|(_, r, _)| *r).collect();
            let x: Array1<f64> = aligned.iter().map(|(_, _, s)| *s).collect();
            match ols(&y, &x) {
                Some(result) => Some((symbol.clone(), result)),
                None => {
                    DegenerateInput::ZeroVariance
                        .report(&format!("spread regressor for {symbol}"), "asset omitted");
                    None
                }
            }
        })
        .collect();

    info!(
        tested = results.len(),
        assets = returns.len(),
        "ran significance regressions"
    );
    results
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rstest::rstest;
    use sagres_traits::Date;

    fn dates(n: usize) -> Vec<Date> {
        let start = Date::from_ymd_opt(2023, 1, 1).unwrap();
        (0..n)
            .map(|i| start + chrono::Duration::days(i as i64))
            .collect()
    }

    #[test]
    fn test_ols_known_values() {
        let x = Array1::from_vec(vec![1.0, 2.0, 3.0, 4.0, 5.0]);
        let y = Array1::from_vec(vec![3.1, 4.9, 7.1, 8.9, 11.0]);
        let r = ols(&y, &x).unwrap();

        assert_relative_eq!(r.beta, 1.98, epsilon = 1e-12);
        assert_relative_eq!(r.alpha, 1.06, epsilon = 1e-12);
        assert_eq!(r.n_obs, 5);
        assert!(r.r_squared > 0.99 && r.r_squared <= 1.0);
        assert!(r.t_stat > 10.0);
        assert!(r.p_value < 0.001);
        assert!(r.conf_int_lower < r.beta && r.beta < r.conf_int_upper);
        assert_relative_eq!(
            r.beta - r.conf_int_lower,
            r.conf_int_upper - r.beta,
            epsilon = 1e-12
        );
    }

    #[test]
    fn test_ols_t_stat_matches_standard_error() {
        let x = Array1::from_vec(vec![0.0, 1.0, 2.0, 3.0]);
        let y = Array1::from_vec(vec![0.0, 1.0, 1.0, 3.0]);
        let r = ols(&y, &x).unwrap();

        // sxx = 5, sxy = 4.5, beta = 0.9, alpha = -0.1
        // residuals = [0.1, 0.2, -0.7, 0.4], sse = 0.7
        let se = (0.7_f64 / 2.0 / 5.0).sqrt();
        assert_relative_eq!(r.beta, 0.9, epsilon = 1e-12);
        assert_relative_eq!(r.alpha, -0.1, epsilon = 1e-12);
        assert_relative_eq!(r.t_stat, 0.9 / se, epsilon = 1e-9);
        assert_relative_eq!(r.r_squared, 1.0 - 0.7 / 4.75, epsilon = 1e-12);
    }

    #[rstest]
    #[case::constant_regressor(vec![1.0, 1.0, 1.0, 1.0], vec![0.1, 0.2, 0.3, 0.4])]
    #[case::too_short(vec![1.0, 2.0], vec![0.1, 0.2])]
    fn test_ols_unidentifiable(#[case] x: Vec<f64>, #[case] y: Vec<f64>) {
        assert!(ols(&Array1::from_vec(y), &Array1::from_vec(x)).is_none());
    }

    #[test]
    fn test_ols_perfect_fit() {
        let x = Array1::from_vec(vec![1.0, 2.0, 3.0, 4.0]);
        let y = &x * 0.5;
        let r = ols(&y, &x).unwrap();
        assert_relative_eq!(r.beta, 0.5, epsilon = 1e-12);
        assert_relative_eq!(r.r_squared, 1.0, epsilon = 1e-12);
        assert!(r.p_value < 1e-6);
    }

    #[test]
    fn test_ols_constant_response_has_zero_r_squared() {
        let x = Array1::from_vec(vec![1.0, 2.0, 3.0, 4.0]);
        let y = Array1::from_elem(4, 0.01);
        let r = ols(&y, &x).unwrap();
        assert_eq!(r.r_squared, 0.0);
        assert_eq!(r.t_stat, 0.0);
        assert_relative_eq!(r.p_value, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_factor_omits_short_alignment() {
        let days = dates(40);
        let spread: TimeSeries = days
            .iter()
            .enumerate()
            .map(|(i, d)| (*d, ((i * 7 % 11) as f64 - 5.0) / 100.0))
            .collect();

        let mut returns = BTreeMap::new();
        // Full overlap: 40 points.
        returns.insert(
            "LONG".to_string(),
            spread
                .iter()
                .enumerate()
                .map(|(i, (d, s))| (d, 0.001 + 1.5 * s + if i % 2 == 0 { 0.0005 } else { -0.0005 }))
                .collect::<TimeSeries>(),
        );
        // Only 29 overlapping dates.
        returns.insert(
            "SHORT".to_string(),
            spread.iter().take(29).collect::<TimeSeries>(),
        );

        let results = test_factor(&returns, &spread);
        assert!(results.contains_key("LONG"));
        assert!(!results.contains_key("SHORT"));

        let long = results["LONG"];
        assert_eq!(long.n_obs, 40);
        assert!((long.beta - 1.5).abs() < 0.05);
        assert!(long.t_stat > 1.96);
    }

    #[test]
    fn test_factor_constant_spread_is_omitted() {
        let days = dates(35);
        let spread: TimeSeries = days.iter().map(|d| (*d, 0.0)).collect();
        let mut returns = BTreeMap::new();
        returns.insert(
            "A".to_string(),
            days.iter()
                .enumerate()
                .map(|(i, d)| (*d, i as f64 / 100.0))
                .collect::<TimeSeries>(),
        );
        assert!(test_factor(&returns, &spread).is_empty());
    }
}
