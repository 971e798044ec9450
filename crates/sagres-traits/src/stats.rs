//! Statistical helpers shared by factors, the score aggregator and the evaluators.

use ndarray::Array1;

/// Minimum threshold for standard deviation to avoid division by zero.
/// Values below this threshold are treated as zero variance.
pub const MIN_STD_THRESHOLD: f64 = 1e-10;

/// Z-score standardization result containing computed statistics.
#[derive(Debug, Clone, Copy)]
pub struct StandardizeResult {
    /// The computed mean of the input values.
    pub mean: f64,
    /// The computed sample standard deviation (N-1 denominator).
    pub std: f64,
    /// Whether the standardization was applied (false if variance was too low).
    pub applied: bool,
}

/// Arithmetic mean, `None` for an empty slice.
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}

/// Sample standard deviation (N-1 denominator), `None` for fewer than two values.
pub fn sample_std(values: &[f64]) -> Option<f64> {
    let n = values.len();
    if n < 2 {
        return None;
    }
    let m = mean(values)?;
    let variance = values.iter().map(|x| (x - m).powi(2)).sum::<f64>() / (n - 1) as f64;
    Some(variance.sqrt())
}

/// Standardize a slice of f64 values to z-scores (mean=0, std=1).
///
/// Uses the sample standard deviation. Non-finite inputs are excluded from the
/// statistics and stay non-finite in the output. When the standard deviation is
/// below [`MIN_STD_THRESHOLD`] every output is `0.0`.
///
/// # Examples
///
/// ```
/// use sagres_traits::stats::standardize;
///
/// let (z, result) = standardize(&[1.0, 2.0, 3.0]);
/// assert!(result.applied);
/// assert!((z[0] + 1.0).abs() < 1e-10);
/// ```
pub fn standardize(values: &[f64]) -> (Vec<f64>, StandardizeResult) {
    let finite: Vec<f64> = values.iter().filter(|x| x.is_finite()).copied().collect();

    let Some(mean) = mean(&finite) else {
        return (
            vec![f64::NAN; values.len()],
            StandardizeResult {
                mean: f64::NAN,
                std: f64::NAN,
                applied: false,
            },
        );
    };
    let std = sample_std(&finite).unwrap_or(0.0);
    let applied = std > MIN_STD_THRESHOLD;

    let standardized = if applied {
        values.iter().map(|x| (x - mean) / std).collect()
    } else {
        vec![0.0; values.len()]
    };

    (standardized, StandardizeResult { mean, std, applied })
}

/// Standardize an ndarray vector to z-scores (sample std, ddof=1).
///
/// Returns zeros when the standard deviation is below [`MIN_STD_THRESHOLD`].
pub fn standardize_array(scores: &Array1<f64>) -> (Array1<f64>, StandardizeResult) {
    if scores.len() < 2 {
        return (
            Array1::zeros(scores.len()),
            StandardizeResult {
                mean: scores.mean().unwrap_or(f64::NAN),
                std: 0.0,
                applied: false,
            },
        );
    }

    let mean = scores.mean().unwrap_or(0.0);
    let std = scores.std(1.0);
    let applied = std > MIN_STD_THRESHOLD;

    let standardized = if applied {
        (scores - mean) / std
    } else {
        Array1::zeros(scores.len())
    };

    (standardized, StandardizeResult { mean, std, applied })
}
