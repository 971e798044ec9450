//! Error types for the Sagres workspace.
//!
//! Hard failures are returned as [`SagresError`]. Degenerate inputs that have a
//! documented fallback (constant cross-sections, zero market cap, zero volatility)
//! are not errors: they are reported through [`DegenerateInput::report`] and the
//! computation continues with the fallback value.

use derive_more::Display;
use thiserror::Error;

/// The main error type for Sagres operations.
#[derive(Debug, Error)]
pub enum SagresError {
    /// Fewer observations than a computation needs to be meaningful.
    #[error("Insufficient data for {context}: required {required}, got {actual}")]
    InsufficientData {
        /// What was being computed.
        context: String,
        /// Minimum number of observations.
        required: usize,
        /// Number of observations available.
        actual: usize,
    },

    /// Invalid parameters or malformed input shape, raised before any work is done.
    #[error("Invalid configuration: {0}")]
    Configuration(String),

    /// Error due to invalid or malformed data values.
    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// Error when a required column is missing from tabular data.
    #[error("Missing required column: {0}")]
    MissingColumn(String),

    /// Error from Polars operations.
    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    /// Error when a factor name is not registered.
    #[error("Factor not found: {0}")]
    FactorNotFound(String),

    /// Error during factor computation.
    #[error("Factor computation failed: {0}")]
    FactorComputation(String),

    /// Error when a date is out of range or cannot be parsed.
    #[error("Invalid date: {0}")]
    InvalidDate(String),

    /// Generic error for other cases.
    #[error("Error: {0}")]
    Other(String),
}

impl SagresError {
    /// Shorthand for [`SagresError::InsufficientData`].
    pub fn insufficient(context: impl Into<String>, required: usize, actual: usize) -> Self {
        Self::InsufficientData {
            context: context.into(),
            required,
            actual,
        }
    }
}

impl From<String> for SagresError {
    fn from(s: String) -> Self {
        Self::Other(s)
    }
}

impl From<&str> for SagresError {
    fn from(s: &str) -> Self {
        Self::Other(s.to_string())
    }
}

/// A specialized Result type for Sagres operations.
pub type Result<T> = std::result::Result<T, SagresError>;

/// Non-fatal degenerate input, resolved by a documented fallback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum DegenerateInput {
    /// A cross-section or series has zero variance.
    #[display("zero variance")]
    ZeroVariance,
    /// Capitalizations of a group are missing or sum to zero.
    #[display("zero total market cap")]
    ZeroMarketCap,
    /// A return series has zero volatility.
    #[display("zero volatility")]
    ZeroVolatility,
    /// A price used as a return denominator is not positive.
    #[display("non-positive price")]
    NonPositivePrice,
}

impl DegenerateInput {
    /// Log the condition and the fallback taken.
    pub fn report(self, context: &str, fallback: &str) {
        tracing::warn!(kind = %self, context, fallback, "degenerate input");
    }
}
