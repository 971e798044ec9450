//! Factor implementations for sagres.
//!
//! This crate provides concrete price-based factors:
//! - Momentum: short-term (1 month) and long-term (12 months, skipping the last month)
//! - Technical: RSI and rate of change
//! - Liquidity: volume relative to its trailing average
//!
//! plus [`PrecomputedFactor`] for panels produced elsewhere. Each factor emits a
//! value on every date where an asset has a full lookback window, using only
//! bars up to and including that date.
//!
//! # Example
//!
//! ```ignore
//! use sagres_factors::registry::{available_factors, create_factor};
//! use sagres_traits::FactorContext;
//!
//! let rsi = create_factor("rsi")?;
//! let panel = rsi.compute(&FactorContext::new(&prices))?;
//!
//! for info in available_factors() {
//!     println!("{}: {}", info.name, info.description);
//! }
//! ```

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]

pub mod liquidity;
pub mod momentum;
mod precomputed;
pub mod registry;
pub mod technical;
mod window;

// Re-export key types
pub use precomputed::PrecomputedFactor;
pub use registry::{FactorInfo, available_factors, create_factor, get_factor_info};
