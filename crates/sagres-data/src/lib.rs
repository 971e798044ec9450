//! Tabular data adapters for sagres.
//!
//! The engine works on typed per-asset series and date-keyed panels. This crate
//! converts long-format polars frames (one row per symbol and date) into those
//! types, validating required columns up front:
//!
//! | layout       | columns                                      |
//! |--------------|----------------------------------------------|
//! | prices       | `symbol, date, adjusted_close[, volume]`     |
//! | factors      | `symbol, date[, factor_name], value`         |
//! | market caps  | `symbol, date, market_cap`                   |

pub mod columns;
mod convert;
mod reader;

pub use convert::{factors_from_frame, market_caps_from_frame, panel_from_frame, prices_from_frame};
pub use reader::{load_factors, load_market_caps, load_prices, read_csv};
