//! CLI subcommand modules.
//!
//! This module contains the implementations for all sagres CLI subcommands.

pub(crate) mod analyze;
pub(crate) mod backtest;
pub(crate) mod factors;
pub(crate) mod score;

use anyhow::Result;
use serde::Serialize;

/// Prints a boxed section title.
pub(crate) fn banner(title: &str) {
    println!("\n╔══════════════════════════════════════════════════════════════╗");
    println!("║{:^62}║", title);
    println!("╚══════════════════════════════════════════════════════════════╝\n");
}

/// Prints `value` as pretty JSON on stdout.
pub(crate) fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Formats a fraction as a signed percentage.
pub(crate) fn pct(value: f64) -> String {
    format!("{:+.2}%", value * 100.0)
}
