//! Composite score command implementation.

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result, bail};
use sagres::combine::{CompositeScore, score};
use sagres::{CrossSection, Date, FactorPanel};
use tracing::{info, warn};

use super::{banner, print_json};
use crate::settings::Settings;
use crate::{OutputFormat, data};

/// Explicit weights win over configured ones; with neither, every factor gets 1.0.
pub(crate) fn resolve_weights(
    explicit: Option<&str>,
    settings: &Settings,
    factors: &BTreeMap<String, FactorPanel>,
) -> Result<BTreeMap<String, f64>> {
    let weights = match explicit {
        Some(spec) => data::parse_weights(spec)?,
        None if !settings.factor_weights.is_empty() => settings.factor_weights.clone(),
        None => {
            info!("no factor weights given; weighting all factors equally");
            factors.keys().map(|name| (name.clone(), 1.0)).collect()
        }
    };
    for name in weights.keys().filter(|n| !factors.contains_key(*n)) {
        warn!(factor = %name, "weighted factor not present in the factor file");
    }
    Ok(weights)
}

/// Snapshot of every weighted factor at or before `date`.
fn snapshots(
    factors: &BTreeMap<String, FactorPanel>,
    weights: &BTreeMap<String, f64>,
    date: Date,
) -> BTreeMap<String, CrossSection> {
    factors
        .iter()
        .filter(|(name, _)| weights.contains_key(*name))
        .filter_map(|(name, panel)| {
            panel
                .latest_at_or_before(date)
                .map(|(_, section)| (name.clone(), section.finite()))
        })
        .collect()
}

/// Composite scores on `date`, by default the latest date of any weighted factor.
pub(crate) fn composite(
    factors: &BTreeMap<String, FactorPanel>,
    weights: &BTreeMap<String, f64>,
    date: Option<Date>,
) -> Result<CompositeScore> {
    let date = match date {
        Some(d) => d,
        None => factors
            .iter()
            .filter(|(name, _)| weights.contains_key(*name))
            .filter_map(|(_, panel)| panel.dates().last())
            .max()
            .context("no weighted factor has any dates")?,
    };
    let sections = snapshots(factors, weights, date);
    if sections.is_empty() {
        bail!("no weighted factor values at or before {date}");
    }
    Ok(score(date, &sections, weights)?)
}

/// Print the ranked composite scores.
pub(crate) fn show_scores(
    settings: &Settings,
    factor_file: &Path,
    weights: Option<&str>,
    date: Option<&str>,
    format: OutputFormat,
) -> Result<()> {
    let factors = data::factors(factor_file)?;
    let weights = resolve_weights(weights, settings, &factors)?;
    let date = date.map(data::parse_date).transpose()?;
    let composite = composite(&factors, &weights, date)?;

    match format {
        OutputFormat::Json => print_json(&composite)?,
        OutputFormat::Text => {
            banner("Composite Scores");
            println!("Date:    {}", composite.date);
            let weights_text: Vec<String> =
                weights.iter().map(|(n, w)| format!("{n}:{w}")).collect();
            println!("Weights: {}", weights_text.join(", "));
            println!("Assets:  {}", composite.len());
            println!();
            println!("  {:>4}  {:10} {:>8}", "Rank", "Symbol", "Score");
            println!("{}", "-".repeat(30));
            for (rank, (symbol, value)) in composite.ranked().into_iter().enumerate() {
                println!("  {:>4}  {:10} {:>8.3}", rank + 1, symbol, value);
            }
            println!();
        }
    }

    Ok(())
}
