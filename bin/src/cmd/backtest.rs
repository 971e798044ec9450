//! Backtest command implementation.

use std::collections::BTreeMap;
use std::path::PathBuf;

use anyhow::{Context, Result};
use sagres::strategy::{SizingConfig, StrategyBacktest, StrategyConfig, StrategyResult};

use super::score::resolve_weights;
use super::{banner, pct, print_json};
use crate::settings::Settings;
use crate::{OutputFormat, StrategyKind, data};

#[derive(Debug, Clone)]
pub(crate) struct BacktestArgs {
    pub(crate) prices: PathBuf,
    pub(crate) factor_file: PathBuf,
    pub(crate) market_caps: Option<PathBuf>,
    pub(crate) start: String,
    pub(crate) end: String,
    pub(crate) strategy: StrategyKind,
    pub(crate) weights: Option<String>,
    pub(crate) rebalance: Option<String>,
    pub(crate) stop_loss: Option<f64>,
    pub(crate) take_profit: Option<f64>,
    pub(crate) format: OutputFormat,
}

/// Strategy configuration from settings with command-line overrides.
fn strategy_config(
    settings: &Settings,
    args: &BacktestArgs,
    factor_weights: BTreeMap<String, f64>,
) -> Result<StrategyConfig> {
    let rebalance = match &args.rebalance {
        Some(freq) => freq.parse().context("invalid --rebalance")?,
        None => settings.rebalance,
    };
    let sizing = match args.strategy {
        StrategyKind::LongOnly => SizingConfig::LongOnly(settings.long_only.clone()),
        StrategyKind::LongShort => SizingConfig::LongShort(settings.long_short.clone()),
    };
    let mut risk = settings.risk;
    if args.stop_loss.is_some() {
        risk.stop_loss = args.stop_loss;
    }
    if args.take_profit.is_some() {
        risk.take_profit = args.take_profit;
    }

    let config = StrategyConfig {
        factor_weights,
        rebalance,
        sizing,
        risk,
    };
    config.validate()?;
    Ok(config)
}

/// Run a factor strategy backtest over the given period.
pub(crate) fn run_backtest(settings: &Settings, args: &BacktestArgs) -> Result<()> {
    let start = data::parse_date(&args.start)?;
    let end = data::parse_date(&args.end)?;
    let prices = data::prices(&args.prices)?;
    let factors = data::factors(&args.factor_file)?;
    let caps = data::market_caps(args.market_caps.as_deref())?;

    let weights = resolve_weights(args.weights.as_deref(), settings, &factors)?;
    let config = strategy_config(settings, args, weights)?;
    let result = StrategyBacktest::new(config.clone())?.run(
        start,
        end,
        &prices,
        &factors,
        caps.as_ref(),
    )?;

    match args.format {
        OutputFormat::Json => print_json(&result)?,
        OutputFormat::Text => print_result(&config, &result),
    }
    Ok(())
}

fn print_result(config: &StrategyConfig, result: &StrategyResult) {
    banner("Strategy Backtest");

    println!("Strategy:   {}", result.strategy);
    println!("Period:     {} to {}", result.start, result.end);
    println!("Rebalance:  {}", config.rebalance);
    let weights: Vec<String> = config
        .factor_weights
        .iter()
        .map(|(n, w)| format!("{n}:{w}"))
        .collect();
    println!("Weights:    {}", weights.join(", "));
    println!(
        "Rebalances: {} ({} skipped)",
        result.rebalances.len(),
        result.skipped.len()
    );
    println!();

    let perf = &result.performance;
    let m = &perf.metrics;
    println!("Performance");
    println!("{}", "-".repeat(60));
    println!("  Trading days:      {}", perf.n_periods);
    println!("  Total return:      {}", pct(perf.total_return));
    println!("  Annualized return: {}", pct(m.annualized_return));
    println!("  Annualized vol:    {}", pct(m.annualized_volatility));
    println!("  Sharpe ratio:      {:.2}", m.sharpe_ratio);
    println!("  Max drawdown:      {}", pct(m.max_drawdown));
    println!("  Win rate:          {:.1}%", perf.win_rate * 100.0);
    println!();

    if !result.exits.is_empty() {
        println!("Risk exits");
        println!("{}", "-".repeat(60));
        for exit in &result.exits {
            println!(
                "  {} {:10} {:12} {}",
                exit.date,
                exit.symbol,
                exit.kind.to_string(),
                pct(exit.price_return)
            );
        }
        println!();
    }

    if let Some(last) = result.rebalances.last() {
        println!("Positions from {}", last.date);
        println!("{}", "-".repeat(60));
        let mut positions: Vec<(&str, f64)> = last.positions.iter().collect();
        positions.sort_by(|a, b| b.1.total_cmp(&a.1));
        for (symbol, weight) in positions {
            println!("  {:10} {:>9}", symbol, pct(weight));
        }
        println!();
    }

    for skip in &result.skipped {
        println!("Skipped {}: {}", skip.date, skip.reason);
    }
}
