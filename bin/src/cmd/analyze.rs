//! Factor analysis command implementation.

use std::path::PathBuf;

use anyhow::{Context, Result};
use sagres::eval::{FactorAnalysis, FactorReport, PerformanceReport, PortfolioConfig, Weighting};
use sagres::factors::create_factor;
use sagres::FactorContext;
use tracing::info;

use super::{banner, pct, print_json};
use crate::sink::JsonLinesSink;
use crate::{OutputFormat, data};

/// Where the analyzed factor comes from.
#[derive(Debug, Clone)]
pub(crate) enum FactorSource {
    /// Registered factor computed from the prices
    Registered(String),
    /// Precomputed panels, one analysis per factor in the file
    File(PathBuf),
}

#[derive(Debug, Clone)]
pub(crate) struct AnalyzeArgs {
    pub(crate) prices: PathBuf,
    pub(crate) source: FactorSource,
    pub(crate) market_caps: Option<PathBuf>,
    pub(crate) n_groups: usize,
    pub(crate) equal_weight: bool,
    pub(crate) format: OutputFormat,
    pub(crate) output: Option<PathBuf>,
}

/// Analyze one or more factors and print or persist the reports.
pub(crate) fn run_analysis(args: &AnalyzeArgs) -> Result<()> {
    let prices = data::prices(&args.prices)?;
    let caps = data::market_caps(args.market_caps.as_deref())?;
    let config = PortfolioConfig {
        n_groups: args.n_groups,
        weighting: if args.equal_weight {
            Weighting::Equal
        } else {
            Weighting::MarketCap
        },
    };
    let analysis = FactorAnalysis::new(config);

    let reports: Vec<FactorReport> = match &args.source {
        FactorSource::Registered(name) => {
            let factor = create_factor(name)?;
            let mut ctx = FactorContext::new(&prices);
            if let Some(caps) = caps.as_ref() {
                ctx = ctx.with_market_caps(caps);
            }
            vec![analysis
                .run_factor(factor.as_ref(), &ctx)
                .with_context(|| format!("analyzing factor '{name}'"))?]
        }
        FactorSource::File(path) => data::factors(path)?
            .iter()
            .map(|(name, panel)| {
                analysis
                    .run(name, &prices, panel, caps.as_ref())
                    .with_context(|| format!("analyzing factor '{name}'"))
            })
            .collect::<Result<_>>()?,
    };

    if let Some(path) = &args.output {
        let mut sink = JsonLinesSink::create(path)?;
        let mut written = 0;
        for report in &reports {
            written += report.publish(&mut sink)?;
        }
        sink.finish()?;
        info!(path = %path.display(), records = written, "results written");
    }

    match args.format {
        OutputFormat::Json => print_json(&reports)?,
        OutputFormat::Text => {
            for report in &reports {
                print_report(report, &config_label(args));
            }
        }
    }

    Ok(())
}

fn config_label(args: &AnalyzeArgs) -> String {
    let weighting = if args.equal_weight {
        Weighting::Equal
    } else {
        Weighting::MarketCap
    };
    format!("{} groups, {weighting} weighted", args.n_groups)
}

fn print_leg(leg: &str, report: &PerformanceReport) {
    let m = &report.metrics;
    println!(
        "  {:8} {:>10} {:>10} {:>8.2} {:>10} {:>10} {:>8.1}%",
        leg,
        pct(m.annualized_return),
        pct(m.annualized_volatility),
        m.sharpe_ratio,
        pct(m.max_drawdown),
        pct(report.total_return),
        report.win_rate * 100.0
    );
}

fn print_report(report: &FactorReport, config: &str) {
    banner(&format!("Factor Analysis: {}", report.factor_name));

    println!("Period:     {} to {}", report.start, report.end);
    println!("Portfolios: {config}");
    println!(
        "Evaluated:  {} days ({} skipped)",
        report.portfolio.len(),
        report.portfolio.skipped.len()
    );
    println!();

    println!("Performance");
    println!("{}", "-".repeat(78));
    println!(
        "  {:8} {:>10} {:>10} {:>8} {:>10} {:>10} {:>9}",
        "Leg", "Return", "Vol", "Sharpe", "MaxDD", "Total", "Win rate"
    );
    print_leg("high", &report.performance.high);
    print_leg("low", &report.performance.low);
    print_leg("spread", &report.performance.spread);
    println!();

    let summary = &report.summary;
    println!("Significance (asset returns on spread)");
    println!("{}", "-".repeat(78));
    if summary.total_assets == 0 {
        println!("  Not enough overlapping observations for any asset.");
    } else {
        println!("  Avg beta:      {:.4}", summary.avg_beta);
        println!("  Avg t-stat:    {:.2}", summary.avg_t_stat);
        println!("  Avg R²:        {:.4}", summary.avg_r_squared);
        println!(
            "  Significant:   {}/{} assets (|t| > 1.96)",
            summary.significant_assets, summary.total_assets
        );

        let mut ranked: Vec<_> = report.regressions.iter().collect();
        ranked.sort_by(|a, b| b.1.t_stat.abs().total_cmp(&a.1.t_stat.abs()));
        println!();
        println!(
            "  {:10} {:>10} {:>8} {:>8} {:>6}",
            "Symbol", "Beta", "t-stat", "p-value", "Obs"
        );
        for (symbol, r) in ranked.into_iter().take(10) {
            println!(
                "  {:10} {:>10.4} {:>8.2} {:>8.4} {:>6}",
                symbol, r.beta, r.t_stat, r.p_value, r.n_obs
            );
        }
    }
    println!();
}
