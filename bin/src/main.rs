//! Sagres CLI binary.
//!
//! Lists the registered factors, analyzes factor panels against price histories,
//! scores a universe with a weighted factor composite and backtests factor
//! strategies. Inputs are long-format CSV files.

mod cmd;
mod data;
mod settings;
mod sink;

use std::path::PathBuf;
use std::process;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use crate::settings::Settings;

#[derive(Parser)]
#[command(name = "sagres")]
#[command(about = "Factor research engine for equity returns", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, global = true, default_value = "warn")]
    log_level: String,
}

/// How results are printed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum OutputFormat {
    /// Human-readable tables
    Text,
    /// Pretty-printed JSON
    Json,
}

/// Which position sizer a backtest uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum StrategyKind {
    /// Top-scored assets only
    LongOnly,
    /// Long the top, short the bottom
    LongShort,
}

#[derive(Subcommand)]
enum Commands {
    /// List registered factors
    Factors {
        /// Filter by category
        #[arg(short, long)]
        category: Option<String>,
    },

    /// Analyze a factor: high/low portfolios, significance and performance
    Analyze {
        /// Price file (symbol,date,adjusted_close)
        #[arg(short, long)]
        prices: PathBuf,

        /// Registered factor to compute from the prices
        #[arg(short, long, conflicts_with = "factor_file", required_unless_present = "factor_file")]
        factor: Option<String>,

        /// Precomputed factor file (symbol,date[,factor_name],value)
        #[arg(long)]
        factor_file: Option<PathBuf>,

        /// Market cap file (symbol,date,market_cap)
        #[arg(short, long)]
        market_caps: Option<PathBuf>,

        /// Number of groups the ranked universe is split into
        #[arg(short, long)]
        groups: Option<usize>,

        /// Equal weights inside each group
        #[arg(long)]
        equal_weight: bool,

        /// Output format
        #[arg(long, value_enum, default_value = "text")]
        format: OutputFormat,

        /// Also write keyed result records to this JSON Lines file
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Score a universe with a weighted factor composite
    Score {
        /// Factor file (symbol,date[,factor_name],value)
        #[arg(long)]
        factor_file: PathBuf,

        /// Factor weights as name:weight pairs (e.g. rsi:0.6,momentum:0.4)
        #[arg(short, long)]
        weights: Option<String>,

        /// Scoring date (YYYY-MM-DD, defaults to latest)
        #[arg(short, long)]
        date: Option<String>,

        /// Output format
        #[arg(long, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Backtest a factor strategy
    Backtest {
        /// Price file (symbol,date,adjusted_close)
        #[arg(short, long)]
        prices: PathBuf,

        /// Factor file (symbol,date[,factor_name],value)
        #[arg(long)]
        factor_file: PathBuf,

        /// Market cap file (symbol,date,market_cap)
        #[arg(short, long)]
        market_caps: Option<PathBuf>,

        /// Start date (YYYY-MM-DD)
        #[arg(long)]
        start: String,

        /// End date (YYYY-MM-DD)
        #[arg(long)]
        end: String,

        /// Position sizing
        #[arg(short, long, value_enum, default_value = "long-only")]
        strategy: StrategyKind,

        /// Factor weights as name:weight pairs
        #[arg(short, long)]
        weights: Option<String>,

        /// Rebalance frequency (D, W or M)
        #[arg(short, long)]
        rebalance: Option<String>,

        /// Stop-loss threshold as a fraction of the entry price
        #[arg(long)]
        stop_loss: Option<f64>,

        /// Take-profit threshold as a fraction of the entry price
        #[arg(long)]
        take_profit: Option<f64>,

        /// Output format
        #[arg(long, value_enum, default_value = "text")]
        format: OutputFormat,
    },
}

fn log_level(name: &str) -> Level {
    match name.to_ascii_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "error" => Level::ERROR,
        _ => Level::WARN,
    }
}

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {:#}", e);
        process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level(&cli.log_level))
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let settings = Settings::from_env()?;

    match cli.command {
        Commands::Factors { category } => {
            cmd::factors::list_factors(category.as_deref())?;
        }
        Commands::Analyze {
            prices,
            factor,
            factor_file,
            market_caps,
            groups,
            equal_weight,
            format,
            output,
        } => {
            let source = match (factor, factor_file) {
                (Some(name), _) => cmd::analyze::FactorSource::Registered(name),
                (None, Some(path)) => cmd::analyze::FactorSource::File(path),
                (None, None) => anyhow::bail!("either --factor or --factor-file is required"),
            };
            cmd::analyze::run_analysis(&cmd::analyze::AnalyzeArgs {
                prices,
                source,
                market_caps,
                n_groups: groups.unwrap_or(settings.n_groups),
                equal_weight,
                format,
                output,
            })?;
        }
        Commands::Score {
            factor_file,
            weights,
            date,
            format,
        } => {
            cmd::score::show_scores(
                &settings,
                &factor_file,
                weights.as_deref(),
                date.as_deref(),
                format,
            )?;
        }
        Commands::Backtest {
            prices,
            factor_file,
            market_caps,
            start,
            end,
            strategy,
            weights,
            rebalance,
            stop_loss,
            take_profit,
            format,
        } => {
            cmd::backtest::run_backtest(
                &settings,
                &cmd::backtest::BacktestArgs {
                    prices,
                    factor_file,
                    market_caps,
                    start,
                    end,
                    strategy,
                    weights,
                    rebalance,
                    stop_loss,
                    take_profit,
                    format,
                },
            )?;
        }
    }

    Ok(())
}
