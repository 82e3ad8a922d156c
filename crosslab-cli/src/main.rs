//! CrossLab CLI: moving-average crossover backtests from the command line.
//!
//! Commands:
//! - `run`: execute one backtest from a TOML config file or from flags
//! - `sweep`: run a grid of (short, long) periods against one price file

mod logging;

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use tracing::debug;

use crosslab_core::BacktestParams;
use crosslab_runner::config::DataSection;
use crosslab_runner::export::{export_json, save_artifacts};
use crosslab_runner::runner::load_options;
use crosslab_runner::{
    format_trade_history, generate_summary, load_prices, run_single_backtest, run_sweep,
    BacktestConfig, ParamGrid,
};

#[derive(Parser)]
#[command(
    name = "crosslab",
    about = "CrossLab CLI: moving-average crossover backtester"
)]
struct Cli {
    /// Log level filter (overridden by RUST_LOG).
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Execute a backtest from a TOML config file or from flags.
    Run(RunArgs),
    /// Run every (short, long) pair of a period grid.
    Sweep(SweepArgs),
}

/// Where prices come from and which dates to keep.
#[derive(Args, Debug)]
struct DataArgs {
    /// Symbol label for the run.
    #[arg(long)]
    symbol: Option<String>,

    /// CSV file with date and close columns.
    #[arg(long)]
    csv: Option<PathBuf>,

    /// Use a synthetic series when no CSV is given.
    #[arg(long, default_value_t = false)]
    synthetic: bool,

    /// Start date (YYYY-MM-DD), inclusive.
    #[arg(long)]
    start: Option<NaiveDate>,

    /// End date (YYYY-MM-DD), inclusive.
    #[arg(long)]
    end: Option<NaiveDate>,
}

/// Account settings shared by both commands.
#[derive(Args, Debug)]
struct AccountArgs {
    /// Initial capital.
    #[arg(long)]
    capital: Option<f64>,

    /// Commission rate per fill (0.001 = 0.1%).
    #[arg(long)]
    commission: Option<f64>,

    /// Shares per lot.
    #[arg(long)]
    lot_size: Option<u64>,
}

#[derive(Args, Debug)]
struct RunArgs {
    /// Path to a TOML config file. Other flags override its values.
    #[arg(long)]
    config: Option<PathBuf>,

    #[command(flatten)]
    data: DataArgs,

    #[command(flatten)]
    account: AccountArgs,

    /// Short moving-average period.
    #[arg(long)]
    short: Option<usize>,

    /// Long moving-average period.
    #[arg(long)]
    long: Option<usize>,

    /// Print the full result as JSON instead of the text summary.
    #[arg(long, default_value_t = false)]
    json: bool,

    /// Also print the trade history.
    #[arg(long, default_value_t = false)]
    trades: bool,

    /// Write result.json, trades.csv and portfolio.csv under this directory.
    #[arg(long)]
    output_dir: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct SweepArgs {
    #[command(flatten)]
    data: DataArgs,

    #[command(flatten)]
    account: AccountArgs,

    /// Short periods, comma separated.
    #[arg(long, value_delimiter = ',', required = true)]
    shorts: Vec<usize>,

    /// Long periods, comma separated.
    #[arg(long, value_delimiter = ',', required = true)]
    longs: Vec<usize>,

    /// Print every result as JSON instead of the table.
    #[arg(long, default_value_t = false)]
    json: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init_logging(&cli.log_level)?;

    match cli.command {
        Commands::Run(args) => run_backtest_cmd(args),
        Commands::Sweep(args) => run_sweep_cmd(args),
    }
}

fn run_backtest_cmd(args: RunArgs) -> Result<()> {
    let mut config = match &args.config {
        Some(path) => BacktestConfig::from_file(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => base_config(&args.data)?,
    };
    apply_data_overrides(&mut config, &args.data);
    apply_account_overrides(&mut config, &args.account);
    if let Some(short) = args.short {
        config.strategy.short_period = short;
    }
    if let Some(long) = args.long {
        config.strategy.long_period = long;
    }
    debug!(config_id = %config.config_id(), "resolved config");

    let result = run_single_backtest(&config)?;

    if args.json {
        println!("{}", export_json(&result)?);
    } else {
        print!("{}", generate_summary(&result));
        if args.trades {
            println!();
            println!("TRADE HISTORY:");
            print!("{}", format_trade_history(&result.report.trades));
        }
    }

    if let Some(dir) = &args.output_dir {
        let run_dir = save_artifacts(&result, dir)?;
        eprintln!("Artifacts saved to: {}", run_dir.display());
    }

    Ok(())
}

fn run_sweep_cmd(args: SweepArgs) -> Result<()> {
    let mut config = base_config(&args.data)?;
    apply_data_overrides(&mut config, &args.data);
    apply_account_overrides(&mut config, &args.account);

    let grid = ParamGrid::new(args.shorts, args.longs);
    if grid.size() == 0 {
        bail!("no valid (short, long) pairs: every short period must be below a long period");
    }
    config.strategy.short_period = grid.pairs()[0].0;
    config.strategy.long_period = grid.pairs()[0].1;
    config.validate()?;

    let loaded = load_prices(&config.backtest.symbol, &load_options(&config))?;
    let sweep = run_sweep(&config, &loaded, &grid)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&sweep.results)?);
        return Ok(());
    }

    println!(
        "Sweep: {} ({} pairs, {} points)",
        config.backtest.symbol,
        sweep.len(),
        loaded.series.len()
    );
    print!("{}", sweep.to_table());
    for (short, long) in &sweep.skipped {
        println!("skipped MA({short}) / MA({long}): not enough data");
    }
    if let Some(best) = sweep.best_by_return() {
        println!(
            "Best return: MA({}) / MA({}) at {:.2}%",
            best.params.short_period,
            best.params.long_period,
            best.report.performance_metrics.total_return_pct
        );
    }
    Ok(())
}

/// Config from flags alone: needs a symbol or a CSV to name the run.
fn base_config(data: &DataArgs) -> Result<BacktestConfig> {
    let symbol = match (&data.symbol, &data.csv) {
        (Some(symbol), _) => symbol.clone(),
        (None, Some(csv)) => csv
            .file_stem()
            .map(|s| s.to_string_lossy().to_uppercase())
            .unwrap_or_else(|| "CSV".to_string()),
        (None, None) if data.synthetic => "SYNTHETIC".to_string(),
        (None, None) => bail!("one of --config, --csv, --symbol with --synthetic is required"),
    };
    Ok(BacktestConfig::new(
        symbol,
        &BacktestParams::default(),
        DataSection::default(),
    ))
}

fn apply_data_overrides(config: &mut BacktestConfig, data: &DataArgs) {
    if let Some(symbol) = &data.symbol {
        config.backtest.symbol = symbol.clone();
    }
    if let Some(csv) = &data.csv {
        config.data.csv = Some(csv.clone());
    }
    if data.synthetic {
        config.data.synthetic = true;
    }
    if data.start.is_some() {
        config.backtest.start_date = data.start;
    }
    if data.end.is_some() {
        config.backtest.end_date = data.end;
    }
}

fn apply_account_overrides(config: &mut BacktestConfig, account: &AccountArgs) {
    if let Some(capital) = account.capital {
        config.account.initial_capital = capital;
    }
    if let Some(commission) = account.commission {
        config.account.commission = commission;
    }
    if let Some(lot_size) = account.lot_size {
        config.account.lot_size = lot_size;
    }
}
