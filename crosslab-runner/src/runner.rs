//! Backtest runner: wires together config, data loading, and the core pipeline.
//!
//! Two entry points:
//! - `run_single_backtest()`: loads prices per the config, then runs. Used by the CLI.
//! - `run_backtest_from_data()`: takes pre-loaded prices. Used by parameter sweeps.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

use crosslab_core::{
    run_pipeline_detailed, BacktestError, BacktestParams, BacktestReport, CrossSummary,
    SkippedEntry,
};

use crate::config::{BacktestConfig, ConfigError, RunId};
use crate::data_loader::{load_prices, DataSource, LoadError, LoadOptions, LoadedData};
use crate::summary::buy_and_hold_return_pct;

/// Errors from the runner.
#[derive(Debug, Error)]
pub enum RunError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error("data error: {0}")]
    Data(#[from] LoadError),
    #[error("backtest error: {0}")]
    Backtest(#[from] BacktestError),
}

/// Current schema version for persisted artifacts.
pub const SCHEMA_VERSION: u32 = 1;

/// Complete result of a single backtest run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunResult {
    /// Schema version for forward-compatible deserialization.
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,
    pub run_id: RunId,
    pub symbol: String,
    /// First and last date actually present in the data.
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub params: BacktestParams,
    pub source: DataSource,
    pub has_synthetic: bool,
    pub dataset_hash: String,
    pub cross_summary: CrossSummary,
    /// Entries signalled but not filled (no capital, or no price).
    pub skipped_entries: Vec<SkippedEntry>,
    /// Return of holding from the first to the last valid price.
    pub buy_and_hold_return_pct: f64,
    pub report: BacktestReport,
}

/// Default schema version for serde deserialization of older JSON without the field.
fn default_schema_version() -> u32 {
    SCHEMA_VERSION
}

impl RunResult {
    /// Strategy return minus buy-and-hold return, in percentage points.
    pub fn excess_return_pct(&self) -> f64 {
        self.report.performance_metrics.total_return_pct - self.buy_and_hold_return_pct
    }
}

/// Load options implied by a config.
pub fn load_options(config: &BacktestConfig) -> LoadOptions {
    LoadOptions {
        start: config.backtest.start_date,
        end: config.backtest.end_date,
        csv: config.data.csv.clone(),
        synthetic: config.data.synthetic,
    }
}

/// Run a single backtest from a config, loading prices first.
pub fn run_single_backtest(config: &BacktestConfig) -> Result<RunResult, RunError> {
    config.validate()?;
    let loaded = load_prices(&config.backtest.symbol, &load_options(config))?;
    run_backtest_from_data(config, &loaded)
}

/// Run a backtest on pre-loaded prices: no I/O.
pub fn run_backtest_from_data(
    config: &BacktestConfig,
    loaded: &LoadedData,
) -> Result<RunResult, RunError> {
    let params = config.to_params();
    let output = run_pipeline_detailed(&loaded.series, &params)?;
    let symbol = config.backtest.symbol.clone();

    let result = RunResult {
        schema_version: SCHEMA_VERSION,
        run_id: config.run_id(&loaded.dataset_hash),
        start_date: loaded.series.first().map(|p| p.date),
        end_date: loaded.series.last().map(|p| p.date),
        params,
        source: loaded.source,
        has_synthetic: loaded.has_synthetic,
        dataset_hash: loaded.dataset_hash.clone(),
        cross_summary: CrossSummary::from_rows(&output.signals),
        skipped_entries: output.simulation.skipped_entries,
        buy_and_hold_return_pct: buy_and_hold_return_pct(&loaded.series),
        report: output.report,
        symbol,
    };

    let m = &result.report.performance_metrics;
    info!(
        symbol = %result.symbol,
        short = result.params.short_period,
        long = result.params.long_period,
        trades = m.num_trades,
        total_return_pct = m.total_return_pct,
        "backtest complete"
    );
    Ok(result)
}
