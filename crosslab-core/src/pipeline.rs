//! End-to-end pipeline: prices → signals → simulation → metrics → report.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::domain::{PriceSeries, SignalRow};
use crate::engine::{run_backtest_with_rounding, validate_account, ShareRounding, SimulationResult};
use crate::error::Result;
use crate::metrics::compute_metrics;
use crate::report::{BacktestReport, ChartData};
use crate::signals::{generate_signals, validate_periods};

/// Strategy and account parameters for one run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BacktestParams {
    pub short_period: usize,
    pub long_period: usize,
    pub initial_capital: f64,
    /// Fraction of notional charged per fill (0.001 = 0.1%).
    pub commission: f64,
    #[serde(default = "default_lot_size")]
    pub lot_size: u64,
}

fn default_lot_size() -> u64 {
    1
}

impl Default for BacktestParams {
    fn default() -> Self {
        Self {
            short_period: 50,
            long_period: 200,
            initial_capital: 100_000.0,
            commission: 0.001,
            lot_size: 1,
        }
    }
}

impl BacktestParams {
    /// Check every parameter against a series of `available` prices.
    pub fn validate(&self, available: usize) -> Result<()> {
        validate_periods(self.short_period, self.long_period, available)?;
        validate_account(self.initial_capital, self.commission)?;
        ShareRounding::new(self.lot_size)?;
        Ok(())
    }
}

/// Intermediate products of a run, for callers that need more than the report.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineOutput {
    pub signals: Vec<SignalRow>,
    pub simulation: SimulationResult,
    pub report: BacktestReport,
}

/// Run the full pipeline and return the report.
pub fn run_pipeline(prices: &PriceSeries, params: &BacktestParams) -> Result<BacktestReport> {
    run_pipeline_detailed(prices, params).map(|out| out.report)
}

/// Run the full pipeline and keep the signal table and simulation alongside the report.
pub fn run_pipeline_detailed(
    prices: &PriceSeries,
    params: &BacktestParams,
) -> Result<PipelineOutput> {
    params.validate(prices.len())?;

    let signals = generate_signals(prices, params.short_period, params.long_period)?;
    let simulation = run_backtest_with_rounding(
        &signals,
        prices,
        params.initial_capital,
        params.commission,
        ShareRounding::new(params.lot_size)?,
    )?;

    let values = simulation.values();
    let performance_metrics = compute_metrics(
        &simulation.trades,
        &values,
        params.initial_capital,
        values.len(),
    );
    debug!(
        trades = simulation.trades.len(),
        final_value = performance_metrics.final_portfolio_value,
        "pipeline complete"
    );

    let report = BacktestReport {
        performance_metrics,
        chart_data: ChartData::from_parts(&signals, &simulation),
        trades: simulation.trades.clone(),
    };

    Ok(PipelineOutput {
        signals,
        simulation,
        report,
    })
}
