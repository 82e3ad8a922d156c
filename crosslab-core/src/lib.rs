//! CrossLab Core: moving-average crossover backtesting.
//!
//! This crate contains the whole numeric core, with no I/O:
//! - Simple moving averages with NaN-aware rolling windows
//! - Golden cross / death cross detection
//! - Signal generation through a shared position state machine
//! - A single-position, long-only trade simulator with commission and
//!   whole-share rounding
//! - Performance metrics (return, drawdown, win rate, Sharpe)
//! - The end-to-end pipeline producing a serializable report
//!
//! Every run owns its own state; nothing here is global, so independent runs
//! can execute on separate threads without coordination.

pub mod domain;
pub mod engine;
pub mod error;
pub mod indicators;
pub mod metrics;
pub mod pipeline;
pub mod report;
pub mod signals;

pub use domain::{
    PortfolioState, PortfolioStep, Position, PricePoint, PriceSeries, Signal, SignalRow, Trade,
    TradeSide,
};
pub use engine::{run_backtest, ShareRounding, SimulationResult, SkipReason, SkippedEntry};
pub use error::{BacktestError, Result};
pub use indicators::moving_average;
pub use metrics::{compute_metrics, PerformanceMetrics};
pub use pipeline::{run_pipeline, run_pipeline_detailed, BacktestParams, PipelineOutput};
pub use report::{BacktestReport, ChartData, SignalPoint};
pub use signals::{detect_cross_down, detect_cross_up, generate_signals, CrossSummary};
