//! CrossLab Runner: backtest orchestration around `crosslab-core`.
//!
//! This crate builds on `crosslab-core` to provide:
//! - TOML configuration with content-hashed run ids
//! - CSV price loading with a deterministic synthetic fallback
//! - Single-backtest runner with provenance and crossover summary
//! - An in-memory result store with a "latest" pointer
//! - JSON/CSV artifact export and text summaries
//! - Parallel parameter sweeps over period grids

pub mod config;
pub mod data_loader;
pub mod export;
pub mod runner;
pub mod store;
pub mod summary;
pub mod sweep;

pub use config::{BacktestConfig, ConfigError, RunId};
pub use data_loader::{load_prices, DataSource, LoadError, LoadOptions, LoadedData};
pub use runner::{run_backtest_from_data, run_single_backtest, RunError, RunResult};
pub use store::ResultStore;
pub use summary::{buy_and_hold_return_pct, format_trade_history, generate_summary};
pub use sweep::{run_sweep, ParamGrid, SweepResults};
