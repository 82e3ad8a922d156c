//! Trade-execution simulator.
//!
//! Walks the signal table index by index against a single cash/shares
//! account: whole-share entries on BUY, full liquidation on SELL, and a
//! mark-to-market portfolio value recorded after every index.

pub mod simulator;
pub mod sizing;

pub use simulator::{
    run_backtest, run_backtest_with_rounding, validate_account, SimulationResult, SkipReason,
    SkippedEntry,
};
pub use sizing::ShareRounding;
