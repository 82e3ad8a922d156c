//! Crossover detection and signal generation.
//!
//! A golden cross (short MA moves from at-or-below to strictly above the long
//! MA) is the entry event; a death cross is the exit event. The generator
//! folds both event streams through the shared [`Position`](crate::domain::Position)
//! state machine so that at most one position is ever open.

pub mod crossover;
pub mod generator;
pub mod summary;

pub use crossover::{detect_cross_down, detect_cross_up};
pub use generator::{generate_signals, validate_periods};
pub use summary::{trade_signals, CrossSummary};
