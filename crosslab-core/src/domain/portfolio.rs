//! Account state owned by the simulator, and the per-step snapshots it records.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::position::Position;

/// Mutable account state for one backtest run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PortfolioState {
    pub cash: f64,
    pub shares_held: u64,
    pub position: Position,
}

impl PortfolioState {
    pub fn new(initial_capital: f64) -> Self {
        Self {
            cash: initial_capital,
            shares_held: 0,
            position: Position::Flat,
        }
    }

    /// Cash plus shares marked at `price`.
    pub fn value_at(&self, price: f64) -> f64 {
        self.cash + self.shares_held as f64 * price
    }
}

/// Snapshot of the account after one index.
///
/// `mark_price` is the price the shares were valued at: the current price, or
/// the most recent valid one when the current price is missing.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PortfolioStep {
    pub date: NaiveDate,
    pub mark_price: f64,
    pub cash: f64,
    pub shares: u64,
    pub position: Position,
    pub value: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_state_is_flat_cash() {
        let state = PortfolioState::new(10_000.0);
        assert_eq!(state.position, Position::Flat);
        assert_eq!(state.shares_held, 0);
        assert_eq!(state.value_at(123.0), 10_000.0);
    }

    #[test]
    fn value_marks_shares() {
        let state = PortfolioState {
            cash: 50.0,
            shares_held: 3,
            position: Position::Long,
        };
        assert_eq!(state.value_at(100.0), 350.0);
    }
}
