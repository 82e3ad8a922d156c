//! Position state machine shared by the signal generator and the simulator.
//!
//! Both layers walk the same two-state machine so the declared position in
//! the signal stream and the position the simulator actually holds can be
//! compared index by index.

use serde::{Deserialize, Serialize};

use super::signal::Signal;

/// Account exposure: flat (no shares) or long (one open position).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Position {
    #[default]
    Flat,
    Long,
}

impl Position {
    pub fn is_long(&self) -> bool {
        matches!(self, Position::Long)
    }

    pub fn is_flat(&self) -> bool {
        matches!(self, Position::Flat)
    }

    /// Whether `signal` is a legal transition out of this state.
    ///
    /// BUY is only legal from FLAT, SELL only from LONG, HOLD always.
    pub fn accepts(&self, signal: Signal) -> bool {
        match signal {
            Signal::Buy => self.is_flat(),
            Signal::Sell => self.is_long(),
            Signal::Hold => true,
        }
    }

    /// State after applying `signal`. Illegal transitions leave the state unchanged.
    pub fn apply(self, signal: Signal) -> Position {
        match signal {
            Signal::Buy if self.is_flat() => Position::Long,
            Signal::Sell if self.is_long() => Position::Flat,
            _ => self,
        }
    }

    /// Turn the crossover events at one index into a signal, suppressing
    /// entries while long and exits while flat.
    pub fn on_crosses(self, cross_up: bool, cross_down: bool) -> (Signal, Position) {
        let signal = if cross_up && self.is_flat() {
            Signal::Buy
        } else if cross_down && self.is_long() {
            Signal::Sell
        } else {
            Signal::Hold
        };
        (signal, self.apply(signal))
    }
}
