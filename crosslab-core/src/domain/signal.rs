//! Per-index trading signals.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::position::Position;

/// Trading action emitted at one index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Signal {
    Buy,
    Sell,
    Hold,
}

impl Signal {
    /// Chart label for actionable signals (`None` for HOLD).
    pub fn cross_label(&self) -> Option<&'static str> {
        match self {
            Signal::Buy => Some("golden_cross"),
            Signal::Sell => Some("death_cross"),
            Signal::Hold => None,
        }
    }

    pub fn is_actionable(&self) -> bool {
        !matches!(self, Signal::Hold)
    }
}

/// One row of the signal table: inputs, indicators, and the resulting action.
///
/// `position` is the declared account state after this index is processed.
/// Undefined moving averages are NaN.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SignalRow {
    pub date: NaiveDate,
    pub price: f64,
    pub short_ma: f64,
    pub long_ma: f64,
    pub signal: Signal,
    pub position: Position,
}
