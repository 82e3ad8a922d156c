//! Crossover summary statistics over a signal table.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::{Signal, SignalRow};

/// Only the rows where a BUY or SELL was emitted.
pub fn trade_signals(rows: &[SignalRow]) -> Vec<SignalRow> {
    rows.iter()
        .filter(|r| r.signal.is_actionable())
        .copied()
        .collect()
}

/// Counts and date span of the actionable crossover signals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrossSummary {
    pub total_golden_crosses: usize,
    pub total_death_crosses: usize,
    pub total_signals: usize,
    pub first_signal_date: Option<NaiveDate>,
    pub last_signal_date: Option<NaiveDate>,
}

impl CrossSummary {
    pub fn from_rows(rows: &[SignalRow]) -> Self {
        let actionable = trade_signals(rows);
        Self {
            total_golden_crosses: actionable.iter().filter(|r| r.signal == Signal::Buy).count(),
            total_death_crosses: actionable.iter().filter(|r| r.signal == Signal::Sell).count(),
            total_signals: actionable.len(),
            first_signal_date: actionable.first().map(|r| r.date),
            last_signal_date: actionable.last().map(|r| r.date),
        }
    }
}
