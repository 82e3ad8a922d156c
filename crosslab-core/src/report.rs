//! The externally exposed result record of one backtest.
//!
//! Undefined values (MA warm-up, missing prices) are exported as `0` rather
//! than null so consumers can plot the series directly.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::{SignalRow, Trade};
use crate::engine::SimulationResult;
use crate::metrics::PerformanceMetrics;

/// A golden or death cross marker for the chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalPoint {
    pub date: NaiveDate,
    #[serde(rename = "type")]
    pub kind: String,
    pub price: f64,
}

/// Aligned series for charting a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartData {
    pub dates: Vec<NaiveDate>,
    pub prices: Vec<f64>,
    pub short_ma: Vec<f64>,
    pub long_ma: Vec<f64>,
    pub signals: Vec<SignalPoint>,
    pub portfolio_values: Vec<f64>,
}

impl ChartData {
    pub fn from_parts(rows: &[SignalRow], simulation: &SimulationResult) -> Self {
        let signals = rows
            .iter()
            .filter_map(|row| {
                row.signal.cross_label().map(|label| SignalPoint {
                    date: row.date,
                    kind: label.to_string(),
                    price: zero_if_undefined(row.price),
                })
            })
            .collect();

        Self {
            dates: rows.iter().map(|r| r.date).collect(),
            prices: rows.iter().map(|r| zero_if_undefined(r.price)).collect(),
            short_ma: rows.iter().map(|r| zero_if_undefined(r.short_ma)).collect(),
            long_ma: rows.iter().map(|r| zero_if_undefined(r.long_ma)).collect(),
            signals,
            portfolio_values: simulation.values(),
        }
    }
}

/// Complete output of the pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BacktestReport {
    pub performance_metrics: PerformanceMetrics,
    pub chart_data: ChartData,
    pub trades: Vec<Trade>,
}

fn zero_if_undefined(v: f64) -> f64 {
    if v.is_finite() {
        v
    } else {
        0.0
    }
}
