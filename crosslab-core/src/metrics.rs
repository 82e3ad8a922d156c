//! Performance metrics: pure functions that compute strategy statistics.
//!
//! Every metric is a pure function: portfolio-value series and/or trade log
//! in, scalar out. Degenerate inputs (zero capital, no closed trades, zero
//! variance, empty series) map to 0 instead of NaN or infinity.

use serde::{Deserialize, Serialize};

use crate::domain::{Trade, TradeSide};

/// Trading days per year used for annualisation.
pub const TRADING_DAYS_PER_YEAR: f64 = 252.0;

/// Summary statistics for a single backtest run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceMetrics {
    pub initial_capital: f64,
    pub final_portfolio_value: f64,
    pub profit_loss: f64,
    pub total_return_pct: f64,
    pub annualized_return_pct: f64,
    pub num_trades: usize,
    pub num_buy_signals: usize,
    pub num_sell_signals: usize,
    pub num_winning_trades: usize,
    pub num_losing_trades: usize,
    pub win_rate_pct: f64,
    pub max_drawdown_pct: f64,
    pub sharpe_ratio: f64,
    pub trading_days: usize,
    pub years: f64,
}

/// Compute every metric from the trade log and the portfolio-value series.
///
/// The final value is the last entry of `portfolio_values` (an open position
/// is already marked to market there); an empty series falls back to
/// `initial_capital`.
pub fn compute_metrics(
    trades: &[Trade],
    portfolio_values: &[f64],
    initial_capital: f64,
    trading_days: usize,
) -> PerformanceMetrics {
    let final_value = portfolio_values
        .last()
        .copied()
        .filter(|v| v.is_finite())
        .unwrap_or(initial_capital);
    let total = total_return_pct(initial_capital, final_value);
    let years = years(trading_days);
    let closed = closed_round_trips(trades);
    let winners = closed.iter().filter(|rt| rt.is_winner()).count();

    PerformanceMetrics {
        initial_capital,
        final_portfolio_value: final_value,
        profit_loss: finite_or_zero(final_value - initial_capital),
        total_return_pct: total,
        annualized_return_pct: annualized_return_pct(total, years),
        num_trades: trades.len(),
        num_buy_signals: trades.iter().filter(|t| t.is_buy()).count(),
        num_sell_signals: trades.iter().filter(|t| t.is_sell()).count(),
        num_winning_trades: winners,
        num_losing_trades: closed.len() - winners,
        win_rate_pct: win_rate_pct(winners, closed.len()),
        max_drawdown_pct: max_drawdown_pct(portfolio_values),
        sharpe_ratio: sharpe_ratio(portfolio_values),
        trading_days,
        years,
    }
}

// ─── Round trips ────────────────────────────────────────────────────

/// A BUY paired with the SELL that closed it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RoundTrip<'a> {
    pub entry: &'a Trade,
    pub exit: &'a Trade,
}

impl RoundTrip<'_> {
    /// Net proceeds of the exit exceed the full cost of the entry, commissions included.
    pub fn is_winner(&self) -> bool {
        self.exit.net_cash_flow() > self.entry.net_cash_flow()
    }

    pub fn net_pnl(&self) -> f64 {
        self.exit.net_cash_flow() - self.entry.net_cash_flow()
    }
}

/// Pair trades sequentially BUY → SELL. A trailing unmatched BUY is dropped.
pub fn closed_round_trips(trades: &[Trade]) -> Vec<RoundTrip<'_>> {
    let mut trips = Vec::new();
    let mut open: Option<&Trade> = None;
    for trade in trades {
        match trade.side {
            TradeSide::Buy => open = Some(trade),
            TradeSide::Sell => {
                if let Some(entry) = open.take() {
                    trips.push(RoundTrip { entry, exit: trade });
                }
            }
        }
    }
    trips
}

// ─── Individual metric functions ────────────────────────────────────

/// `(final - initial) / initial * 100`, or 0 when there is no capital.
pub fn total_return_pct(initial_capital: f64, final_value: f64) -> f64 {
    if !initial_capital.is_finite() || initial_capital <= 0.0 {
        return 0.0;
    }
    finite_or_zero((final_value - initial_capital) / initial_capital * 100.0)
}

/// Length of the run in years of 252 trading days.
pub fn years(trading_days: usize) -> f64 {
    trading_days as f64 / TRADING_DAYS_PER_YEAR
}

/// Simple annualisation: total return divided by years, 0 for a zero-length run.
pub fn annualized_return_pct(total_return_pct: f64, years: f64) -> f64 {
    if years <= 0.0 {
        return 0.0;
    }
    finite_or_zero(total_return_pct / years)
}

/// Winning share of closed trades in percent, 0 when nothing closed.
pub fn win_rate_pct(winners: usize, closed: usize) -> f64 {
    if closed == 0 {
        return 0.0;
    }
    winners as f64 / closed as f64 * 100.0
}

/// Maximum drawdown in percent (a non-positive number, e.g. -15.0).
///
/// Measured against a running peak that starts at the first value. Returns
/// 0 for an empty or monotonically non-decreasing series. Points where the
/// peak is not positive contribute nothing.
pub fn max_drawdown_pct(values: &[f64]) -> f64 {
    let mut peak = f64::NEG_INFINITY;
    let mut max_dd = 0.0_f64;

    for &v in values.iter().filter(|v| v.is_finite()) {
        if v > peak {
            peak = v;
        }
        if peak > 0.0 {
            let dd = (v - peak) / peak * 100.0;
            if dd < max_dd {
                max_dd = dd;
            }
        }
    }
    max_dd
}

/// Annualised Sharpe ratio of per-step returns (zero risk-free rate).
///
/// Sharpe = mean(returns) / sample std(returns) * sqrt(252).
/// Returns 0 if there are fewer than 2 returns or the deviation is zero.
pub fn sharpe_ratio(values: &[f64]) -> f64 {
    let returns = step_returns(values);
    if returns.len() < 2 {
        return 0.0;
    }
    let std = std_dev(&returns);
    if !std.is_finite() || std < 1e-15 {
        return 0.0;
    }
    finite_or_zero(mean_f64(&returns) / std * TRADING_DAYS_PER_YEAR.sqrt())
}

// ─── Helpers ────────────────────────────────────────────────────────

/// Per-step simple returns. A step from a non-positive value counts as 0.
pub fn step_returns(values: &[f64]) -> Vec<f64> {
    if values.len() < 2 {
        return Vec::new();
    }
    values
        .windows(2)
        .map(|w| {
            if w[0] > 0.0 {
                finite_or_zero((w[1] - w[0]) / w[0])
            } else {
                0.0
            }
        })
        .collect()
}

pub(crate) fn mean_f64(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

pub(crate) fn std_dev(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let mean = mean_f64(values);
    let variance =
        values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (values.len() - 1) as f64;
    variance.sqrt()
}

fn finite_or_zero(v: f64) -> f64 {
    if v.is_finite() {
        v
    } else {
        0.0
    }
}
