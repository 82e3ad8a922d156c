//! Single-position, long-only trade simulator.
//!
//! The simulator owns the only mutable [`PortfolioState`] of a run. It
//! re-derives its own position from the fills it actually makes and checks it
//! against the position declared by each signal row. The only tolerated gap
//! is a declared entry that could not be filled (too little cash, or no usable
//! price); it is recorded as a [`SkippedEntry`] and closes at the next exit
//! signal. Any other disagreement is a [`BacktestError::PositionDivergence`].

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::domain::{
    PortfolioState, PortfolioStep, Position, PriceSeries, Signal, SignalRow, Trade, TradeSide,
};
use crate::error::{BacktestError, Result};

use super::sizing::ShareRounding;

/// Relative slack allowed when a whole-share cost lands a rounding error above cash.
const OVERSPEND_TOLERANCE: f64 = 1e-12;

/// Why a declared entry produced no trade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    InsufficientCapital,
    UntradablePrice,
}

/// A BUY signal the account could not act on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedEntry {
    pub index: usize,
    pub date: NaiveDate,
    pub reason: SkipReason,
}

/// Everything the simulator produces for one run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationResult {
    pub trades: Vec<Trade>,
    pub portfolio_values: Vec<PortfolioStep>,
    pub final_state: PortfolioState,
    pub skipped_entries: Vec<SkippedEntry>,
}

impl SimulationResult {
    /// Portfolio value per index.
    pub fn values(&self) -> Vec<f64> {
        self.portfolio_values.iter().map(|s| s.value).collect()
    }

    /// Value at the last index, or `None` for an empty run.
    pub fn final_value(&self) -> Option<f64> {
        self.portfolio_values.last().map(|s| s.value)
    }
}

/// Simulate the signal table with whole-share rounding.
///
/// `commission_rate` is a fraction applied multiplicatively to each fill
/// (0.001 = 0.1%). An open position at the end is left open and marked to market.
pub fn run_backtest(
    signals: &[SignalRow],
    prices: &PriceSeries,
    initial_capital: f64,
    commission_rate: f64,
) -> Result<SimulationResult> {
    run_backtest_with_rounding(
        signals,
        prices,
        initial_capital,
        commission_rate,
        ShareRounding::default(),
    )
}

/// Validate the account parameters shared by every entry point.
pub fn validate_account(initial_capital: f64, commission_rate: f64) -> Result<()> {
    if !initial_capital.is_finite() || initial_capital < 0.0 {
        return Err(BacktestError::invalid(
            "initial_capital",
            format!("must be a non-negative finite amount, got {initial_capital}"),
        ));
    }
    if !commission_rate.is_finite() || !(0.0..1.0).contains(&commission_rate) {
        return Err(BacktestError::invalid(
            "commission",
            format!("must be in [0, 1), got {commission_rate}"),
        ));
    }
    Ok(())
}

/// Simulate the signal table with an explicit share rounding policy.
pub fn run_backtest_with_rounding(
    signals: &[SignalRow],
    prices: &PriceSeries,
    initial_capital: f64,
    commission_rate: f64,
    rounding: ShareRounding,
) -> Result<SimulationResult> {
    validate_account(initial_capital, commission_rate)?;
    if signals.len() != prices.len() {
        return Err(BacktestError::LengthMismatch {
            left: signals.len(),
            right: prices.len(),
        });
    }

    let mut sim = Simulator::new(initial_capital, commission_rate, rounding);

    for (index, (row, point)) in signals.iter().zip(prices.points()).enumerate() {
        if row.date != point.date {
            return Err(BacktestError::invalid(
                "signals",
                format!(
                    "signal date {} does not match price date {} at index {index}",
                    row.date, point.date
                ),
            ));
        }
        let price = point.is_tradable().then_some(point.price);
        sim.step(index, row, price)?;
    }

    Ok(sim.finish())
}

struct Simulator {
    state: PortfolioState,
    commission_rate: f64,
    rounding: ShareRounding,
    mark_price: Option<f64>,
    /// Declared LONG whose entry could not be filled; cleared by the next exit signal.
    unfilled_entry: bool,
    trades: Vec<Trade>,
    steps: Vec<PortfolioStep>,
    skipped: Vec<SkippedEntry>,
}

impl Simulator {
    fn new(initial_capital: f64, commission_rate: f64, rounding: ShareRounding) -> Self {
        Self {
            state: PortfolioState::new(initial_capital),
            commission_rate,
            rounding,
            mark_price: None,
            unfilled_entry: false,
            trades: Vec::new(),
            steps: Vec::new(),
            skipped: Vec::new(),
        }
    }

    fn step(&mut self, index: usize, row: &SignalRow, price: Option<f64>) -> Result<()> {
        if let Some(p) = price {
            self.mark_price = Some(p);
        }

        match row.signal {
            Signal::Buy => self.on_buy(index, row.date, price)?,
            Signal::Sell => self.on_sell(index, row.date, price)?,
            Signal::Hold => {}
        }

        self.check_position(index, row.position)?;

        // Shares are only ever held after a fill, so an absent mark implies zero shares.
        let mark = self.mark_price.unwrap_or(0.0);
        self.steps.push(PortfolioStep {
            date: row.date,
            mark_price: mark,
            cash: self.state.cash,
            shares: self.state.shares_held,
            position: self.state.position,
            value: self.state.value_at(mark),
        });
        Ok(())
    }

    fn on_buy(&mut self, index: usize, date: NaiveDate, price: Option<f64>) -> Result<()> {
        if !self.state.position.accepts(Signal::Buy) {
            warn!(index, %date, "BUY signal while already long; ignored");
            return Ok(());
        }
        let Some(price) = price else {
            self.skip(index, date, SkipReason::UntradablePrice);
            return Ok(());
        };

        let rate = self.commission_rate;
        let mut shares = self
            .rounding
            .affordable_shares(self.state.cash, price, rate)?;
        let cost_of = |n: u64| n as f64 * price * (1.0 + rate);
        while shares > 0 && cost_of(shares) > self.state.cash * (1.0 + OVERSPEND_TOLERANCE) {
            shares = shares.saturating_sub(self.rounding.lot_size());
        }
        if shares == 0 {
            self.skip(index, date, SkipReason::InsufficientCapital);
            return Ok(());
        }

        let gross = shares as f64 * price;
        let cost = cost_of(shares);
        self.state.cash = (self.state.cash - cost).max(0.0);
        self.state.shares_held = shares;
        self.state.position = Position::Long;
        self.unfilled_entry = false;

        debug!(index, %date, price, shares, cost, cash = self.state.cash, "BUY filled");
        self.trades.push(Trade {
            date,
            index,
            side: TradeSide::Buy,
            price,
            shares,
            value: gross,
            commission: cost - gross,
            cash_after: self.state.cash,
            portfolio_value_after: self.state.value_at(price),
        });
        Ok(())
    }

    fn on_sell(&mut self, index: usize, date: NaiveDate, price: Option<f64>) -> Result<()> {
        if !self.state.position.accepts(Signal::Sell) {
            if self.unfilled_entry {
                self.unfilled_entry = false;
            } else {
                warn!(index, %date, "SELL signal while flat; ignored");
            }
            return Ok(());
        }
        let price = price.ok_or(BacktestError::UntradablePrice { index })?;

        let shares = self.state.shares_held;
        let gross = shares as f64 * price;
        let proceeds = gross * (1.0 - self.commission_rate);
        self.state.cash += proceeds;
        self.state.shares_held = 0;
        self.state.position = Position::Flat;

        debug!(index, %date, price, shares, proceeds, cash = self.state.cash, "SELL filled");
        self.trades.push(Trade {
            date,
            index,
            side: TradeSide::Sell,
            price,
            shares,
            value: gross,
            commission: gross - proceeds,
            cash_after: self.state.cash,
            portfolio_value_after: self.state.value_at(price),
        });
        Ok(())
    }

    fn skip(&mut self, index: usize, date: NaiveDate, reason: SkipReason) {
        warn!(index, %date, ?reason, cash = self.state.cash, "BUY signal produced no trade");
        self.unfilled_entry = true;
        self.skipped.push(SkippedEntry {
            index,
            date,
            reason,
        });
    }

    fn check_position(&self, index: usize, declared: Position) -> Result<()> {
        let actual = self.state.position;
        if actual == declared {
            return Ok(());
        }
        if self.unfilled_entry && declared.is_long() && actual.is_flat() {
            return Ok(());
        }
        Err(BacktestError::PositionDivergence {
            index,
            declared,
            actual,
        })
    }

    fn finish(self) -> SimulationResult {
        SimulationResult {
            trades: self.trades,
            portfolio_values: self.steps,
            final_state: self.state,
            skipped_entries: self.skipped,
        }
    }
}
