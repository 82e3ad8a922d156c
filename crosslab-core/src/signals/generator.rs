//! Signal generator: moving averages + crossovers folded through the
//! position state machine.

use tracing::debug;

use crate::domain::{Position, PriceSeries, SignalRow};
use crate::error::{BacktestError, Result};
use crate::indicators::moving_average;

use super::crossover::{detect_cross_down, detect_cross_up};

/// Check the period pair and that the series can ever yield a defined long MA.
pub fn validate_periods(short_period: usize, long_period: usize, available: usize) -> Result<()> {
    if short_period == 0 {
        return Err(BacktestError::invalid(
            "short_period",
            "must be a positive integer",
        ));
    }
    if long_period == 0 {
        return Err(BacktestError::invalid(
            "long_period",
            "must be a positive integer",
        ));
    }
    if short_period >= long_period {
        return Err(BacktestError::invalid(
            "short_period",
            format!("short period ({short_period}) must be less than long period ({long_period})"),
        ));
    }
    if available < long_period {
        return Err(BacktestError::InsufficientData {
            required: long_period,
            available,
        });
    }
    Ok(())
}

/// Build the per-index signal table for a short/long SMA crossover.
///
/// Starting FLAT, a golden cross emits BUY and goes LONG, a death cross while
/// LONG emits SELL and goes FLAT, and every other index is HOLD. Entries
/// while already long and exits while flat are suppressed.
pub fn generate_signals(
    prices: &PriceSeries,
    short_period: usize,
    long_period: usize,
) -> Result<Vec<SignalRow>> {
    validate_periods(short_period, long_period, prices.len())?;

    let closes = prices.prices();
    let short_ma = moving_average(&closes, short_period)?;
    let long_ma = moving_average(&closes, long_period)?;
    let cross_up = detect_cross_up(&short_ma, &long_ma)?;
    let cross_down = detect_cross_down(&short_ma, &long_ma)?;

    let mut position = Position::Flat;
    let rows: Vec<SignalRow> = prices
        .points()
        .iter()
        .enumerate()
        .map(|(i, point)| {
            let (signal, next) = position.on_crosses(cross_up[i], cross_down[i]);
            position = next;
            SignalRow {
                date: point.date,
                price: point.price,
                short_ma: short_ma[i],
                long_ma: long_ma[i],
                signal,
                position,
            }
        })
        .collect();

    debug!(
        short_period,
        long_period,
        rows = rows.len(),
        actionable = rows.iter().filter(|r| r.signal.is_actionable()).count(),
        "generated crossover signals"
    );

    Ok(rows)
}
