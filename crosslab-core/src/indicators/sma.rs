//! Simple Moving Average (SMA).
//!
//! Right-aligned rolling mean over a fixed window.
//! Lookback: period - 1 (first valid value at index period-1).

use crate::error::{BacktestError, Result};

/// Rolling arithmetic mean over `period` observations.
#[derive(Debug, Clone)]
pub struct Sma {
    period: usize,
    name: String,
}

impl Sma {
    /// Build an SMA. Fails when `period` is zero.
    pub fn new(period: usize) -> Result<Self> {
        if period == 0 {
            return Err(BacktestError::invalid(
                "period",
                "must be a positive integer",
            ));
        }
        Ok(Self {
            period,
            name: format!("sma_{period}"),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn period(&self) -> usize {
        self.period
    }

    pub fn lookback(&self) -> usize {
        self.period - 1
    }

    /// Compute the SMA over `prices`.
    ///
    /// Missing (non-finite) prices poison every window that contains them.
    /// Runs in O(n): the window sum and the count of missing values are
    /// maintained incrementally.
    pub fn compute(&self, prices: &[f64]) -> Vec<f64> {
        let n = prices.len();
        let mut result = vec![f64::NAN; n];
        if n < self.period {
            return result;
        }

        let divisor = self.period as f64;
        let mut sum = 0.0;
        let mut missing = 0usize;

        for i in 0..n {
            let entering = prices[i];
            if entering.is_finite() {
                sum += entering;
            } else {
                missing += 1;
            }

            if i >= self.period {
                let leaving = prices[i - self.period];
                if leaving.is_finite() {
                    sum -= leaving;
                } else {
                    missing -= 1;
                }
            }

            if i + 1 >= self.period && missing == 0 {
                result[i] = sum / divisor;
            }
        }

        result
    }
}

/// Right-aligned rolling mean of `prices` over `period` observations.
///
/// `period` must be in `1..=prices.len()`; anything else is an
/// `InvalidParameter` error. The first `period - 1` entries are NaN.
pub fn moving_average(prices: &[f64], period: usize) -> Result<Vec<f64>> {
    let sma = Sma::new(period)?;
    if period > prices.len() {
        return Err(BacktestError::invalid(
            "period",
            format!(
                "period ({period}) must not exceed the number of prices ({})",
                prices.len()
            ),
        ));
    }
    Ok(sma.compute(prices))
}
