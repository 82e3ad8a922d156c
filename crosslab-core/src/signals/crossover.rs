//! Golden cross / death cross detection over two aligned MA series.

use crate::error::{BacktestError, Result};

/// Flag every index where `short` crosses strictly above `long`.
///
/// Fires at `i >= 1` when `short[i-1] <= long[i-1]` and `short[i] > long[i]`.
/// Equality at the prior index belongs to the pre-cross side. Index 0 never
/// fires, nor does any index whose current values include NaN. An undefined
/// prior pair (warm-up boundary, or the first index after a gap) also counts as
/// the pre-cross side, so the first defined index can fire.
pub fn detect_cross_up(short: &[f64], long: &[f64]) -> Result<Vec<bool>> {
    detect(short, long, |s, l| s <= l, |s, l| s > l)
}

/// Flag every index where `short` crosses strictly below `long`.
///
/// Mirror image of [`detect_cross_up`]: `short[i-1] >= long[i-1]` and
/// `short[i] < long[i]`, so `detect_cross_up(a, b) == detect_cross_down(b, a)`.
pub fn detect_cross_down(short: &[f64], long: &[f64]) -> Result<Vec<bool>> {
    detect(short, long, |s, l| s >= l, |s, l| s < l)
}

fn detect(
    short: &[f64],
    long: &[f64],
    before: impl Fn(f64, f64) -> bool,
    after: impl Fn(f64, f64) -> bool,
) -> Result<Vec<bool>> {
    if short.len() != long.len() {
        return Err(BacktestError::LengthMismatch {
            left: short.len(),
            right: long.len(),
        });
    }

    let mut crosses = vec![false; short.len()];
    for i in 1..short.len() {
        let (s, l) = (short[i], long[i]);
        if s.is_nan() || l.is_nan() {
            continue;
        }
        let (s_prev, l_prev) = (short[i - 1], long[i - 1]);
        let prior_undefined = s_prev.is_nan() || l_prev.is_nan();
        crosses[i] = (prior_undefined || before(s_prev, l_prev)) && after(s, l);
    }
    Ok(crosses)
}
