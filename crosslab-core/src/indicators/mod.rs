//! Moving-average indicators.
//!
//! Indicators are computed once over the whole price series before the
//! signal walk. Output is aligned index-for-index with the input, with NaN in
//! the warm-up region.

pub mod sma;

pub use sma::{moving_average, Sma};

/// Assert two f64 values are approximately equal (within epsilon).
#[cfg(test)]
pub fn assert_approx(actual: f64, expected: f64, epsilon: f64) {
    assert!(
        (actual - expected).abs() < epsilon,
        "assert_approx failed: actual={actual}, expected={expected}, diff={}, epsilon={epsilon}",
        (actual - expected).abs()
    );
}

/// Default epsilon for indicator tests.
#[cfg(test)]
pub const DEFAULT_EPSILON: f64 = 1e-10;
