//! Share rounding policy.
//!
//! Fractional shares are never traded. Purchases are rounded down to a whole
//! number of lots; the default lot is a single share.

use serde::{Deserialize, Serialize};

use crate::error::{BacktestError, Result};

/// Whole-share rounding with a configurable lot size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShareRounding {
    lot_size: u64,
}

impl Default for ShareRounding {
    fn default() -> Self {
        Self { lot_size: 1 }
    }
}

impl ShareRounding {
    pub fn new(lot_size: u64) -> Result<Self> {
        if lot_size == 0 {
            return Err(BacktestError::invalid("lot_size", "must be at least 1"));
        }
        Ok(Self { lot_size })
    }

    pub fn lot_size(&self) -> u64 {
        self.lot_size
    }

    /// Largest share count whose commission-inclusive cost fits in `cash`:
    /// `floor(cash / (price * (1 + commission_rate)))`, rounded down to the lot size.
    ///
    /// Fails with `InvalidParameter` when that count does not fit in a `u64`.
    pub fn affordable_shares(&self, cash: f64, price: f64, commission_rate: f64) -> Result<u64> {
        if cash.is_nan() || cash <= 0.0 || price.is_nan() || price <= 0.0 {
            return Ok(0);
        }
        let raw = (cash / (price * (1.0 + commission_rate))).floor();
        if raw < 1.0 {
            return Ok(0);
        }
        // u64::MAX as f64 rounds up to 2^64, so `>=` rejects every unrepresentable count.
        if !raw.is_finite() || raw >= u64::MAX as f64 {
            return Err(BacktestError::invalid(
                "initial_capital",
                format!("buying {raw} shares at {price} exceeds the maximum share count"),
            ));
        }
        let lots = (raw / self.lot_size as f64).floor() as u64;
        lots.checked_mul(self.lot_size).ok_or_else(|| {
            BacktestError::invalid("lot_size", "share count overflows at this lot size")
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn floors_to_whole_shares() {
        let rounding = ShareRounding::default();
        assert_eq!(rounding.affordable_shares(10_000.0, 100.0, 0.0).unwrap(), 100);
        // 10_000 / 100.1 = 99.9
        assert_eq!(rounding.affordable_shares(10_000.0, 100.0, 0.001).unwrap(), 99);
    }

    #[test]
    fn rounds_down_to_lot() {
        let rounding = ShareRounding::new(10).unwrap();
        assert_eq!(rounding.affordable_shares(10_000.0, 100.0, 0.001).unwrap(), 90);
        assert_eq!(rounding.affordable_shares(500.0, 100.0, 0.0).unwrap(), 0);
    }

    #[test]
    fn zero_cash_or_price_buys_nothing() {
        let rounding = ShareRounding::default();
        assert_eq!(rounding.affordable_shares(0.0, 100.0, 0.0).unwrap(), 0);
        assert_eq!(rounding.affordable_shares(50.0, 100.0, 0.0).unwrap(), 0);
        assert_eq!(rounding.affordable_shares(100.0, f64::NAN, 0.0).unwrap(), 0);
    }

    #[test]
    fn share_count_beyond_u64_is_rejected() {
        let err = ShareRounding::default()
            .affordable_shares(1e30, 1.0, 0.0)
            .unwrap_err();
        assert!(matches!(
            err,
            BacktestError::InvalidParameter { param: "initial_capital", .. }
        ));
        assert!(ShareRounding::new(2)
            .unwrap()
            .affordable_shares(1e30, 1.0, 0.0)
            .is_err());
    }

    #[test]
    fn large_but_representable_count_is_exact() {
        let rounding = ShareRounding::new(1_000).unwrap();
        assert_eq!(
            rounding.affordable_shares(1e15, 1.0, 0.0).unwrap(),
            1_000_000_000_000_000
        );
    }

    #[test]
    fn zero_lot_rejected() {
        assert!(ShareRounding::new(0).is_err());
    }
}
