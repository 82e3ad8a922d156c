//! Trade: one executed fill in the trade log.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Direction of an executed trade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TradeSide {
    Buy,
    Sell,
}

/// An executed trade. Immutable once appended to the log.
///
/// `value` is the gross notional `shares * price`; the commission is carried
/// separately so the commission-inclusive cash flow can be recovered with
/// [`Trade::net_cash_flow`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trade {
    pub date: NaiveDate,
    pub index: usize,
    #[serde(rename = "type")]
    pub side: TradeSide,
    pub price: f64,
    pub shares: u64,
    pub value: f64,
    pub commission: f64,
    pub cash_after: f64,
    pub portfolio_value_after: f64,
}

impl Trade {
    /// Cash paid (BUY) or received (SELL), commission included. Always non-negative.
    pub fn net_cash_flow(&self) -> f64 {
        match self.side {
            TradeSide::Buy => self.value + self.commission,
            TradeSide::Sell => self.value - self.commission,
        }
    }

    pub fn is_buy(&self) -> bool {
        self.side == TradeSide::Buy
    }

    pub fn is_sell(&self) -> bool {
        self.side == TradeSide::Sell
    }
}
