//! Domain types for the crossover backtester.

pub mod portfolio;
pub mod position;
pub mod price;
pub mod signal;
pub mod trade;

pub use portfolio::{PortfolioState, PortfolioStep};
pub use position::Position;
pub use price::{PricePoint, PriceSeries};
pub use signal::{Signal, SignalRow};
pub use trade::{Trade, TradeSide};
