//! Error taxonomy for the backtest core.
//!
//! Every failure is synchronous and carries enough context (which parameter,
//! which constraint, which index) to render a user-facing message. Degenerate
//! results such as zero capital or zero variance are not errors; the metrics
//! layer maps them to documented sentinel values instead.

use thiserror::Error;

use crate::domain::Position;

/// Errors raised by the core pipeline.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum BacktestError {
    /// A caller-supplied parameter violates its constraint.
    #[error("invalid parameter `{param}`: {reason}")]
    InvalidParameter { param: &'static str, reason: String },

    /// The price series is too short to ever produce a defined long MA.
    #[error("insufficient data: need at least {required} prices, got {available}")]
    InsufficientData { required: usize, available: usize },

    /// Two series that must be aligned index-for-index have different lengths.
    #[error("length mismatch: {left} vs {right}")]
    LengthMismatch { left: usize, right: usize },

    /// The simulator's derived position disagrees with the signal stream.
    #[error("position divergence at index {index}: signals declare {declared:?}, simulator holds {actual:?}")]
    PositionDivergence {
        index: usize,
        declared: Position,
        actual: Position,
    },

    /// An exit was signalled on a bar with no usable price.
    #[error("cannot execute at index {index}: price is missing or non-positive")]
    UntradablePrice { index: usize },
}

impl BacktestError {
    pub(crate) fn invalid(param: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidParameter {
            param,
            reason: reason.into(),
        }
    }
}

/// Result alias used across the core.
pub type Result<T> = std::result::Result<T, BacktestError>;
