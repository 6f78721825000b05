//! Order side (buy or sell).

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::signal_intake::TradeSide;

/// Order side (buy or sell).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderSide {
    /// Buy order.
    Buy,
    /// Sell order.
    Sell,
}

impl OrderSide {
    /// Side of the entry order that opens `trade`.
    #[must_use]
    pub const fn opening(trade: TradeSide) -> Self {
        match trade {
            TradeSide::Long => Self::Buy,
            TradeSide::Short => Self::Sell,
        }
    }

    /// Side of the take-profit and stop orders that close `trade`.
    #[must_use]
    pub const fn closing(trade: TradeSide) -> Self {
        Self::opening(trade).opposite()
    }

    /// Returns the opposite side.
    #[must_use]
    pub const fn opposite(&self) -> Self {
        match self {
            Self::Buy => Self::Sell,
            Self::Sell => Self::Buy,
        }
    }
}

impl fmt::Display for OrderSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Buy => write!(f, "BUY"),
            Self::Sell => write!(f, "SELL"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn opening_and_closing_sides() {
        assert_eq!(OrderSide::opening(TradeSide::Long), OrderSide::Buy);
        assert_eq!(OrderSide::closing(TradeSide::Long), OrderSide::Sell);
        assert_eq!(OrderSide::opening(TradeSide::Short), OrderSide::Sell);
        assert_eq!(OrderSide::closing(TradeSide::Short), OrderSide::Buy);
    }
}
