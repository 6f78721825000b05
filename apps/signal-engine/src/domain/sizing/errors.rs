//! Error types for entry and bracket sizing.

use rust_decimal::Decimal;
use std::fmt;

/// Error during sizing or weight validation.
///
/// Weight errors surface at configuration load; the rest are fatal for the
/// one trade they occur in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SizingError {
    /// The exchange did not supply a lot size for the market.
    UnknownLotSize {
        /// Market symbol.
        symbol: String,
    },
    /// Take-profit weights do not sum to 1.0 within tolerance.
    WeightsNotNormalized {
        /// Actual sum of the weights.
        sum: Decimal,
    },
    /// Wrong number of take-profit weights.
    WeightCountMismatch {
        /// Required count.
        expected: usize,
        /// Count supplied.
        found: usize,
    },
    /// A single weight lies outside (0, 1].
    InvalidWeight {
        /// Zero-based leg index.
        index: usize,
        /// Offending value.
        value: Decimal,
    },
    /// Invalid input (zero or negative price, non-positive lot size, etc.).
    InvalidInput(String),
    /// Sized entry rounds down to zero lots.
    BelowMinimum {
        /// Unrounded quantity.
        calculated: Decimal,
        /// Lot size it was rounded to.
        lot_size: Decimal,
    },
    /// Filled quantity is below one lot, so no bracket can be built.
    FillBelowLotSize {
        /// Filled quantity.
        filled: Decimal,
        /// Lot size.
        lot_size: Decimal,
    },
    /// Sized entry is below the market's minimum order size.
    BelowMinimumSize {
        /// Lot-rounded quantity.
        size: Decimal,
        /// Exchange minimum.
        min_size: Decimal,
    },
    /// A price rounds down to zero ticks.
    PriceBelowTick {
        /// Signal price.
        price: Decimal,
        /// Price tick.
        tick: Decimal,
    },
    /// Decimal arithmetic left the representable range.
    Overflow(String),
}

impl fmt::Display for SizingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownLotSize { symbol } => write!(f, "Lot size unknown for {symbol}"),
            Self::WeightsNotNormalized { sum } => {
                write!(f, "Take-profit weights sum to {sum}, expected 1.0")
            }
            Self::WeightCountMismatch { expected, found } => {
                write!(f, "Expected {expected} take-profit weights, got {found}")
            }
            Self::InvalidWeight { index, value } => {
                write!(f, "Take-profit weight {index} is {value}, must be in (0, 1]")
            }
            Self::InvalidInput(msg) => write!(f, "Invalid input: {msg}"),
            Self::BelowMinimum {
                calculated,
                lot_size,
            } => {
                write!(
                    f,
                    "Calculated size {calculated} is below one lot of {lot_size}"
                )
            }
            Self::FillBelowLotSize { filled, lot_size } => {
                write!(f, "Filled quantity {filled} is below one lot of {lot_size}")
            }
            Self::BelowMinimumSize { size, min_size } => {
                write!(f, "Size {size} is below the exchange minimum of {min_size}")
            }
            Self::PriceBelowTick { price, tick } => {
                write!(f, "Price {price} is below one tick of {tick}")
            }
            Self::Overflow(what) => write!(f, "Arithmetic overflow: {what}"),
        }
    }
}

impl std::error::Error for SizingError {}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn sizing_error_display() {
        let err = SizingError::WeightsNotNormalized { sum: dec!(0.95) };
        assert!(err.to_string().contains("0.95"));

        let err = SizingError::UnknownLotSize {
            symbol: "BTC".to_string(),
        };
        assert_eq!(err.to_string(), "Lot size unknown for BTC");

        let err = SizingError::Overflow("1000 / 0.0000000000000000000000000002".to_string());
        assert!(err.to_string().starts_with("Arithmetic overflow"));
    }
}
