//! Exchange lot size.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::shared::Quantity;
use crate::domain::sizing::errors::SizingError;

/// Minimum tradable quantity increment for a market.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "Decimal", into = "Decimal")]
pub struct LotSize(Decimal);

impl LotSize {
    /// Create a lot size; it must be strictly positive.
    pub fn new(step: Decimal) -> Result<Self, SizingError> {
        if step <= Decimal::ZERO {
            return Err(SizingError::InvalidInput(format!(
                "lot size must be positive, got {step}"
            )));
        }
        Ok(Self(step))
    }

    /// Get the step.
    #[must_use]
    pub const fn step(&self) -> Decimal {
        self.0
    }

    /// Round `raw` down to a whole number of lots.
    pub fn floor(&self, raw: Decimal) -> Result<Decimal, SizingError> {
        raw.checked_div(self.0)
            .and_then(|lots| lots.floor().checked_mul(self.0))
            .ok_or_else(|| SizingError::Overflow(format!("{raw} in lots of {self}")))
    }

    /// True if `qty` is at least one lot.
    #[must_use]
    pub fn covers(&self, qty: Quantity) -> bool {
        qty.amount() >= self.0
    }
}

impl TryFrom<Decimal> for LotSize {
    type Error = SizingError;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<LotSize> for Decimal {
    fn from(value: LotSize) -> Self {
        value.0
    }
}

impl fmt::Display for LotSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.normalize())
    }
}
