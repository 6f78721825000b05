//! Exchange price tick.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::shared::Price;
use crate::domain::sizing::errors::SizingError;

/// Minimum price increment for a market.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "Decimal", into = "Decimal")]
pub struct PriceTick(Decimal);

impl PriceTick {
    /// Create a tick; it must be strictly positive.
    pub fn new(step: Decimal) -> Result<Self, SizingError> {
        if step <= Decimal::ZERO {
            return Err(SizingError::InvalidInput(format!(
                "price tick must be positive, got {step}"
            )));
        }
        Ok(Self(step))
    }

    /// Get the step.
    #[must_use]
    pub const fn step(&self) -> Decimal {
        self.0
    }

    /// Round `price` down to the tick grid. A price under one tick is an error.
    pub fn floor(&self, price: Price) -> Result<Price, SizingError> {
        let raw = price.amount();
        let floored = raw
            .checked_div(self.0)
            .and_then(|ticks| ticks.floor().checked_mul(self.0))
            .ok_or_else(|| SizingError::Overflow(format!("{raw} in ticks of {self}")))?;
        if floored <= Decimal::ZERO {
            return Err(SizingError::PriceBelowTick {
                price: raw,
                tick: self.0,
            });
        }
        Ok(Price::new(floored))
    }

    /// One tick below `price`, never under one tick.
    pub fn step_down(&self, price: Price) -> Result<Price, SizingError> {
        let lowered = price.amount() - self.0;
        self.floor(Price::new(lowered.max(self.0)))
    }

    /// One tick above `price`.
    pub fn step_up(&self, price: Price) -> Result<Price, SizingError> {
        let raised = price
            .amount()
            .checked_add(self.0)
            .ok_or_else(|| SizingError::Overflow(format!("{price} plus one tick")))?;
        self.floor(Price::new(raised))
    }
}

impl TryFrom<Decimal> for PriceTick {
    type Error = SizingError;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<PriceTick> for Decimal {
    fn from(value: PriceTick) -> Self {
        value.0
    }
}

impl fmt::Display for PriceTick {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.normalize())
    }
}
