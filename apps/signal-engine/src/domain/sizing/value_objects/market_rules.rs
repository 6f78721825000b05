//! Per-market trading rules reported by the exchange.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{LotSize, PriceTick};
use crate::domain::sizing::errors::SizingError;

/// Lot size, price tick and optional minimum order size of one market.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarketRules {
    lot_size: LotSize,
    price_tick: PriceTick,
    min_size: Option<Decimal>,
}

impl MarketRules {
    /// Rules without a minimum order size.
    #[must_use]
    pub const fn new(lot_size: LotSize, price_tick: PriceTick) -> Self {
        Self {
            lot_size,
            price_tick,
            min_size: None,
        }
    }

    /// Set the exchange minimum order size; it must be positive.
    pub fn with_min_size(mut self, min_size: Option<Decimal>) -> Result<Self, SizingError> {
        if let Some(min) = min_size
            && min <= Decimal::ZERO
        {
            return Err(SizingError::InvalidInput(format!(
                "minimum order size must be positive, got {min}"
            )));
        }
        self.min_size = min_size;
        Ok(self)
    }

    /// Quantity increment.
    #[must_use]
    pub const fn lot_size(&self) -> LotSize {
        self.lot_size
    }

    /// Price increment.
    #[must_use]
    pub const fn price_tick(&self) -> PriceTick {
        self.price_tick
    }

    /// Smallest order the exchange accepts, if it has one.
    #[must_use]
    pub const fn min_size(&self) -> Option<Decimal> {
        self.min_size
    }
}
