//! Price value object.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A quote-currency price level (entry, stop or target).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Price(Decimal);

impl Price {
    /// Create a new Price.
    #[must_use]
    pub const fn new(amount: Decimal) -> Self {
        Self(amount)
    }

    /// Get the inner Decimal value.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// Returns true if the price is strictly positive.
    #[must_use]
    pub fn is_positive(&self) -> bool {
        self.0 > Decimal::ZERO
    }

    /// Midpoint of two prices.
    #[must_use]
    pub fn midpoint(self, other: Self) -> Self {
        // low + half the gap never leaves [low, high].
        let (low, high) = if self <= other { (self.0, other.0) } else { (other.0, self.0) };
        Self(low + (high - low) / Decimal::TWO)
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.normalize())
    }
}

impl From<Decimal> for Price {
    fn from(value: Decimal) -> Self {
        Self(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn price_midpoint() {
        let mid = Price::new(dec!(3450)).midpoint(Price::new(dec!(3470)));
        assert_eq!(mid, Price::new(dec!(3460)));
    }

    #[test]
    fn price_midpoint_near_max_does_not_overflow() {
        let mid = Price::new(Decimal::MAX).midpoint(Price::new(Decimal::MAX));
        assert_eq!(mid, Price::new(Decimal::MAX));
    }

    #[test]
    fn price_display() {
        assert_eq!(Price::new(dec!(100.50)).to_string(), "100.5");
    }

    #[test]
    fn price_positive() {
        assert!(Price::new(dec!(0.01)).is_positive());
        assert!(!Price::new(Decimal::ZERO).is_positive());
    }
}
