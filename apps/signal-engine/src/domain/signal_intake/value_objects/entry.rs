//! Entry reference of a signal.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::shared::Price;

/// How the entry order is placed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EntryType {
    /// Resting limit order at the entry price.
    Limit,
    /// Market order; the price is only a sizing reference.
    Market,
}

impl fmt::Display for EntryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Limit => write!(f, "LIMIT"),
            Self::Market => write!(f, "MARKET"),
        }
    }
}

/// Entry price, order type and the band it was derived from, if any.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    order_type: EntryType,
    price: Price,
    band: Option<(Price, Price)>,
}

impl Entry {
    /// A limit entry at one price.
    #[must_use]
    pub const fn limit(price: Price) -> Self {
        Self {
            order_type: EntryType::Limit,
            price,
            band: None,
        }
    }

    /// A limit entry at the midpoint of a band; bounds are stored low first.
    #[must_use]
    pub fn band(a: Price, b: Price) -> Self {
        let (low, high) = if a <= b { (a, b) } else { (b, a) };
        Self {
            order_type: EntryType::Limit,
            price: low.midpoint(high),
            band: Some((low, high)),
        }
    }

    /// A market entry sized against a reference price.
    #[must_use]
    pub const fn market(reference: Price) -> Self {
        Self {
            order_type: EntryType::Market,
            price: reference,
            band: None,
        }
    }

    /// Order type of the entry.
    #[must_use]
    pub const fn order_type(&self) -> EntryType {
        self.order_type
    }

    /// Entry price (band midpoint for band entries).
    #[must_use]
    pub const fn price(&self) -> Price {
        self.price
    }

    /// Band bounds as `(low, high)`, when the signal gave a band.
    #[must_use]
    pub const fn band_bounds(&self) -> Option<(Price, Price)> {
        self.band
    }
}
