//! Order type.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::signal_intake::EntryType;

/// Order type placed on the exchange.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderType {
    /// Execute at best available price.
    Market,
    /// Rest at the given price or better.
    Limit,
    /// Market order triggered when the price reaches the trigger level.
    StopMarket,
}

impl OrderType {
    /// Returns true if the price sent with the order is a trigger, not a limit.
    #[must_use]
    pub const fn is_triggered(&self) -> bool {
        matches!(self, Self::StopMarket)
    }
}

impl From<EntryType> for OrderType {
    fn from(entry: EntryType) -> Self {
        match entry {
            EntryType::Limit => Self::Limit,
            EntryType::Market => Self::Market,
        }
    }
}

impl fmt::Display for OrderType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Market => write!(f, "MARKET"),
            Self::Limit => write!(f, "LIMIT"),
            Self::StopMarket => write!(f, "STOP_MARKET"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entry_type_maps_to_order_type() {
        assert_eq!(OrderType::from(EntryType::Limit), OrderType::Limit);
        assert_eq!(OrderType::from(EntryType::Market), OrderType::Market);
        assert!(OrderType::StopMarket.is_triggered());
        assert!(!OrderType::Limit.is_triggered());
    }
}
