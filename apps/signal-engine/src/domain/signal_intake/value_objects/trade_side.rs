//! Trade direction.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Direction of the position a signal opens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TradeSide {
    /// Profit when price rises.
    Long,
    /// Profit when price falls.
    Short,
}

impl TradeSide {
    /// Parse a side keyword (`LONG`, `SHORT`, `BUY`, `SELL`), case-insensitive.
    #[must_use]
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        match keyword.to_ascii_uppercase().as_str() {
            "LONG" | "BUY" => Some(Self::Long),
            "SHORT" | "SELL" => Some(Self::Short),
            _ => None,
        }
    }

    /// True if moving from `from` to `to` is a move in the profit direction.
    #[must_use]
    pub fn is_profit_direction(&self, from: Decimal, to: Decimal) -> bool {
        match self {
            Self::Long => to > from,
            Self::Short => to < from,
        }
    }
}

impl fmt::Display for TradeSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Long => write!(f, "LONG"),
            Self::Short => write!(f, "SHORT"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn side_keywords() {
        assert_eq!(TradeSide::from_keyword("long"), Some(TradeSide::Long));
        assert_eq!(TradeSide::from_keyword("BUY"), Some(TradeSide::Long));
        assert_eq!(TradeSide::from_keyword("Short"), Some(TradeSide::Short));
        assert_eq!(TradeSide::from_keyword("sell"), Some(TradeSide::Short));
        assert_eq!(TradeSide::from_keyword("hold"), None);
    }

    #[test]
    fn profit_direction() {
        assert!(TradeSide::Long.is_profit_direction(dec!(100), dec!(101)));
        assert!(!TradeSide::Long.is_profit_direction(dec!(100), dec!(99)));
        assert!(TradeSide::Short.is_profit_direction(dec!(100), dec!(99)));
        assert!(!TradeSide::Short.is_profit_direction(dec!(100), dec!(100)));
    }

    #[test]
    fn side_serde() {
        assert_eq!(serde_json::to_string(&TradeSide::Short).unwrap(), "\"SHORT\"");
    }
}
