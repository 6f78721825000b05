//! Role of an order within a lifecycle.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::domain::signal_intake::TAKE_PROFIT_LEGS;

/// What an order does for its lifecycle.
///
/// Serialized as a short leg label: `entry`, `tp1`..`tp6`, `stop`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum OrderRole {
    /// The opening order.
    Entry,
    /// Take-profit leg, zero-based index (0..6).
    TakeProfit(u8),
    /// The stop-loss order.
    Stop,
}

impl OrderRole {
    /// All bracket roles in placement order: six take-profit legs, then the stop.
    #[must_use]
    pub fn bracket_roles() -> Vec<Self> {
        (0..TAKE_PROFIT_LEGS as u8)
            .map(Self::TakeProfit)
            .chain(std::iter::once(Self::Stop))
            .collect()
    }

    /// Returns true for take-profit and stop orders.
    #[must_use]
    pub const fn is_bracket(&self) -> bool {
        !matches!(self, Self::Entry)
    }

    /// Short label used in client order ids, logs and metrics.
    #[must_use]
    pub fn label(&self) -> String {
        match self {
            Self::Entry => "entry".to_string(),
            Self::TakeProfit(i) => format!("tp{}", i + 1),
            Self::Stop => "stop".to_string(),
        }
    }

    /// Label with all take-profit legs collapsed, for low-cardinality metrics.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Entry => "entry",
            Self::TakeProfit(_) => "take_profit",
            Self::Stop => "stop",
        }
    }
}

impl fmt::Display for OrderRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl FromStr for OrderRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "entry" => Ok(Self::Entry),
            "stop" => Ok(Self::Stop),
            other => other
                .strip_prefix("tp")
                .and_then(|n| n.parse::<u8>().ok())
                .filter(|n| (1..=TAKE_PROFIT_LEGS as u8).contains(n))
                .map(|n| Self::TakeProfit(n - 1))
                .ok_or_else(|| format!("unknown order role: {other}")),
        }
    }
}

impl TryFrom<String> for OrderRole {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<OrderRole> for String {
    fn from(role: OrderRole) -> Self {
        role.label()
    }
}
