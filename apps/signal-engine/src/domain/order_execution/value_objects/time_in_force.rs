//! Time in force.

use serde::{Deserialize, Serialize};
use std::fmt;

/// How long a resting limit order stays working.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TimeInForce {
    /// Good-til-canceled.
    #[default]
    #[serde(alias = "gtc", alias = "Gtc")]
    Gtc,
    /// Immediate-or-cancel (fill immediately, cancel remainder).
    #[serde(alias = "ioc", alias = "Ioc")]
    Ioc,
    /// Add-liquidity-only: rejected instead of crossing the book.
    #[serde(
        alias = "ALO",
        alias = "alo",
        alias = "Alo",
        alias = "postonly",
        alias = "post_only"
    )]
    PostOnly,
}

impl TimeInForce {
    /// Returns true if the order must rest on the book.
    #[must_use]
    pub const fn is_post_only(&self) -> bool {
        matches!(self, Self::PostOnly)
    }
}

impl fmt::Display for TimeInForce {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Gtc => write!(f, "GTC"),
            Self::Ioc => write!(f, "IOC"),
            Self::PostOnly => write!(f, "POST_ONLY"),
        }
    }
}
