//! Symbol value object for tradable markets.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A market symbol as it appears in signals.
///
/// Examples: "BTC", "ETH/USD", "SOL/USDC".
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Symbol(String);

impl Symbol {
    /// Create a new Symbol.
    ///
    /// The symbol is normalized to uppercase and trimmed.
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into().trim().to_uppercase())
    }

    /// Get the symbol string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The base coin: everything before the quote separator.
    ///
    /// `ETH/USD` yields `ETH`; a bare `BTC` yields itself.
    #[must_use]
    pub fn base(&self) -> &str {
        self.0.split('/').next().unwrap_or(&self.0)
    }

    /// Whether this symbol is named by `entry`, either in full or by base coin.
    #[must_use]
    pub fn matches(&self, entry: &str) -> bool {
        let entry = entry.trim();
        self.0.eq_ignore_ascii_case(entry) || self.base().eq_ignore_ascii_case(entry)
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for Symbol {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for Symbol {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}
