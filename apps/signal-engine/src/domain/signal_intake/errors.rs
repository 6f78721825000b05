//! Signal parsing errors.

use std::fmt;

use thiserror::Error;

/// A field every tradable signal must carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SignalField {
    /// LONG / SHORT keyword.
    Side,
    /// Market symbol.
    Symbol,
    /// Entry price or band (a market entry still needs a reference price).
    Entry,
    /// Stop-loss level.
    Stop,
}

impl fmt::Display for SignalField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Side => write!(f, "side"),
            Self::Symbol => write!(f, "symbol"),
            Self::Entry => write!(f, "entry"),
            Self::Stop => write!(f, "stop"),
        }
    }
}

/// Reasons a raw signal cannot become a trade intent.
///
/// A parse failure skips the trade; no order is ever placed for it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// A required field is absent.
    #[error("signal is missing required field: {field}")]
    MissingField {
        /// The missing field.
        field: SignalField,
    },

    /// The signal does not carry exactly the configured number of targets.
    #[error("expected {expected} take-profit levels, found {found}")]
    TakeProfitCountMismatch {
        /// Required number of targets.
        expected: usize,
        /// Number of targets found in the text.
        found: usize,
    },

    /// Stop or targets are on the wrong side of entry for the trade side.
    #[error("price levels are inconsistent with side: {reason}")]
    InvalidOrdering {
        /// What is out of order.
        reason: String,
    },

    /// A numeric token could not be represented as a decimal.
    #[error("invalid number for {field}: {value}")]
    InvalidNumber {
        /// Field the number belongs to.
        field: String,
        /// Raw token.
        value: String,
    },
}
