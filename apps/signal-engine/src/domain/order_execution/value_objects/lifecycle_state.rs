//! Lifecycle state of one OTO trade.

use serde::{Deserialize, Serialize};
use std::fmt;

/// State of a trade lifecycle.
///
/// `Idle -> EntrySubmitted -> {PartiallyFilled, Filled, Cancelled, Expired,
/// Rejected} -> BracketsSubmitted -> Complete`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LifecycleState {
    /// Intent accepted, nothing placed yet.
    Idle,
    /// Entry order placed, waiting for a fill.
    EntrySubmitted,
    /// At least one lot filled; the unfilled remainder is being cancelled.
    PartiallyFilled,
    /// Entry completely filled.
    Filled,
    /// Entry cancelled with less than one lot filled.
    Cancelled,
    /// Entry timed out with less than one lot filled.
    Expired,
    /// Lifecycle failed (sizing, placement, or a bracket leg).
    Rejected,
    /// Bracket orders are being placed.
    BracketsSubmitted,
    /// Every bracket leg was placed.
    Complete,
}

impl LifecycleState {
    /// Returns true if the lifecycle has ended.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::Complete | Self::Cancelled | Self::Rejected | Self::Expired
        )
    }

    /// Returns true while the entry is the only working order.
    #[must_use]
    pub const fn is_entry_phase(&self) -> bool {
        matches!(self, Self::EntrySubmitted | Self::PartiallyFilled)
    }
}

impl fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => write!(f, "IDLE"),
            Self::EntrySubmitted => write!(f, "ENTRY_SUBMITTED"),
            Self::PartiallyFilled => write!(f, "PARTIALLY_FILLED"),
            Self::Filled => write!(f, "FILLED"),
            Self::Cancelled => write!(f, "CANCELLED"),
            Self::Expired => write!(f, "EXPIRED"),
            Self::Rejected => write!(f, "REJECTED"),
            Self::BracketsSubmitted => write!(f, "BRACKETS_SUBMITTED"),
            Self::Complete => write!(f, "COMPLETE"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn terminal_states() {
        assert!(LifecycleState::Complete.is_terminal());
        assert!(LifecycleState::Cancelled.is_terminal());
        assert!(LifecycleState::Rejected.is_terminal());
        assert!(LifecycleState::Expired.is_terminal());
        assert!(!LifecycleState::Filled.is_terminal());
        assert!(!LifecycleState::BracketsSubmitted.is_terminal());
    }

    #[test]
    fn display_is_screaming_snake() {
        assert_eq!(LifecycleState::BracketsSubmitted.to_string(), "BRACKETS_SUBMITTED");
        assert_eq!(
            serde_json::to_string(&LifecycleState::EntrySubmitted).unwrap(),
            "\"ENTRY_SUBMITTED\""
        );
    }
}
