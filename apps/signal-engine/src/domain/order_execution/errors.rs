//! Lifecycle state errors.
//!
//! These indicate a sequencing bug, never a market condition.

use thiserror::Error;

use super::value_objects::{LifecycleState, OrderRole};

/// An operation was attempted in a state that does not allow it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StateError {
    /// Transition not in the lifecycle table.
    #[error("invalid lifecycle transition {from} -> {to}")]
    InvalidTransition {
        /// Current state.
        from: LifecycleState,
        /// Attempted state.
        to: LifecycleState,
    },

    /// Orders were built before the market rules were applied.
    #[error("market rules have not been applied")]
    NoMarketRules,

    /// An entry event arrived before the entry was placed.
    #[error("no entry order has been submitted")]
    NoEntry,

    /// Bracket placement was attempted before any fill.
    #[error("bracket requested in {state} before the entry filled")]
    NoFill {
        /// State at the time of the request.
        state: LifecycleState,
    },

    /// A bracket result was recorded for a leg that was never created.
    #[error("unknown bracket leg {role}")]
    UnknownLeg {
        /// Leg role.
        role: OrderRole,
    },

    /// Bracket quantities no longer track the filled entry.
    #[error("bracket invariant violated: {reason}")]
    InvariantViolation {
        /// Description of the violation.
        reason: String,
    },
}
