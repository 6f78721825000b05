//! Lifecycle State Machine Service
//!
//! The table of legal OTO lifecycle transitions.

use crate::domain::order_execution::errors::StateError;
use crate::domain::order_execution::value_objects::LifecycleState;

/// Validates lifecycle transitions.
pub struct LifecycleStateMachine;

impl LifecycleStateMachine {
    /// Check if a state transition is valid.
    #[must_use]
    pub const fn is_valid_transition(from: LifecycleState, to: LifecycleState) -> bool {
        use LifecycleState::{
            BracketsSubmitted, Cancelled, Complete, EntrySubmitted, Expired, Filled, Idle,
            PartiallyFilled, Rejected,
        };
        matches!(
            (from, to),
            // From Idle
            (Idle, EntrySubmitted)
                | (Idle, Rejected)
                // From EntrySubmitted
                | (EntrySubmitted, PartiallyFilled)
                | (EntrySubmitted, Filled)
                | (EntrySubmitted, Cancelled)
                | (EntrySubmitted, Expired)
                | (EntrySubmitted, Rejected)
                // From PartiallyFilled (remainder cancel in flight)
                | (PartiallyFilled, Filled)
                | (PartiallyFilled, BracketsSubmitted)
                | (PartiallyFilled, Rejected)
                // From Filled
                | (Filled, BracketsSubmitted)
                | (Filled, Rejected)
                // From BracketsSubmitted
                | (BracketsSubmitted, Complete)
                | (BracketsSubmitted, Rejected)
        )
    }

    /// Validate a state transition.
    pub fn validate_transition(
        from: LifecycleState,
        to: LifecycleState,
    ) -> Result<(), StateError> {
        if Self::is_valid_transition(from, to) {
            Ok(())
        } else {
            Err(StateError::InvalidTransition { from, to })
        }
    }

    /// Get all valid next states from a given state.
    #[must_use]
    pub fn valid_next_states(from: LifecycleState) -> Vec<LifecycleState> {
        use LifecycleState::{
            BracketsSubmitted, Cancelled, Complete, EntrySubmitted, Expired, Filled, Idle,
            PartiallyFilled, Rejected,
        };
        [
            Idle,
            EntrySubmitted,
            PartiallyFilled,
            Filled,
            Cancelled,
            Expired,
            Rejected,
            BracketsSubmitted,
            Complete,
        ]
        .into_iter()
        .filter(|to| Self::is_valid_transition(from, *to))
        .collect()
    }
}
