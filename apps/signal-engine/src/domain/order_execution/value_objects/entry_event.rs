//! Inputs and outputs of the entry-phase transition function.
//!
//! The sequencer observes the outside world (status polls, its own timer,
//! cancel acknowledgements, operator requests) and feeds each observation in
//! as an [`EntryEvent`]. The lifecycle answers with an [`EntryDecision`]
//! telling the sequencer what to do next. How events are delivered (polling,
//! callbacks, channels) does not affect the outcome.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::{LifecycleState, OrderStatusReport};
use crate::domain::shared::Quantity;

/// Something the sequencer observed about the entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryEvent {
    /// A status poll (or push) returned this report.
    StatusObserved(OrderStatusReport),
    /// The entry timeout elapsed.
    TimeoutElapsed,
    /// The exchange acknowledged a cancel request.
    CancelConfirmed,
    /// The exchange refused a cancel request (typically: already filled).
    CancelRefused,
    /// An operator asked to abandon the lifecycle.
    OperatorCancel,
    /// The entry is still open after the cancel and the poll budget is spent.
    CancelUnresolved,
}

/// What the sequencer must do next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryDecision {
    /// Nothing changed; no gateway call is warranted.
    Ignore,
    /// Keep polling.
    KeepWaiting,
    /// Cancel the entry (or its unfilled remainder).
    CancelEntry,
    /// Query the entry status again before deciding.
    Requery,
    /// Size and place the bracket for this filled quantity.
    PlaceBrackets(Quantity),
    /// The lifecycle ended in this state.
    Finish(LifecycleState),
}

/// Why a cancel was requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CancelCause {
    /// Entry timeout elapsed without a fill.
    Timeout,
    /// A partial fill triggered the bracket; the remainder is withdrawn.
    PartialFill,
    /// Operator request.
    Operator,
}

impl fmt::Display for CancelCause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Timeout => write!(f, "TIMEOUT"),
            Self::PartialFill => write!(f, "PARTIAL_FILL"),
            Self::Operator => write!(f, "OPERATOR"),
        }
    }
}
