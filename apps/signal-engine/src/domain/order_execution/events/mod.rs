//! Domain events for trade lifecycles.
//!
//! Raised by the [`TradeLifecycle`](super::aggregate::TradeLifecycle)
//! aggregate and drained by the sequencer for publication.

use serde::{Deserialize, Serialize};

use super::value_objects::{CancelCause, LifecycleState, OrderRole, OrderStatus};
use crate::domain::shared::{ExchangeOrderId, LifecycleId, Quantity, Symbol, Timestamp};

/// All lifecycle events.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LifecycleEvent {
    /// Entry order accepted by the exchange.
    EntrySubmitted(EntrySubmitted),
    /// Entry fill progress changed.
    EntryFillObserved(EntryFillObserved),
    /// Entry cancel requested.
    EntryCancelRequested(EntryCancelRequested),
    /// One bracket leg placed or failed.
    BracketLegResolved(BracketLegResolved),
    /// Lifecycle reached a terminal state.
    Finished(LifecycleFinished),
}

impl LifecycleEvent {
    /// Lifecycle the event belongs to.
    #[must_use]
    pub const fn lifecycle_id(&self) -> &LifecycleId {
        match self {
            Self::EntrySubmitted(e) => &e.lifecycle_id,
            Self::EntryFillObserved(e) => &e.lifecycle_id,
            Self::EntryCancelRequested(e) => &e.lifecycle_id,
            Self::BracketLegResolved(e) => &e.lifecycle_id,
            Self::Finished(e) => &e.lifecycle_id,
        }
    }

    /// Get the event type name.
    #[must_use]
    pub const fn event_type(&self) -> &'static str {
        match self {
            Self::EntrySubmitted(_) => "ENTRY_SUBMITTED",
            Self::EntryFillObserved(_) => "ENTRY_FILL_OBSERVED",
            Self::EntryCancelRequested(_) => "ENTRY_CANCEL_REQUESTED",
            Self::BracketLegResolved(_) => "BRACKET_LEG_RESOLVED",
            Self::Finished(_) => "LIFECYCLE_FINISHED",
        }
    }
}

/// Event: entry order accepted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntrySubmitted {
    /// Lifecycle ID.
    pub lifecycle_id: LifecycleId,
    /// Symbol.
    pub symbol: Symbol,
    /// Requested quantity.
    pub quantity: Quantity,
    /// Exchange order ID.
    pub order_id: ExchangeOrderId,
    /// When it happened.
    pub occurred_at: Timestamp,
}

/// Event: entry fill progress.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryFillObserved {
    /// Lifecycle ID.
    pub lifecycle_id: LifecycleId,
    /// Reported status.
    pub status: OrderStatus,
    /// Cumulative filled quantity.
    pub filled_qty: Quantity,
    /// When it happened.
    pub occurred_at: Timestamp,
}

/// Event: entry cancel requested.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryCancelRequested {
    /// Lifecycle ID.
    pub lifecycle_id: LifecycleId,
    /// Why.
    pub cause: CancelCause,
    /// When it happened.
    pub occurred_at: Timestamp,
}

/// Event: bracket leg outcome.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BracketLegResolved {
    /// Lifecycle ID.
    pub lifecycle_id: LifecycleId,
    /// Leg.
    pub role: OrderRole,
    /// Requested quantity.
    pub quantity: Quantity,
    /// Exchange order ID if the leg was placed.
    pub order_id: Option<ExchangeOrderId>,
    /// Failure reason if it was not.
    pub error: Option<String>,
    /// When it happened.
    pub occurred_at: Timestamp,
}

/// Event: lifecycle ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LifecycleFinished {
    /// Lifecycle ID.
    pub lifecycle_id: LifecycleId,
    /// Symbol.
    pub symbol: Symbol,
    /// Terminal state.
    pub state: LifecycleState,
    /// Triggering error, if any.
    pub error: Option<String>,
    /// Every order id that reached the exchange (entry and brackets).
    pub placed_order_ids: Vec<ExchangeOrderId>,
    /// When it happened.
    pub occurred_at: Timestamp,
}
