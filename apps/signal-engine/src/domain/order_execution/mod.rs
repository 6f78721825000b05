//! Order Execution Bounded Context
//!
//! The OTO lifecycle of one signal: entry submission, fill detection and
//! bracket placement.
//!
//! # Key Concepts
//!
//! - **TradeLifecycle Aggregate**: owns the entry and bracket order records
//! - **Transition Function**: `EntryEvent` in, `EntryDecision` out
//! - **Domain Events**: capturing every state transition

pub mod aggregate;
pub mod errors;
pub mod events;
pub mod services;
pub mod value_objects;

pub use aggregate::{LifecycleReport, NewOrderRecord, OrderRecord, TradeLifecycle};
pub use errors::StateError;
pub use events::LifecycleEvent;
pub use services::LifecycleStateMachine;
pub use value_objects::{
    CancelCause, EntryDecision, EntryEvent, LifecycleState, OrderRole, OrderSide, OrderStatus,
    OrderStatusReport, OrderType, TimeInForce,
};
