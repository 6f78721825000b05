//! Order Execution Value Objects
//!
//! Immutable types for order management.

mod entry_event;
mod lifecycle_state;
mod order_role;
mod order_side;
mod order_status;
mod order_type;
mod time_in_force;

pub use entry_event::{CancelCause, EntryDecision, EntryEvent};
pub use lifecycle_state::LifecycleState;
pub use order_role::OrderRole;
pub use order_side::OrderSide;
pub use order_status::{OrderStatus, OrderStatusReport};
pub use order_type::OrderType;
pub use time_in_force::TimeInForce;
