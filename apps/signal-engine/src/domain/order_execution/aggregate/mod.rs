//! Lifecycle Aggregate
//!
//! `TradeLifecycle` is the root entity; `OrderRecord`s are owned by it.

mod order_record;
mod trade_lifecycle;

pub use order_record::{NewOrderRecord, OrderRecord};
pub use trade_lifecycle::{LifecycleReport, TradeLifecycle};
