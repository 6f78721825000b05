//! Shared Domain Types
//!
//! Value objects shared across bounded contexts.

pub mod value_objects;

pub use value_objects::{
    ClientOrderId, ExchangeOrderId, LifecycleId, Price, Quantity, SignalId, Symbol, Timestamp,
};
