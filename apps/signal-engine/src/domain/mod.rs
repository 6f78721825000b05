//! Domain Layer
//!
//! The innermost layer containing business logic with zero infrastructure dependencies.
//! This layer defines:
//!
//! - **Aggregates**: Consistency boundaries with invariants
//! - **Value Objects**: Immutable domain types with equality by value
//! - **Domain Events**: Records of state transitions
//! - **Domain Services**: Stateless business logic
//!
//! # Bounded Contexts
//!
//! - [`signal_intake`]: Raw chat text to validated trade intent
//! - [`sizing`]: Entry quantity and take-profit split
//! - [`order_execution`]: OTO lifecycle state machine

pub mod order_execution;
pub mod shared;
pub mod signal_intake;
pub mod sizing;
