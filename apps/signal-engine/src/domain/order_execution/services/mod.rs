//! Order Execution Services

mod lifecycle_state_machine;

pub use lifecycle_state_machine::LifecycleStateMachine;
