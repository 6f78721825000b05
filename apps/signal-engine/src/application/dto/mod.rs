//! Data Transfer Objects (DTOs)
//!
//! DTOs are used for API boundaries and use case inputs/outputs.

mod lifecycle_dto;
mod signal_dto;

pub use lifecycle_dto::{LifecycleDto, OrderDto};
pub use signal_dto::{SignalAcceptedDto, SignalRequestDto};
