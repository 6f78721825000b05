//! Application Ports (Driver and Driven)
//!
//! Ports define interfaces for interacting with external systems.
//! - **Driver Ports** (Primary/Inbound): How the world uses our application
//! - **Driven Ports** (Secondary/Outbound): How our application uses external systems

mod event_publisher_port;
mod exchange_gateway_port;
mod lifecycle_repository_port;

pub use event_publisher_port::{EventPublishError, EventPublisherPort, NoOpEventPublisher};
#[cfg(test)]
pub use exchange_gateway_port::MockExchangeGateway;
pub use exchange_gateway_port::{ExchangeGateway, GatewayError, PlaceOrderRequest};
pub use lifecycle_repository_port::{
    InMemoryLifecycleRepository, LifecycleRepository, RepositoryError,
};
