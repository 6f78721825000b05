// Allow unwrap/expect in tests - tests should panic on unexpected errors
// Allow test-specific patterns and pedantic lints in test code
#![cfg_attr(
    test,
    allow(
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::float_cmp,
        clippy::significant_drop_tightening,
        clippy::too_many_lines,
        clippy::match_same_arms,
        clippy::needless_pass_by_value,
        clippy::needless_collect,
        clippy::option_if_let_else,
        clippy::default_trait_access,
        clippy::items_after_statements,
        clippy::or_fun_call
    )
)]

//! Signal Engine - OTO Order Sequencing Core
//!
//! Turns a chat trade signal into one entry order and, once the entry
//! fills, a bracket of six take-profit legs and one stop.
//!
//! # Architecture (Clean Architecture + DDD + Hexagonal)
//!
//! ## Layers (inside → outside)
//!
//! - **Domain**: Core business logic (aggregates, value objects, domain events)
//!   - `signal_intake`: Text parser producing a `TradeIntent`
//!   - `sizing`: Notional-to-lot entry sizing and the take-profit split
//!   - `order_execution`: `TradeLifecycle` aggregate and its state machine
//!
//! - **Application**: Use cases and orchestration
//!   - `ports`: Interfaces for external systems (`ExchangeGateway`, `LifecycleRepository`)
//!   - `services`: `OrderSequencer` and the gateway retry policy
//!   - `use_cases`: `IngestSignal`
//!   - `dto`: Data transfer objects for API boundaries
//!
//! - **Infrastructure**: Adapters (implementations)
//!   - `gateway`: Dry-run exchange gateway
//!   - `events`: Tracing event publisher
//!   - `http`: REST intake

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::pedantic)]

// =============================================================================
// Clean Architecture Layers
// =============================================================================

/// Domain layer - Core business logic with no external dependencies.
pub mod domain;

/// Application layer - Use cases and port definitions.
pub mod application;

/// Infrastructure layer - Adapters and external integrations.
pub mod infrastructure;

// =============================================================================
// Cross-cutting
// =============================================================================

/// YAML configuration loading and startup validation.
pub mod config;

/// Prometheus metrics.
pub mod observability;

/// Logging and span export setup.
pub mod telemetry;

// =============================================================================
// Re-exports from Clean Architecture
// =============================================================================

// Domain re-exports
pub use domain::order_execution::{
    LifecycleReport, LifecycleState, OrderRecord, StateError, TradeLifecycle,
};
pub use domain::shared::{LifecycleId, Price, Quantity, Symbol, Timestamp};
pub use domain::signal_intake::{ParseError, SignalParser, TradeIntent};
pub use domain::sizing::{BracketSizer, SizingError, TakeProfitWeights, TradeConfig};

// Application re-exports
pub use application::ports::{
    EventPublisherPort, ExchangeGateway, GatewayError, InMemoryLifecycleRepository,
    LifecycleRepository, NoOpEventPublisher,
};
pub use application::services::{OrderSequencer, RetryPolicy, SequencerSettings};
pub use application::use_cases::{IngestError, IngestSignalUseCase, IntakeSettings};

// Infrastructure re-exports
pub use infrastructure::events::TracingEventPublisher;
pub use infrastructure::gateway::DryRunGateway;
pub use infrastructure::http::{AppState, create_router};
