//! Event Publisher Port (Driven Port)
//!
//! Interface for publishing lifecycle events to external systems.

use async_trait::async_trait;

use crate::domain::order_execution::events::LifecycleEvent;

/// Event publishing error.
#[derive(Debug, Clone, thiserror::Error)]
pub enum EventPublishError {
    /// Connection error.
    #[error("Event publish connection error: {message}")]
    ConnectionError { message: String },

    /// Serialization error.
    #[error("Event serialization error: {message}")]
    SerializationError { message: String },

    /// Publishing failed.
    #[error("Event publish failed: {message}")]
    PublishFailed { message: String },
}

/// Port for publishing lifecycle events.
#[async_trait]
pub trait EventPublisherPort: Send + Sync {
    /// Publish lifecycle events.
    async fn publish_lifecycle_events(
        &self,
        events: Vec<LifecycleEvent>,
    ) -> Result<(), EventPublishError>;

    /// Publish a single lifecycle event.
    async fn publish_lifecycle_event(&self, event: LifecycleEvent) -> Result<(), EventPublishError> {
        self.publish_lifecycle_events(vec![event]).await
    }
}

/// No-op event publisher for testing.
#[derive(Debug, Clone, Default)]
pub struct NoOpEventPublisher;

#[async_trait]
impl EventPublisherPort for NoOpEventPublisher {
    async fn publish_lifecycle_events(
        &self,
        _events: Vec<LifecycleEvent>,
    ) -> Result<(), EventPublishError> {
        Ok(())
    }
}
