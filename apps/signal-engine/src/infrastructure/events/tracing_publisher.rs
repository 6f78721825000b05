//! Event publisher that reports lifecycle events through `tracing`.
//!
//! Terminal lifecycles are logged at `info` when complete and at `warn`
//! otherwise, always with the lifecycle id, the triggering error and every
//! order id that reached the exchange.

use async_trait::async_trait;

use crate::application::ports::{EventPublishError, EventPublisherPort};
use crate::domain::order_execution::events::{LifecycleEvent, LifecycleFinished};
use crate::domain::order_execution::value_objects::LifecycleState;

/// Writes lifecycle events to the log.
#[derive(Debug, Clone, Default)]
pub struct TracingEventPublisher;

impl TracingEventPublisher {
    /// Create a new publisher.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    fn report_finished(event: &LifecycleFinished) {
        let placed = event
            .placed_order_ids
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(",");
        let error = event.error.as_deref().unwrap_or("");
        if event.state == LifecycleState::Complete {
            tracing::info!(
                lifecycle_id = %event.lifecycle_id,
                symbol = %event.symbol,
                state = %event.state,
                placed_order_ids = %placed,
                "Lifecycle complete"
            );
        } else {
            tracing::warn!(
                lifecycle_id = %event.lifecycle_id,
                symbol = %event.symbol,
                state = %event.state,
                error,
                placed_order_ids = %placed,
                "Lifecycle ended without a complete bracket"
            );
        }
    }
}

#[async_trait]
impl EventPublisherPort for TracingEventPublisher {
    async fn publish_lifecycle_events(
        &self,
        events: Vec<LifecycleEvent>,
    ) -> Result<(), EventPublishError> {
        for event in &events {
            match event {
                LifecycleEvent::Finished(finished) => Self::report_finished(finished),
                other => {
                    let payload = serde_json::to_string(other).map_err(|e| {
                        EventPublishError::SerializationError {
                            message: e.to_string(),
                        }
                    })?;
                    tracing::debug!(
                        lifecycle_id = %other.lifecycle_id(),
                        event_type = other.event_type(),
                        payload,
                        "Lifecycle event"
                    );
                }
            }
        }
        Ok(())
    }
}
