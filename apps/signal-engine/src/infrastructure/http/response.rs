//! HTTP response DTOs.

use serde::{Deserialize, Serialize};

use crate::application::dto::LifecycleDto;

/// Response from health check.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Health status.
    pub status: String,
    /// Service version.
    pub version: String,
    /// Lifecycles currently running.
    pub running_lifecycles: usize,
    /// Whether orders go to the dry-run gateway.
    pub dry_run: bool,
}

/// Error body for rejected requests.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Machine-readable reason.
    pub reason: String,
    /// Human-readable message.
    pub error: String,
}

impl ErrorResponse {
    /// Create an error body.
    #[must_use]
    pub fn new(reason: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
            error: error.into(),
        }
    }
}

/// Response listing lifecycles.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LifecycleListResponse {
    /// Number of lifecycles.
    pub count: usize,
    /// The lifecycles, oldest first.
    pub lifecycles: Vec<LifecycleDto>,
}

/// Response from an operator cancel.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CancelLifecycleResponse {
    /// Lifecycle the cancel was sent to.
    pub lifecycle_id: String,
    /// Whether the cancel reached a running lifecycle.
    pub cancel_requested: bool,
}
