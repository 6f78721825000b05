//! Lifecycle Repository Port (Driven Port)
//!
//! Stores lifecycle snapshots. The sequencer saves a report after every
//! phase, so the repository doubles as the live view and the archive.

use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::RwLock;

use crate::domain::order_execution::aggregate::LifecycleReport;
use crate::domain::shared::LifecycleId;

/// Repository errors.
#[derive(Debug, Clone, thiserror::Error)]
pub enum RepositoryError {
    /// Storage backend failure.
    #[error("Lifecycle storage error: {message}")]
    Storage { message: String },
}

/// Port for lifecycle persistence.
#[async_trait]
pub trait LifecycleRepository: Send + Sync {
    /// Insert or replace the snapshot for its lifecycle.
    async fn save(&self, report: &LifecycleReport) -> Result<(), RepositoryError>;

    /// Find a snapshot by lifecycle id.
    async fn find_by_id(&self, id: &LifecycleId) -> Result<Option<LifecycleReport>, RepositoryError>;

    /// All snapshots, oldest first.
    async fn list(&self) -> Result<Vec<LifecycleReport>, RepositoryError>;
}

/// In-memory implementation.
#[derive(Debug, Default)]
pub struct InMemoryLifecycleRepository {
    reports: RwLock<HashMap<LifecycleId, LifecycleReport>>,
}

impl InMemoryLifecycleRepository {
    /// Create an empty repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl LifecycleRepository for InMemoryLifecycleRepository {
    async fn save(&self, report: &LifecycleReport) -> Result<(), RepositoryError> {
        self.reports
            .write()
            .insert(report.lifecycle_id.clone(), report.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: &LifecycleId) -> Result<Option<LifecycleReport>, RepositoryError> {
        Ok(self.reports.read().get(id).cloned())
    }

    async fn list(&self) -> Result<Vec<LifecycleReport>, RepositoryError> {
        let mut reports: Vec<LifecycleReport> = self.reports.read().values().cloned().collect();
        reports.sort_by(|a, b| {
            a.started_at
                .cmp(&b.started_at)
                .then_with(|| a.lifecycle_id.as_str().cmp(b.lifecycle_id.as_str()))
        });
        Ok(reports)
    }
}
