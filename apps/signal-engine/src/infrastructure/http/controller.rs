//! HTTP Controller (Driver Adapter)
//!
//! Axum-based REST API through which the chat listener delivers signals and
//! operators inspect or cancel lifecycles.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};

use crate::application::dto::LifecycleDto;
use crate::application::ports::{EventPublisherPort, ExchangeGateway, LifecycleRepository};
use crate::application::use_cases::{IngestError, IngestSignalUseCase};
use crate::domain::shared::LifecycleId;

use super::request::SubmitSignalRequest;
use super::response::{
    CancelLifecycleResponse, ErrorResponse, HealthResponse, LifecycleListResponse,
};

/// Application state shared across handlers.
pub struct AppState<G, P, R>
where
    G: ExchangeGateway + 'static,
    P: EventPublisherPort + 'static,
    R: LifecycleRepository + 'static,
{
    /// Use case for incoming signals.
    pub ingest: Arc<IngestSignalUseCase<G, P, R>>,
    /// Lifecycle repository for queries.
    pub repository: Arc<R>,
    /// Whether orders go to the dry-run gateway.
    pub dry_run: bool,
    /// Application version.
    pub version: String,
}

impl<G, P, R> Clone for AppState<G, P, R>
where
    G: ExchangeGateway + 'static,
    P: EventPublisherPort + 'static,
    R: LifecycleRepository + 'static,
{
    fn clone(&self) -> Self {
        Self {
            ingest: Arc::clone(&self.ingest),
            repository: Arc::clone(&self.repository),
            dry_run: self.dry_run,
            version: self.version.clone(),
        }
    }
}

/// Create the HTTP router with all endpoints.
pub fn create_router<G, P, R>(state: AppState<G, P, R>) -> Router
where
    G: ExchangeGateway + 'static,
    P: EventPublisherPort + 'static,
    R: LifecycleRepository + 'static,
{
    Router::new()
        .route("/health", get(health_check))
        .route("/api/v1/signals", post(submit_signal))
        .route("/api/v1/lifecycles", get(list_lifecycles))
        .route(
            "/api/v1/lifecycles/{id}",
            get(get_lifecycle).delete(cancel_lifecycle),
        )
        .with_state(state)
}

/// Health check endpoint.
async fn health_check<G, P, R>(State(state): State<AppState<G, P, R>>) -> impl IntoResponse
where
    G: ExchangeGateway + 'static,
    P: EventPublisherPort + 'static,
    R: LifecycleRepository + 'static,
{
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: state.version.clone(),
        running_lifecycles: state.ingest.running_count(),
        dry_run: state.dry_run,
    })
}

/// Submit signal endpoint.
async fn submit_signal<G, P, R>(
    State(state): State<AppState<G, P, R>>,
    Json(request): Json<SubmitSignalRequest>,
) -> Response
where
    G: ExchangeGateway + 'static,
    P: EventPublisherPort + 'static,
    R: LifecycleRepository + 'static,
{
    match state.ingest.execute(request.into()) {
        Ok(outcome) => (StatusCode::ACCEPTED, Json(outcome.accepted)).into_response(),
        Err(e) => {
            let status = match e {
                IngestError::Parse(_) => StatusCode::UNPROCESSABLE_ENTITY,
                IngestError::SymbolNotAllowed { .. } => StatusCode::FORBIDDEN,
                IngestError::Duplicate { .. } => StatusCode::CONFLICT,
            };
            (status, Json(ErrorResponse::new(e.reason(), e.to_string()))).into_response()
        }
    }
}

/// List lifecycles endpoint.
async fn list_lifecycles<G, P, R>(State(state): State<AppState<G, P, R>>) -> Response
where
    G: ExchangeGateway + 'static,
    P: EventPublisherPort + 'static,
    R: LifecycleRepository + 'static,
{
    match state.repository.list().await {
        Ok(reports) => {
            let lifecycles: Vec<LifecycleDto> =
                reports.iter().map(LifecycleDto::from_report).collect();
            Json(LifecycleListResponse {
                count: lifecycles.len(),
                lifecycles,
            })
            .into_response()
        }
        Err(e) => storage_error(&e.to_string()),
    }
}

/// Get one lifecycle endpoint.
async fn get_lifecycle<G, P, R>(
    State(state): State<AppState<G, P, R>>,
    Path(id): Path<String>,
) -> Response
where
    G: ExchangeGateway + 'static,
    P: EventPublisherPort + 'static,
    R: LifecycleRepository + 'static,
{
    match state.repository.find_by_id(&LifecycleId::new(&id)).await {
        Ok(Some(report)) => Json(LifecycleDto::from_report(&report)).into_response(),
        Ok(None) => not_found(&id),
        Err(e) => storage_error(&e.to_string()),
    }
}

/// Operator cancel endpoint.
async fn cancel_lifecycle<G, P, R>(
    State(state): State<AppState<G, P, R>>,
    Path(id): Path<String>,
) -> Response
where
    G: ExchangeGateway + 'static,
    P: EventPublisherPort + 'static,
    R: LifecycleRepository + 'static,
{
    let lifecycle_id = LifecycleId::new(&id);
    if state.ingest.cancel(&lifecycle_id) {
        return (
            StatusCode::ACCEPTED,
            Json(CancelLifecycleResponse {
                lifecycle_id: id,
                cancel_requested: true,
            }),
        )
            .into_response();
    }
    match state.repository.find_by_id(&lifecycle_id).await {
        Ok(Some(report)) => (
            StatusCode::CONFLICT,
            Json(ErrorResponse::new(
                "already_finished",
                format!("lifecycle {id} already ended in {}", report.state),
            )),
        )
            .into_response(),
        Ok(None) => not_found(&id),
        Err(e) => storage_error(&e.to_string()),
    }
}

fn not_found(id: &str) -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(ErrorResponse::new("not_found", format!("lifecycle {id} not found"))),
    )
        .into_response()
}

fn storage_error(message: &str) -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorResponse::new("storage_error", message)),
    )
        .into_response()
}
