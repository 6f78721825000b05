//! Signal Engine Binary
//!
//! Starts the HTTP intake and sequences a bracketed order group for every
//! accepted signal.
//!
//! # Usage
//!
//! ```bash
//! cargo run --bin signal-engine
//! ```
//!
//! # Environment Variables
//!
//! - `SIGNAL_ENGINE_CONFIG`: Config file path (default: config.yaml)
//! - `RUST_LOG`: Log filter (overrides `observability.logging.level`)
//! - `OTEL_ENABLED`: Export spans over OTLP (default: false)

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use signal_engine::application::ports::InMemoryLifecycleRepository;
use signal_engine::application::services::OrderSequencer;
use signal_engine::application::use_cases::IngestSignalUseCase;
use signal_engine::config::{Config, load_config, validate_startup};
use signal_engine::infrastructure::events::TracingEventPublisher;
use signal_engine::infrastructure::gateway::DryRunGateway;
use signal_engine::infrastructure::http::{AppState, create_router};
use signal_engine::observability::{MetricsConfig, init_metrics};
use signal_engine::telemetry::init_telemetry;
use tokio::net::TcpListener;
use tokio::signal;
use tokio_util::sync::CancellationToken;

/// Time allowed for running lifecycles to settle after shutdown begins.
const SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(30);

type ConcreteIngest =
    IngestSignalUseCase<DryRunGateway, TracingEventPublisher, InMemoryLifecycleRepository>;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    load_dotenv();

    let config = load_config(None)?;
    let _telemetry = init_telemetry(&config.observability.logging);

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "Starting signal engine");

    let validation = validate_startup(&config)?;
    for warning in &validation.warnings {
        tracing::warn!(%warning, "Startup validation warning");
    }

    if config.observability.metrics.enabled {
        let addr: SocketAddr = config.observability.metrics.listen_addr.parse()?;
        init_metrics(&MetricsConfig::with_addr(addr))?;
    }

    let shutdown_token = CancellationToken::new();
    let (ingest, repository) = create_ingest(&config, shutdown_token.clone())?;

    let state = AppState {
        ingest: Arc::clone(&ingest),
        repository,
        dry_run: config.trading.dry_run,
        version: env!("CARGO_PKG_VERSION").to_string(),
    };
    let app = create_router(state);

    let http_addr: SocketAddr =
        format!("{}:{}", config.server.bind_address, config.server.http_port).parse()?;
    let listener = TcpListener::bind(http_addr).await?;

    tracing::info!(
        %http_addr,
        dry_run = config.trading.dry_run,
        trade_size_usd = %config.trading.trade_size_usd,
        entry_timeout_min = config.trading.entry_timeout_min,
        "Signal intake listening"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    drain_lifecycles(&ingest, &shutdown_token).await;

    tracing::info!("Signal engine stopped");
    Ok(())
}

/// Wire the gateway, publisher, repository and sequencer behind the intake.
fn create_ingest(
    config: &Config,
    shutdown: CancellationToken,
) -> Result<(Arc<ConcreteIngest>, Arc<InMemoryLifecycleRepository>), Box<dyn std::error::Error>> {
    let trade_config = config.trading.to_trade_config()?;

    let gateway = DryRunGateway::new(config.gateway.default_lot_size)
        .with_lot_sizes(config.gateway.lot_size_overrides.clone())
        .with_default_price_tick(config.gateway.default_price_tick)
        .with_price_ticks(config.gateway.price_tick_overrides.clone())
        .with_min_sizes(config.gateway.min_size_overrides.clone());
    let repository = Arc::new(InMemoryLifecycleRepository::new());

    let sequencer = OrderSequencer::new(
        Arc::new(gateway),
        Arc::new(TracingEventPublisher::new()),
        Arc::clone(&repository),
        Arc::new(trade_config),
        config.trading.sequencer_settings(),
    );

    let ingest = IngestSignalUseCase::new(
        Arc::new(sequencer),
        config.trading.intake_settings(),
        shutdown,
    );

    Ok((Arc::new(ingest), repository))
}

/// Cancel unfilled entries and wait for running lifecycles to finish.
async fn drain_lifecycles(ingest: &ConcreteIngest, shutdown_token: &CancellationToken) {
    shutdown_token.cancel();

    let deadline = tokio::time::Instant::now() + SHUTDOWN_TIMEOUT;
    while ingest.running_count() > 0 {
        if tokio::time::Instant::now() >= deadline {
            tracing::warn!(
                running = ingest.running_count(),
                timeout_secs = SHUTDOWN_TIMEOUT.as_secs(),
                "Lifecycles still running at shutdown timeout"
            );
            return;
        }
        tokio::time::sleep(Duration::from_millis(100)).await;
    }
}

/// Load .env file from current directory or any ancestor directory.
fn load_dotenv() {
    if dotenvy::dotenv().is_ok() {
        return;
    }

    if let Ok(cwd) = std::env::current_dir() {
        let mut dir = cwd.as_path();
        while let Some(parent) = dir.parent() {
            let env_path = parent.join(".env");
            if env_path.exists() {
                let _ = dotenvy::from_path(&env_path);
                return;
            }
            dir = parent;
        }
    }
}

/// Wait for shutdown signal (SIGTERM or SIGINT).
///
/// # Panics
///
/// Panics if signal handlers cannot be installed.
#[allow(clippy::expect_used)]
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("signal handler installation is critical for graceful shutdown");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("SIGTERM handler installation is critical for graceful shutdown")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, initiating shutdown");
        }
    }
}
