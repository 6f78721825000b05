//! Ingest Signal Use Case
//!
//! Entry point for raw chat messages: parse, filter, de-duplicate, then start
//! an isolated lifecycle task for the signal.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::application::dto::{SignalAcceptedDto, SignalRequestDto};
use crate::application::ports::{EventPublisherPort, ExchangeGateway, LifecycleRepository};
use crate::application::services::OrderSequencer;
use crate::domain::order_execution::aggregate::LifecycleReport;
use crate::domain::shared::{LifecycleId, SignalId, Symbol};
use crate::domain::signal_intake::{ParseError, SignalParser, TradeIntent};
use crate::observability::{record_signal_received, record_signal_skipped};

/// Why a message did not start a lifecycle.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IngestError {
    /// The message is not a usable signal.
    #[error("Signal rejected: {0}")]
    Parse(#[from] ParseError),

    /// Symbol is not on the allow-list.
    #[error("Symbol {symbol} is not allowed")]
    SymbolNotAllowed { symbol: String },

    /// A signal with this id was already accepted within the window.
    #[error("Duplicate signal {signal_id}")]
    Duplicate { signal_id: String },
}

impl IngestError {
    /// Short label for metrics.
    #[must_use]
    pub const fn reason(&self) -> &'static str {
        match self {
            Self::Parse(_) => "parse_error",
            Self::SymbolNotAllowed { .. } => "symbol_not_allowed",
            Self::Duplicate { .. } => "duplicate",
        }
    }
}

/// Intake filtering settings.
#[derive(Debug, Clone, Default)]
pub struct IntakeSettings {
    /// Symbols (full or base coin) accepted; empty accepts everything.
    pub allowed_symbols: Vec<String>,
    /// How long a signal id is remembered.
    pub duplicate_window: Duration,
}

/// A started lifecycle.
#[derive(Debug)]
pub struct IngestOutcome {
    /// Response for the caller.
    pub accepted: SignalAcceptedDto,
    /// Completes with the lifecycle's final report.
    pub handle: JoinHandle<LifecycleReport>,
}

/// Use case for turning raw messages into running lifecycles.
pub struct IngestSignalUseCase<G, P, R>
where
    G: ExchangeGateway + 'static,
    P: EventPublisherPort + 'static,
    R: LifecycleRepository + 'static,
{
    parser: SignalParser,
    sequencer: Arc<OrderSequencer<G, P, R>>,
    settings: IntakeSettings,
    seen: Mutex<HashMap<SignalId, Instant>>,
    running: Arc<Mutex<HashMap<LifecycleId, CancellationToken>>>,
    shutdown: CancellationToken,
}

impl<G, P, R> IngestSignalUseCase<G, P, R>
where
    G: ExchangeGateway + 'static,
    P: EventPublisherPort + 'static,
    R: LifecycleRepository + 'static,
{
    /// Create a new use case. Cancelling `shutdown` cancels every running
    /// lifecycle's entry.
    pub fn new(
        sequencer: Arc<OrderSequencer<G, P, R>>,
        settings: IntakeSettings,
        shutdown: CancellationToken,
    ) -> Self {
        Self {
            parser: SignalParser::new(),
            sequencer,
            settings,
            seen: Mutex::new(HashMap::new()),
            running: Arc::new(Mutex::new(HashMap::new())),
            shutdown,
        }
    }

    /// Execute the use case.
    pub fn execute(&self, request: SignalRequestDto) -> Result<IngestOutcome, IngestError> {
        record_signal_received();
        let result = self.accept(request);
        if let Err(e) = &result {
            record_signal_skipped(e.reason());
            tracing::info!(reason = e.reason(), error = %e, "Signal skipped");
        }
        let intent = result?;

        let lifecycle_id = LifecycleId::generate();
        let accepted = SignalAcceptedDto::from_intent(&lifecycle_id, &intent);
        let handle = self.spawn(lifecycle_id, intent);
        Ok(IngestOutcome { accepted, handle })
    }

    /// Request operator cancel of a running lifecycle.
    ///
    /// Returns false if no such lifecycle is running.
    pub fn cancel(&self, id: &LifecycleId) -> bool {
        let token = self.running.lock().get(id).cloned();
        token.is_some_and(|token| {
            tracing::info!(lifecycle_id = %id, "Operator cancel requested");
            token.cancel();
            true
        })
    }

    /// Number of lifecycles still running.
    #[must_use]
    pub fn running_count(&self) -> usize {
        self.running.lock().len()
    }

    fn accept(&self, request: SignalRequestDto) -> Result<TradeIntent, IngestError> {
        let intent = self.parser.parse(&request.text)?.with_source(request.source);

        if !self.is_allowed(intent.symbol()) {
            return Err(IngestError::SymbolNotAllowed {
                symbol: intent.symbol().to_string(),
            });
        }

        if let Some(signal_id) = intent.signal_id() {
            let now = Instant::now();
            let window = self.settings.duplicate_window;
            let mut seen = self.seen.lock();
            seen.retain(|_, at| now.duration_since(*at) < window);
            if seen.contains_key(signal_id) {
                return Err(IngestError::Duplicate {
                    signal_id: signal_id.to_string(),
                });
            }
            seen.insert(signal_id.clone(), now);
        }
        Ok(intent)
    }

    fn is_allowed(&self, symbol: &Symbol) -> bool {
        self.settings.allowed_symbols.is_empty()
            || self
                .settings
                .allowed_symbols
                .iter()
                .any(|entry| symbol.matches(entry))
    }

    fn spawn(&self, id: LifecycleId, intent: TradeIntent) -> JoinHandle<LifecycleReport> {
        let token = self.shutdown.child_token();
        self.running.lock().insert(id.clone(), token.clone());

        let sequencer = Arc::clone(&self.sequencer);
        let entry = RunningEntry {
            running: Arc::clone(&self.running),
            id: id.clone(),
        };
        tokio::spawn(async move {
            let _entry = entry;
            sequencer.run(id, intent, token).await
        })
    }
}

/// Removes a lifecycle from the running map when its task ends, panics
/// included.
struct RunningEntry {
    running: Arc<Mutex<HashMap<LifecycleId, CancellationToken>>>,
    id: LifecycleId,
}

impl Drop for RunningEntry {
    fn drop(&mut self) {
        self.running.lock().remove(&self.id);
    }
}
