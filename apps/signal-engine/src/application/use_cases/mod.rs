//! Application Use Cases
//!
//! Use cases orchestrate domain logic to fulfill application requirements.

mod ingest_signal;

pub use ingest_signal::{IngestError, IngestOutcome, IngestSignalUseCase, IntakeSettings};
