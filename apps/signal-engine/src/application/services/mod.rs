//! Application Services
//!
//! Application services coordinate domain logic and infrastructure adapters.
//! They differ from use cases in that they typically run as background tasks
//! or provide long-running functionality.

mod order_sequencer;
mod retry;

pub use order_sequencer::{OrderSequencer, SequencerSettings};
pub use retry::{ErrorCategory, ExponentialBackoffCalculator, RetryPolicy, retry_gateway_call};
