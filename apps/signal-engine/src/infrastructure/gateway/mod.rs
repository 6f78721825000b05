//! Exchange gateway adapters.
//!
//! Only the dry-run gateway ships in this binary; live exchange clients
//! implement [`ExchangeGateway`](crate::application::ports::ExchangeGateway)
//! outside the core.

mod dry_run;

pub use dry_run::DryRunGateway;
