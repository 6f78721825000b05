//! Signal Intake Bounded Context
//!
//! Turns raw chat text into a validated [`TradeIntent`].
//!
//! # Key Concepts
//!
//! - **TradeIntent**: symbol, side, entry, stop and exactly six targets
//! - **SignalParser**: pure, deterministic text-to-intent parsing

pub mod errors;
pub mod services;
pub mod value_objects;

pub use errors::{ParseError, SignalField};
pub use services::SignalParser;
pub use value_objects::{Entry, EntryType, TAKE_PROFIT_LEGS, TradeIntent, TradeSide};
