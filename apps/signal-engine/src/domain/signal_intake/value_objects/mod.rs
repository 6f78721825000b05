//! Signal Intake Value Objects

mod entry;
mod trade_intent;
mod trade_side;

pub use entry::{Entry, EntryType};
pub use trade_intent::{TAKE_PROFIT_LEGS, TradeIntent};
pub use trade_side::TradeSide;
