//! Sizing Bounded Context
//!
//! Entry quantity from notional trade size, and the lot-rounded split of a
//! filled entry across the take-profit legs.

pub mod errors;
pub mod services;
pub mod value_objects;

pub use errors::SizingError;
pub use services::{BracketQuantities, BracketSizer};
pub use value_objects::{
    ExecutionMode, LotSize, MarketRules, PriceTick, TakeProfitWeights, TradeConfig, WEIGHT_TOLERANCE,
};
