//! Sizing Value Objects

mod lot_size;
mod market_rules;
mod price_tick;
mod tp_weights;
mod trade_config;

pub use lot_size::LotSize;
pub use market_rules::MarketRules;
pub use price_tick::PriceTick;
pub use tp_weights::{TakeProfitWeights, WEIGHT_TOLERANCE};
pub use trade_config::{ExecutionMode, TradeConfig};
