//! Signal intake DTOs

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::shared::LifecycleId;
use crate::domain::signal_intake::{EntryType, TradeIntent, TradeSide};

/// A raw chat message delivered by the listener.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignalRequestDto {
    /// Message text.
    pub text: String,
    /// Channel or source identifier.
    #[serde(default)]
    pub source: Option<String>,
}

/// An accepted signal and the lifecycle started for it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignalAcceptedDto {
    /// Lifecycle started for the signal.
    pub lifecycle_id: String,
    /// Symbol.
    pub symbol: String,
    /// Side.
    pub side: TradeSide,
    /// Entry order type.
    pub entry_type: EntryType,
    /// Entry reference price.
    pub entry_price: Decimal,
    /// Stop price.
    pub stop: Decimal,
    /// Take-profit prices, nearest first.
    pub take_profits: Vec<Decimal>,
    /// Id carried by the signal, if any.
    pub signal_id: Option<String>,
}

impl SignalAcceptedDto {
    /// Create from the parsed intent.
    #[must_use]
    pub fn from_intent(lifecycle_id: &LifecycleId, intent: &TradeIntent) -> Self {
        Self {
            lifecycle_id: lifecycle_id.to_string(),
            symbol: intent.symbol().to_string(),
            side: intent.side(),
            entry_type: intent.entry().order_type(),
            entry_price: intent.entry_price().amount(),
            stop: intent.stop().amount(),
            take_profits: intent.take_profits().iter().map(|p| p.amount()).collect(),
            signal_id: intent.signal_id().map(ToString::to_string),
        }
    }
}
