//! Exchange Gateway Port (Driven Port)
//!
//! The capability the sequencer needs from an exchange: place, cancel and
//! query orders, and look up market rules (lot size, price tick, minimum
//! size). Concrete adapters (dry-run or live) live in the infrastructure layer.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::application::services::ErrorCategory;
use crate::domain::order_execution::aggregate::OrderRecord;
use crate::domain::order_execution::value_objects::{
    OrderSide, OrderStatusReport, OrderType, TimeInForce,
};
use crate::domain::shared::{ClientOrderId, ExchangeOrderId, Price, Quantity, Symbol};
use crate::domain::sizing::MarketRules;

/// Request to place one order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaceOrderRequest {
    /// Idempotency key.
    pub client_order_id: ClientOrderId,
    /// Market.
    pub symbol: Symbol,
    /// Side.
    pub side: OrderSide,
    /// Order type.
    pub order_type: OrderType,
    /// Limit price, or trigger price for stop orders.
    pub price: Option<Price>,
    /// Time in force for limit orders.
    pub time_in_force: Option<TimeInForce>,
    /// Quantity.
    pub quantity: Quantity,
    /// Close-only flag.
    pub reduce_only: bool,
}

impl PlaceOrderRequest {
    /// Build the request for a lifecycle order record.
    #[must_use]
    pub fn from_record(symbol: &Symbol, record: &OrderRecord) -> Self {
        Self {
            client_order_id: record.client_order_id().clone(),
            symbol: symbol.clone(),
            side: record.side(),
            order_type: record.order_type(),
            price: record.price(),
            time_in_force: record.time_in_force(),
            quantity: record.requested_qty(),
            reduce_only: record.reduce_only(),
        }
    }
}

/// Gateway errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GatewayError {
    /// Transport failure.
    #[error("Network error: {message}")]
    NetworkError { message: String },

    /// Exchange throttled the request.
    #[error("Rate limited")]
    RateLimited { retry_after: Option<Duration> },

    /// Exchange refused the request.
    #[error("Rejected by exchange: {reason}")]
    RejectedByExchange { reason: String },

    /// Anything else.
    #[error("Unknown gateway error: {message}")]
    Unknown { message: String },
}

impl GatewayError {
    /// Retry classification.
    #[must_use]
    pub const fn category(&self) -> ErrorCategory {
        match self {
            Self::NetworkError { .. } | Self::Unknown { .. } => ErrorCategory::Retryable,
            Self::RateLimited { .. } => ErrorCategory::RateLimited,
            Self::RejectedByExchange { .. } => ErrorCategory::NonRetryable,
        }
    }

    /// Server-suggested delay before retrying, if any.
    #[must_use]
    pub const fn retry_after(&self) -> Option<Duration> {
        match self {
            Self::RateLimited { retry_after } => *retry_after,
            _ => None,
        }
    }
}

/// Port for exchange order operations.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ExchangeGateway: Send + Sync {
    /// Place an order; returns the exchange-assigned id.
    async fn place_order(&self, request: PlaceOrderRequest)
    -> Result<ExchangeOrderId, GatewayError>;

    /// Cancel an order. `Ok(false)` means the exchange refused because the
    /// order is no longer cancellable (typically already filled).
    async fn cancel_order(&self, order_id: &ExchangeOrderId) -> Result<bool, GatewayError>;

    /// Current status and cumulative filled quantity.
    async fn get_order_status(
        &self,
        order_id: &ExchangeOrderId,
    ) -> Result<OrderStatusReport, GatewayError>;

    /// Lot size, price tick and minimum order size for a market.
    async fn get_market_rules(&self, symbol: &Symbol) -> Result<MarketRules, GatewayError>;
}
