//! Lifecycle DTOs

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::order_execution::aggregate::{LifecycleReport, OrderRecord};
use crate::domain::order_execution::value_objects::{LifecycleState, OrderSide, OrderStatus, OrderType};
use crate::domain::shared::Timestamp;
use crate::domain::signal_intake::TradeSide;

/// One order of a lifecycle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderDto {
    /// Role label (`entry`, `tp1`..`tp6`, `stop`).
    pub role: String,
    /// Client order id.
    pub client_order_id: String,
    /// Exchange order id, once placed.
    pub order_id: Option<String>,
    /// Side.
    pub side: OrderSide,
    /// Type.
    pub order_type: OrderType,
    /// Limit or trigger price.
    pub price: Option<Decimal>,
    /// Requested quantity.
    pub quantity: Decimal,
    /// Filled quantity.
    pub filled_qty: Decimal,
    /// Last known status.
    pub status: OrderStatus,
    /// Placement error.
    pub error: Option<String>,
}

impl OrderDto {
    /// Create from a domain order record.
    #[must_use]
    pub fn from_record(record: &OrderRecord) -> Self {
        Self {
            role: record.role().label(),
            client_order_id: record.client_order_id().to_string(),
            order_id: record.exchange_order_id().map(ToString::to_string),
            side: record.side(),
            order_type: record.order_type(),
            price: record.price().map(|p| p.amount()),
            quantity: record.requested_qty().amount(),
            filled_qty: record.filled_qty().amount(),
            status: record.status(),
            error: record.error().map(str::to_string),
        }
    }
}

/// A lifecycle as shown to operators.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LifecycleDto {
    /// Lifecycle ID.
    pub lifecycle_id: String,
    /// Symbol.
    pub symbol: String,
    /// Side.
    pub side: TradeSide,
    /// State.
    pub state: LifecycleState,
    /// Triggering error for failed or abandoned lifecycles.
    pub error: Option<String>,
    /// Every order id that reached the exchange.
    pub placed_order_ids: Vec<String>,
    /// Entry order.
    pub entry: Option<OrderDto>,
    /// Bracket orders.
    pub brackets: Vec<OrderDto>,
    /// Started at.
    pub started_at: Timestamp,
    /// Finished at.
    pub finished_at: Option<Timestamp>,
}

impl LifecycleDto {
    /// Create from a lifecycle report.
    #[must_use]
    pub fn from_report(report: &LifecycleReport) -> Self {
        Self {
            lifecycle_id: report.lifecycle_id.to_string(),
            symbol: report.intent.symbol().to_string(),
            side: report.intent.side(),
            state: report.state,
            error: report.error.clone(),
            placed_order_ids: report.placed_order_ids.iter().map(ToString::to_string).collect(),
            entry: report.entry.as_ref().map(OrderDto::from_record),
            brackets: report.brackets.iter().map(OrderDto::from_record).collect(),
            started_at: report.started_at,
            finished_at: report.finished_at,
        }
    }
}
