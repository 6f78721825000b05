//! OrderRecord: one order owned by a lifecycle.

use serde::{Deserialize, Serialize};

use crate::domain::order_execution::value_objects::{
    OrderRole, OrderSide, OrderStatus, OrderStatusReport, OrderType, TimeInForce,
};
use crate::domain::shared::{ClientOrderId, ExchangeOrderId, Price, Quantity};

/// Parameters for a new order record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewOrderRecord {
    /// Role in the lifecycle.
    pub role: OrderRole,
    /// Side.
    pub side: OrderSide,
    /// Order type.
    pub order_type: OrderType,
    /// Limit or trigger price; `None` for market orders.
    pub price: Option<Price>,
    /// Time in force for resting limit orders; `None` for market and stop orders.
    pub time_in_force: Option<TimeInForce>,
    /// Quantity to request.
    pub quantity: Quantity,
    /// Idempotency key.
    pub client_order_id: ClientOrderId,
    /// Whether the order may only reduce the position.
    pub reduce_only: bool,
}

/// Mutable record of a single order.
///
/// Updated on every placement result and status observation; archived with
/// the lifecycle report when the lifecycle ends.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderRecord {
    role: OrderRole,
    side: OrderSide,
    order_type: OrderType,
    price: Option<Price>,
    #[serde(default)]
    time_in_force: Option<TimeInForce>,
    requested_qty: Quantity,
    filled_qty: Quantity,
    status: OrderStatus,
    client_order_id: ClientOrderId,
    exchange_order_id: Option<ExchangeOrderId>,
    reduce_only: bool,
    error: Option<String>,
}

impl OrderRecord {
    /// Create a record for an order about to be submitted.
    #[must_use]
    pub fn new(params: NewOrderRecord) -> Self {
        Self {
            role: params.role,
            side: params.side,
            order_type: params.order_type,
            price: params.price,
            time_in_force: params.time_in_force,
            requested_qty: params.quantity,
            filled_qty: Quantity::ZERO,
            status: OrderStatus::Pending,
            client_order_id: params.client_order_id,
            exchange_order_id: None,
            reduce_only: params.reduce_only,
            error: None,
        }
    }

    /// Record the id the exchange assigned.
    pub fn mark_placed(&mut self, id: ExchangeOrderId) {
        self.exchange_order_id = Some(id);
    }

    /// Record that placement failed for good.
    pub fn mark_rejected(&mut self, reason: impl Into<String>) {
        self.status = OrderStatus::Rejected;
        self.error = Some(reason.into());
    }

    /// Apply a status observation.
    ///
    /// Filled quantity never decreases. Returns true if anything changed.
    pub fn observe(&mut self, report: OrderStatusReport) -> bool {
        let filled = self.filled_qty.max(report.filled_qty);
        let changed = filled != self.filled_qty || report.status != self.status;
        self.filled_qty = filled;
        self.status = report.status;
        changed
    }

    /// Role in the lifecycle.
    #[must_use]
    pub const fn role(&self) -> OrderRole {
        self.role
    }

    /// Side.
    #[must_use]
    pub const fn side(&self) -> OrderSide {
        self.side
    }

    /// Order type.
    #[must_use]
    pub const fn order_type(&self) -> OrderType {
        self.order_type
    }

    /// Limit or trigger price.
    #[must_use]
    pub const fn price(&self) -> Option<Price> {
        self.price
    }

    /// Time in force sent with the order.
    #[must_use]
    pub const fn time_in_force(&self) -> Option<TimeInForce> {
        self.time_in_force
    }

    /// Requested quantity.
    #[must_use]
    pub const fn requested_qty(&self) -> Quantity {
        self.requested_qty
    }

    /// Cumulative filled quantity.
    #[must_use]
    pub const fn filled_qty(&self) -> Quantity {
        self.filled_qty
    }

    /// Last known status.
    #[must_use]
    pub const fn status(&self) -> OrderStatus {
        self.status
    }

    /// Client order id.
    #[must_use]
    pub const fn client_order_id(&self) -> &ClientOrderId {
        &self.client_order_id
    }

    /// Exchange order id, once placed.
    #[must_use]
    pub const fn exchange_order_id(&self) -> Option<&ExchangeOrderId> {
        self.exchange_order_id.as_ref()
    }

    /// Whether this order may only reduce the position.
    #[must_use]
    pub const fn reduce_only(&self) -> bool {
        self.reduce_only
    }

    /// Placement error, if placement failed.
    #[must_use]
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// True once the exchange accepted the order.
    #[must_use]
    pub const fn is_placed(&self) -> bool {
        self.exchange_order_id.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn record() -> OrderRecord {
        OrderRecord::new(NewOrderRecord {
            role: OrderRole::Entry,
            side: OrderSide::Buy,
            order_type: OrderType::Limit,
            price: Some(Price::new(dec!(100))),
            time_in_force: Some(TimeInForce::Gtc),
            quantity: Quantity::new(dec!(10)),
            client_order_id: ClientOrderId::new("lc-entry"),
            reduce_only: false,
        })
    }

    #[test]
    fn new_record_is_pending_and_unplaced() {
        let r = record();
        assert_eq!(r.status(), OrderStatus::Pending);
        assert_eq!(r.filled_qty(), Quantity::ZERO);
        assert!(!r.is_placed());
    }

    #[test]
    fn observe_reports_changes_only() {
        let mut r = record();
        let partial = OrderStatusReport::new(OrderStatus::PartiallyFilled, Quantity::new(dec!(4)));
        assert!(r.observe(partial));
        assert!(!r.observe(partial));
        assert_eq!(r.filled_qty(), Quantity::new(dec!(4)));
    }

    #[test]
    fn filled_quantity_never_decreases() {
        let mut r = record();
        r.observe(OrderStatusReport::new(OrderStatus::PartiallyFilled, Quantity::new(dec!(4))));
        r.observe(OrderStatusReport::new(OrderStatus::PartiallyFilled, Quantity::new(dec!(2))));
        assert_eq!(r.filled_qty(), Quantity::new(dec!(4)));
    }

    #[test]
    fn mark_placed_and_rejected() {
        let mut r = record();
        r.mark_placed(ExchangeOrderId::new("x-1"));
        assert_eq!(r.exchange_order_id().map(ExchangeOrderId::as_str), Some("x-1"));

        let mut r = record();
        r.mark_rejected("insufficient margin");
        assert_eq!(r.status(), OrderStatus::Rejected);
        assert_eq!(r.error(), Some("insufficient margin"));
    }
}
