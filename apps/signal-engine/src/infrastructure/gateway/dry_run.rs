//! Dry-run exchange gateway.
//!
//! Accepts every well-formed order and reports it fully filled at the
//! requested quantity on the first status query. Nothing leaves the process.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use parking_lot::RwLock;
use rust_decimal::Decimal;

use crate::application::ports::{ExchangeGateway, GatewayError, PlaceOrderRequest};
use crate::domain::order_execution::value_objects::{OrderStatus, OrderStatusReport};
use crate::domain::shared::{ExchangeOrderId, Symbol};
use crate::domain::sizing::{LotSize, MarketRules, PriceTick, SizingError};

/// Tick used for markets without a configured one.
pub const DEFAULT_PRICE_TICK: Decimal = Decimal::from_parts(1, 0, 0, false, 2);

/// Synthetic exchange for end-to-end runs without a venue.
#[derive(Debug)]
pub struct DryRunGateway {
    default_lot_size: Decimal,
    default_price_tick: Decimal,
    lot_sizes: HashMap<String, Decimal>,
    price_ticks: HashMap<String, Decimal>,
    min_sizes: HashMap<String, Decimal>,
    next_id: AtomicU64,
    orders: RwLock<HashMap<ExchangeOrderId, PlaceOrderRequest>>,
}

impl DryRunGateway {
    /// Create a gateway that reports `default_lot_size` and a 0.01 price
    /// tick for every market.
    #[must_use]
    pub fn new(default_lot_size: Decimal) -> Self {
        Self {
            default_lot_size,
            default_price_tick: DEFAULT_PRICE_TICK,
            lot_sizes: HashMap::new(),
            price_ticks: HashMap::new(),
            min_sizes: HashMap::new(),
            next_id: AtomicU64::new(1),
            orders: RwLock::new(HashMap::new()),
        }
    }

    /// Per-market lot sizes, keyed by full symbol or base coin.
    #[must_use]
    pub fn with_lot_sizes(mut self, overrides: HashMap<String, Decimal>) -> Self {
        self.lot_sizes = normalize_keys(overrides);
        self
    }

    /// Tick for markets without an override.
    #[must_use]
    pub const fn with_default_price_tick(mut self, tick: Decimal) -> Self {
        self.default_price_tick = tick;
        self
    }

    /// Per-market price ticks, keyed like lot sizes.
    #[must_use]
    pub fn with_price_ticks(mut self, overrides: HashMap<String, Decimal>) -> Self {
        self.price_ticks = normalize_keys(overrides);
        self
    }

    /// Per-market minimum order sizes. Markets without one have no minimum.
    #[must_use]
    pub fn with_min_sizes(mut self, overrides: HashMap<String, Decimal>) -> Self {
        self.min_sizes = normalize_keys(overrides);
        self
    }

    /// Orders accepted so far, in placement order.
    #[must_use]
    pub fn placed_orders(&self) -> Vec<(ExchangeOrderId, PlaceOrderRequest)> {
        let mut orders: Vec<_> = self
            .orders
            .read()
            .iter()
            .map(|(id, request)| (id.clone(), request.clone()))
            .collect();
        orders.sort_by_key(|(id, _)| sequence_of(id));
        orders
    }

    fn request_for(&self, order_id: &ExchangeOrderId) -> Result<PlaceOrderRequest, GatewayError> {
        self.orders
            .read()
            .get(order_id)
            .cloned()
            .ok_or_else(|| GatewayError::RejectedByExchange {
                reason: format!("unknown order {order_id}"),
            })
    }
}

fn normalize_keys(overrides: HashMap<String, Decimal>) -> HashMap<String, Decimal> {
    overrides
        .into_iter()
        .map(|(symbol, value)| (symbol.trim().to_uppercase(), value))
        .collect()
}

fn lookup(table: &HashMap<String, Decimal>, symbol: &Symbol) -> Option<Decimal> {
    table
        .get(symbol.as_str())
        .or_else(|| table.get(symbol.base()))
        .copied()
}

fn invalid_market(symbol: &Symbol, e: &SizingError) -> GatewayError {
    GatewayError::RejectedByExchange {
        reason: format!("invalid market metadata for {symbol}: {e}"),
    }
}

fn sequence_of(id: &ExchangeOrderId) -> u64 {
    id.as_str()
        .strip_prefix("dry-")
        .and_then(|n| n.parse().ok())
        .unwrap_or(u64::MAX)
}

#[async_trait]
impl ExchangeGateway for DryRunGateway {
    async fn place_order(
        &self,
        request: PlaceOrderRequest,
    ) -> Result<ExchangeOrderId, GatewayError> {
        if !request.quantity.is_positive() {
            return Err(GatewayError::RejectedByExchange {
                reason: format!("quantity must be positive, got {}", request.quantity),
            });
        }
        if request.order_type.is_triggered() && request.price.is_none() {
            return Err(GatewayError::RejectedByExchange {
                reason: "stop order without trigger price".to_string(),
            });
        }

        let order_id = ExchangeOrderId::new(format!(
            "dry-{}",
            self.next_id.fetch_add(1, Ordering::Relaxed)
        ));
        tracing::info!(
            order_id = %order_id,
            client_order_id = %request.client_order_id,
            symbol = %request.symbol,
            side = %request.side,
            order_type = %request.order_type,
            quantity = %request.quantity,
            price = ?request.price.map(|p| p.to_string()),
            time_in_force = ?request.time_in_force,
            reduce_only = request.reduce_only,
            "[dry-run] order accepted"
        );
        self.orders.write().insert(order_id.clone(), request);
        Ok(order_id)
    }

    async fn cancel_order(&self, order_id: &ExchangeOrderId) -> Result<bool, GatewayError> {
        self.request_for(order_id)?;
        tracing::info!(order_id = %order_id, "[dry-run] cancel acknowledged");
        Ok(true)
    }

    async fn get_order_status(
        &self,
        order_id: &ExchangeOrderId,
    ) -> Result<OrderStatusReport, GatewayError> {
        let request = self.request_for(order_id)?;
        Ok(OrderStatusReport::new(OrderStatus::Filled, request.quantity))
    }

    async fn get_market_rules(&self, symbol: &Symbol) -> Result<MarketRules, GatewayError> {
        let lot = lookup(&self.lot_sizes, symbol).unwrap_or(self.default_lot_size);
        let tick = lookup(&self.price_ticks, symbol).unwrap_or(self.default_price_tick);
        let lot = LotSize::new(lot).map_err(|e| invalid_market(symbol, &e))?;
        let tick = PriceTick::new(tick).map_err(|e| invalid_market(symbol, &e))?;
        MarketRules::new(lot, tick)
            .with_min_size(lookup(&self.min_sizes, symbol))
            .map_err(|e| invalid_market(symbol, &e))
    }
}
