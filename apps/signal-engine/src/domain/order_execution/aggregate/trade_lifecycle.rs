//! TradeLifecycle aggregate root.
//!
//! Owns one intent, its entry order and its bracket orders, and decides
//! each step of the OTO sequence. It performs no I/O: the sequencer executes
//! the returned [`EntryDecision`]s against the exchange.
//!
//! Rules enforced here:
//! - bracket orders never exist before the entry has filled at least one lot
//! - fill evidence wins over timeout and operator cancel
//! - an identical status observation is a no-op
//! - take-profit legs sum to the filled quantity; the stop covers all of it
//! - every order price sits on the market's tick grid

use serde::{Deserialize, Serialize};

use super::order_record::{NewOrderRecord, OrderRecord};
use crate::domain::order_execution::errors::StateError;
use crate::domain::order_execution::events::{
    BracketLegResolved, EntryCancelRequested, EntryFillObserved, EntrySubmitted, LifecycleEvent,
    LifecycleFinished,
};
use crate::domain::order_execution::services::LifecycleStateMachine;
use crate::domain::order_execution::value_objects::{
    CancelCause, EntryDecision, EntryEvent, LifecycleState, OrderRole, OrderSide, OrderStatus,
    OrderStatusReport, OrderType, TimeInForce,
};
use crate::domain::shared::{
    ClientOrderId, ExchangeOrderId, LifecycleId, Price, Quantity, Timestamp,
};
use crate::domain::signal_intake::{EntryType, TAKE_PROFIT_LEGS, TradeIntent};
use crate::domain::sizing::{
    BracketQuantities, BracketSizer, LotSize, MarketRules, SizingError, TakeProfitWeights,
};

/// Archived snapshot of a lifecycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LifecycleReport {
    /// Lifecycle ID.
    pub lifecycle_id: LifecycleId,
    /// The intent being executed.
    pub intent: TradeIntent,
    /// Current or terminal state.
    pub state: LifecycleState,
    /// Entry order, once created.
    pub entry: Option<OrderRecord>,
    /// Bracket orders, once created.
    pub brackets: Vec<OrderRecord>,
    /// Triggering error for failed or abandoned lifecycles.
    pub error: Option<String>,
    /// Every order id that reached the exchange.
    pub placed_order_ids: Vec<ExchangeOrderId>,
    /// When the lifecycle started.
    pub started_at: Timestamp,
    /// When it reached a terminal state.
    pub finished_at: Option<Timestamp>,
}

/// Tick-aligned prices for every order of the lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct PricePlan {
    entry: Option<Price>,
    entry_tif: Option<TimeInForce>,
    stop: Price,
    take_profits: [Price; TAKE_PROFIT_LEGS],
}

/// One signal's trade, from entry submission to terminal resolution.
#[derive(Debug, Clone)]
pub struct TradeLifecycle {
    id: LifecycleId,
    intent: TradeIntent,
    state: LifecycleState,
    rules: Option<MarketRules>,
    prices: Option<PricePlan>,
    entry: Option<OrderRecord>,
    brackets: Vec<OrderRecord>,
    cancel_cause: Option<CancelCause>,
    cancel_confirmed: bool,
    awaiting_requery: bool,
    bracket_fill: Option<Quantity>,
    error: Option<String>,
    started_at: Timestamp,
    finished_at: Option<Timestamp>,
    events: Vec<LifecycleEvent>,
}

impl TradeLifecycle {
    /// Start a lifecycle in `Idle`.
    #[must_use]
    pub fn new(id: LifecycleId, intent: TradeIntent) -> Self {
        Self {
            id,
            intent,
            state: LifecycleState::Idle,
            rules: None,
            prices: None,
            entry: None,
            brackets: Vec::new(),
            cancel_cause: None,
            cancel_confirmed: false,
            awaiting_requery: false,
            bracket_fill: None,
            error: None,
            started_at: Timestamp::now(),
            finished_at: None,
            events: Vec::new(),
        }
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// Lifecycle ID.
    #[must_use]
    pub const fn id(&self) -> &LifecycleId {
        &self.id
    }

    /// The intent being executed.
    #[must_use]
    pub const fn intent(&self) -> &TradeIntent {
        &self.intent
    }

    /// Current state.
    #[must_use]
    pub const fn state(&self) -> LifecycleState {
        self.state
    }

    /// Entry order record.
    #[must_use]
    pub const fn entry(&self) -> Option<&OrderRecord> {
        self.entry.as_ref()
    }

    /// Bracket order records (empty until the bracket phase).
    #[must_use]
    pub fn brackets(&self) -> &[OrderRecord] {
        &self.brackets
    }

    /// Why the entry cancel was requested, if it was.
    #[must_use]
    pub const fn cancel_cause(&self) -> Option<CancelCause> {
        self.cancel_cause
    }

    /// Triggering error.
    #[must_use]
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Every order id that reached the exchange, entry first.
    #[must_use]
    pub fn placed_order_ids(&self) -> Vec<ExchangeOrderId> {
        self.entry
            .iter()
            .chain(self.brackets.iter())
            .filter_map(|r| r.exchange_order_id().cloned())
            .collect()
    }

    /// Snapshot for archiving and display.
    #[must_use]
    pub fn report(&self) -> LifecycleReport {
        LifecycleReport {
            lifecycle_id: self.id.clone(),
            intent: self.intent.clone(),
            state: self.state,
            entry: self.entry.clone(),
            brackets: self.brackets.clone(),
            error: self.error.clone(),
            placed_order_ids: self.placed_order_ids(),
            started_at: self.started_at,
            finished_at: self.finished_at,
        }
    }

    /// Take the events raised since the last drain.
    pub fn drain_events(&mut self) -> Vec<LifecycleEvent> {
        std::mem::take(&mut self.events)
    }

    // =========================================================================
    // Entry phase
    // =========================================================================

    /// Quantize every order price to the market tick before anything is sent.
    ///
    /// Limit entries are floored to the tick; a post-only entry is then moved
    /// one tick away from the book. Targets and stop are floored. Any price
    /// under one tick fails the whole lifecycle up front.
    pub fn prepare(
        &mut self,
        rules: MarketRules,
        time_in_force: TimeInForce,
    ) -> Result<(), SizingError> {
        let tick = rules.price_tick();
        let entry = self.intent.entry();
        let (entry_price, entry_tif) = match entry.order_type() {
            EntryType::Limit => {
                let floored = tick.floor(entry.price())?;
                let side = OrderSide::opening(self.intent.side());
                let price = match (time_in_force.is_post_only(), side) {
                    (false, _) => floored,
                    (true, OrderSide::Buy) => tick.step_down(floored)?,
                    (true, OrderSide::Sell) => tick.step_up(floored)?,
                };
                (Some(price), Some(time_in_force))
            }
            EntryType::Market => (None, None),
        };

        let stop = tick.floor(self.intent.stop())?;
        let mut take_profits = [stop; TAKE_PROFIT_LEGS];
        for (slot, target) in take_profits.iter_mut().zip(self.intent.take_profits()) {
            *slot = tick.floor(*target)?;
        }

        self.rules = Some(rules);
        self.prices = Some(PricePlan {
            entry: entry_price,
            entry_tif,
            stop,
            take_profits,
        });
        Ok(())
    }

    /// Market rules in effect, once prepared.
    #[must_use]
    pub const fn market_rules(&self) -> Option<&MarketRules> {
        self.rules.as_ref()
    }

    /// Parameters of the entry order for `quantity`.
    pub fn entry_order(&self, quantity: Quantity) -> Result<NewOrderRecord, StateError> {
        let prices = self.prices.ok_or(StateError::NoMarketRules)?;
        Ok(NewOrderRecord {
            role: OrderRole::Entry,
            side: OrderSide::opening(self.intent.side()),
            order_type: self.intent.entry().order_type().into(),
            price: prices.entry,
            time_in_force: prices.entry_tif,
            quantity,
            client_order_id: ClientOrderId::for_leg(&self.id, &OrderRole::Entry.label()),
            reduce_only: false,
        })
    }

    /// `Idle -> EntrySubmitted`: the entry was accepted by the exchange.
    pub fn submit_entry(&mut self, record: OrderRecord) -> Result<(), StateError> {
        if self.rules.is_none() {
            return Err(StateError::NoMarketRules);
        }
        let Some(order_id) = record.exchange_order_id().cloned() else {
            return Err(StateError::NoEntry);
        };
        self.transition(LifecycleState::EntrySubmitted)?;
        self.events.push(LifecycleEvent::EntrySubmitted(EntrySubmitted {
            lifecycle_id: self.id.clone(),
            symbol: self.intent.symbol().clone(),
            quantity: record.requested_qty(),
            order_id,
            occurred_at: Timestamp::now(),
        }));
        self.entry = Some(record);
        Ok(())
    }

    /// End the lifecycle in `Rejected`.
    pub fn reject(&mut self, reason: impl Into<String>) -> Result<(), StateError> {
        self.error = Some(reason.into());
        self.transition(LifecycleState::Rejected)
    }

    /// The transition function for everything observed while the entry works.
    ///
    /// Once a fill of at least one lot has been seen, every later event is
    /// ignored: the bracket is placed regardless of timeouts or cancels.
    pub fn apply(&mut self, event: EntryEvent) -> Result<EntryDecision, StateError> {
        if self.state == LifecycleState::Idle {
            return Err(StateError::NoEntry);
        }
        if !self.state.is_entry_phase() || self.bracket_fill.is_some() {
            return Ok(EntryDecision::Ignore);
        }

        match event {
            EntryEvent::StatusObserved(report) => self.observe_entry(report),
            EntryEvent::TimeoutElapsed => Ok(self.request_cancel(CancelCause::Timeout)),
            EntryEvent::OperatorCancel => Ok(self.request_cancel(CancelCause::Operator)),
            EntryEvent::CancelConfirmed | EntryEvent::CancelRefused => {
                if self.cancel_cause.is_none() {
                    return Ok(EntryDecision::Ignore);
                }
                if event == EntryEvent::CancelConfirmed {
                    self.cancel_confirmed = true;
                }
                self.awaiting_requery = true;
                Ok(EntryDecision::Requery)
            }
            EntryEvent::CancelUnresolved => {
                if self.cancel_cause.is_none() {
                    return Ok(EntryDecision::Ignore);
                }
                self.settle_unresolved()
            }
        }
    }

    /// The cancel never resolved. A lot already filled is still bracketed;
    /// anything less rejects.
    fn settle_unresolved(&mut self) -> Result<EntryDecision, StateError> {
        let (Some(rules), Some(entry)) = (self.rules, self.entry.as_ref()) else {
            return Err(StateError::NoEntry);
        };
        let filled = entry.filled_qty();
        let order_id = entry
            .exchange_order_id()
            .map_or_else(String::new, ToString::to_string);
        if rules.lot_size().covers(filled) {
            return self.ready_for_brackets(LifecycleState::PartiallyFilled, filled);
        }
        self.fail(format!("entry {order_id} still unresolved after cancel"))
    }

    fn request_cancel(&mut self, cause: CancelCause) -> EntryDecision {
        if self.cancel_cause.is_some() {
            return EntryDecision::Ignore;
        }
        self.cancel_cause = Some(cause);
        self.events
            .push(LifecycleEvent::EntryCancelRequested(EntryCancelRequested {
                lifecycle_id: self.id.clone(),
                cause,
                occurred_at: Timestamp::now(),
            }));
        EntryDecision::CancelEntry
    }

    fn observe_entry(&mut self, report: OrderStatusReport) -> Result<EntryDecision, StateError> {
        let (Some(rules), Some(entry)) = (self.rules, self.entry.as_mut()) else {
            return Err(StateError::NoEntry);
        };
        let lot = rules.lot_size();
        let changed = entry.observe(report);
        let answers_requery = std::mem::take(&mut self.awaiting_requery);
        if !changed && !answers_requery {
            return Ok(EntryDecision::Ignore);
        }

        let filled = entry.filled_qty();
        let status = entry.status();
        if changed {
            self.events
                .push(LifecycleEvent::EntryFillObserved(EntryFillObserved {
                    lifecycle_id: self.id.clone(),
                    status,
                    filled_qty: filled,
                    occurred_at: Timestamp::now(),
                }));
        }
        let has_lot = lot.covers(filled);

        match status {
            OrderStatus::Filled if has_lot => self.ready_for_brackets(LifecycleState::Filled, filled),
            // A fill under one lot cannot carry a bracket.
            OrderStatus::Filled => self.finish_unfilled(status),
            OrderStatus::Pending | OrderStatus::PartiallyFilled if has_lot => {
                // No further fills can arrive once a cancel is confirmed.
                if self.cancel_confirmed {
                    return self.ready_for_brackets(LifecycleState::PartiallyFilled, filled);
                }
                if self.state == LifecycleState::EntrySubmitted {
                    self.transition(LifecycleState::PartiallyFilled)?;
                }
                match self.request_cancel(CancelCause::PartialFill) {
                    EntryDecision::CancelEntry => Ok(EntryDecision::CancelEntry),
                    _ => Ok(EntryDecision::KeepWaiting),
                }
            }
            OrderStatus::Pending | OrderStatus::PartiallyFilled => {
                if self.cancel_confirmed {
                    self.finish_unfilled(status)
                } else {
                    Ok(EntryDecision::KeepWaiting)
                }
            }
            OrderStatus::Cancelled | OrderStatus::Expired | OrderStatus::Rejected if has_lot => {
                self.ready_for_brackets(LifecycleState::PartiallyFilled, filled)
            }
            OrderStatus::Cancelled | OrderStatus::Expired => self.finish_unfilled(status),
            OrderStatus::Rejected => self.fail("entry rejected by exchange"),
        }
    }

    fn ready_for_brackets(
        &mut self,
        target: LifecycleState,
        filled: Quantity,
    ) -> Result<EntryDecision, StateError> {
        if self.state != target {
            self.transition(target)?;
        }
        self.bracket_fill = Some(filled);
        Ok(EntryDecision::PlaceBrackets(filled))
    }

    fn finish_unfilled(&mut self, status: OrderStatus) -> Result<EntryDecision, StateError> {
        let (target, reason) = match self.cancel_cause {
            Some(CancelCause::Timeout) => (
                LifecycleState::Expired,
                "entry not filled before timeout".to_string(),
            ),
            Some(CancelCause::Operator) => (
                LifecycleState::Cancelled,
                "entry cancelled by operator".to_string(),
            ),
            _ if status == OrderStatus::Expired => (
                LifecycleState::Expired,
                "entry expired on exchange".to_string(),
            ),
            _ if status == OrderStatus::Filled => (
                LifecycleState::Cancelled,
                "entry closed by exchange".to_string(),
            ),
            _ => (
                LifecycleState::Cancelled,
                "entry cancelled on exchange".to_string(),
            ),
        };
        let filled = self.entry.as_ref().map_or(Quantity::ZERO, OrderRecord::filled_qty);
        self.error = Some(if filled.is_positive() {
            format!("{reason}; {filled} filled is below one lot, left unbracketed")
        } else {
            reason
        });
        self.transition(target)?;
        Ok(EntryDecision::Finish(target))
    }

    fn fail(&mut self, reason: impl Into<String>) -> Result<EntryDecision, StateError> {
        self.reject(reason)?;
        Ok(EntryDecision::Finish(LifecycleState::Rejected))
    }

    // =========================================================================
    // Bracket phase
    // =========================================================================

    /// `PartiallyFilled/Filled -> BracketsSubmitted`: size the bracket from the
    /// filled quantity and create one record per non-empty leg.
    pub fn begin_brackets(
        &mut self,
        weights: &TakeProfitWeights,
    ) -> Result<BracketQuantities, StateError> {
        let Some(filled) = self.bracket_fill else {
            return Err(StateError::NoFill { state: self.state });
        };
        let (Some(rules), Some(prices)) = (self.rules, self.prices) else {
            return Err(StateError::NoMarketRules);
        };
        let lot = rules.lot_size();
        let quantities = BracketSizer::compute_bracket_qtys(filled, weights, lot).map_err(|e| {
            StateError::InvariantViolation {
                reason: e.to_string(),
            }
        })?;
        check_bracket_invariant(&quantities, filled, lot)?;
        self.transition(LifecycleState::BracketsSubmitted)?;

        let side = OrderSide::closing(self.intent.side());
        for role in OrderRole::bracket_roles() {
            let (quantity, price, order_type, time_in_force) = match role {
                OrderRole::TakeProfit(i) => (
                    quantities.take_profits[usize::from(i)],
                    prices.take_profits[usize::from(i)],
                    OrderType::Limit,
                    Some(TimeInForce::Gtc),
                ),
                _ => (quantities.stop, prices.stop, OrderType::StopMarket, None),
            };
            // Legs that round to zero are never sent.
            if quantity.is_zero() {
                continue;
            }
            self.brackets.push(OrderRecord::new(NewOrderRecord {
                role,
                side,
                order_type,
                price: Some(price),
                time_in_force,
                quantity,
                client_order_id: ClientOrderId::for_leg(&self.id, &role.label()),
                reduce_only: true,
            }));
        }
        Ok(quantities)
    }

    /// Record that a bracket leg was accepted by the exchange.
    pub fn record_bracket_placed(
        &mut self,
        role: OrderRole,
        order_id: ExchangeOrderId,
    ) -> Result<(), StateError> {
        let record = self.bracket_mut(role)?;
        record.mark_placed(order_id.clone());
        let quantity = record.requested_qty();
        self.push_leg_event(role, quantity, Some(order_id), None);
        Ok(())
    }

    /// Record that a bracket leg could not be placed.
    pub fn record_bracket_failed(
        &mut self,
        role: OrderRole,
        reason: impl Into<String>,
    ) -> Result<(), StateError> {
        let reason = reason.into();
        let record = self.bracket_mut(role)?;
        record.mark_rejected(reason.clone());
        let quantity = record.requested_qty();
        self.push_leg_event(role, quantity, None, Some(reason));
        Ok(())
    }

    /// `BracketsSubmitted -> Complete | Rejected`.
    ///
    /// Any leg without an exchange id rejects the lifecycle. Legs that were
    /// placed stay working; nothing is cancelled.
    pub fn finish_brackets(&mut self) -> Result<LifecycleState, StateError> {
        if self.state != LifecycleState::BracketsSubmitted {
            return Err(StateError::InvalidTransition {
                from: self.state,
                to: LifecycleState::Complete,
            });
        }
        let failed: Vec<String> = self
            .brackets
            .iter()
            .filter(|r| !r.is_placed())
            .map(|r| r.role().label())
            .collect();

        if failed.is_empty() {
            self.transition(LifecycleState::Complete)?;
        } else {
            let placed = self.brackets.len() - failed.len();
            self.reject(format!(
                "{} of {} bracket orders failed ({}); {placed} placed orders left working",
                failed.len(),
                self.brackets.len(),
                failed.join(", ")
            ))?;
        }
        Ok(self.state)
    }

    // =========================================================================
    // Internals
    // =========================================================================

    fn bracket_mut(&mut self, role: OrderRole) -> Result<&mut OrderRecord, StateError> {
        self.brackets
            .iter_mut()
            .find(|r| r.role() == role)
            .ok_or(StateError::UnknownLeg { role })
    }

    fn push_leg_event(
        &mut self,
        role: OrderRole,
        quantity: Quantity,
        order_id: Option<ExchangeOrderId>,
        error: Option<String>,
    ) {
        self.events
            .push(LifecycleEvent::BracketLegResolved(BracketLegResolved {
                lifecycle_id: self.id.clone(),
                role,
                quantity,
                order_id,
                error,
                occurred_at: Timestamp::now(),
            }));
    }

    fn transition(&mut self, to: LifecycleState) -> Result<(), StateError> {
        LifecycleStateMachine::validate_transition(self.state, to)?;
        self.state = to;
        if to.is_terminal() {
            let now = Timestamp::now();
            self.finished_at = Some(now);
            self.events.push(LifecycleEvent::Finished(LifecycleFinished {
                lifecycle_id: self.id.clone(),
                symbol: self.intent.symbol().clone(),
                state: to,
                error: self.error.clone(),
                placed_order_ids: self.placed_order_ids(),
                occurred_at: now,
            }));
        }
        Ok(())
    }
}

/// Take-profit legs must track the fill within one lot; the stop must equal it.
fn check_bracket_invariant(
    quantities: &BracketQuantities,
    filled: Quantity,
    lot: LotSize,
) -> Result<(), StateError> {
    let total = quantities.take_profit_total();
    let drift = (total.amount() - filled.amount()).abs();
    if drift > lot.step() || quantities.stop != filled {
        return Err(StateError::InvariantViolation {
            reason: format!(
                "take-profit total {total}, stop {} for filled {filled}",
                quantities.stop
            ),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::shared::Symbol;
    use crate::domain::signal_intake::{Entry, TradeSide};
    use crate::domain::sizing::PriceTick;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    fn p(v: i64) -> Price {
        Price::new(Decimal::from(v))
    }

    fn q(v: Decimal) -> Quantity {
        Quantity::new(v)
    }

    fn intent() -> TradeIntent {
        TradeIntent::new(
            Symbol::new("BTC"),
            TradeSide::Long,
            Entry::limit(p(100)),
            p(95),
            [p(101), p(102), p(103), p(104), p(105), p(106)],
        )
        .unwrap()
    }

    fn weights() -> TakeProfitWeights {
        TakeProfitWeights::new([dec!(0.1), dec!(0.15), dec!(0.15), dec!(0.2), dec!(0.2), dec!(0.2)])
            .unwrap()
    }

    fn rules(lot: Decimal, tick: Decimal) -> MarketRules {
        MarketRules::new(LotSize::new(lot).unwrap(), PriceTick::new(tick).unwrap())
    }

    fn prepared(intent: TradeIntent, lot: Decimal, tif: TimeInForce) -> TradeLifecycle {
        let mut lc = TradeLifecycle::new(LifecycleId::new("lc-1"), intent);
        lc.prepare(rules(lot, dec!(0.01)), tif).unwrap();
        lc
    }

    fn place_entry(mut lc: TradeLifecycle, quantity: Decimal) -> TradeLifecycle {
        let mut record = OrderRecord::new(lc.entry_order(q(quantity)).unwrap());
        record.mark_placed(ExchangeOrderId::new("x-entry"));
        lc.submit_entry(record).unwrap();
        lc
    }

    fn submitted() -> TradeLifecycle {
        place_entry(prepared(intent(), dec!(0.001), TimeInForce::Gtc), dec!(10))
    }

    fn status(status: OrderStatus, filled: Decimal) -> EntryEvent {
        EntryEvent::StatusObserved(OrderStatusReport::new(status, q(filled)))
    }

    #[test]
    fn entry_order_is_opening_limit() {
        let lc = prepared(intent(), dec!(0.001), TimeInForce::Gtc);
        let order = lc.entry_order(q(dec!(10))).unwrap();
        assert_eq!(order.side, OrderSide::Buy);
        assert_eq!(order.order_type, OrderType::Limit);
        assert_eq!(order.price, Some(p(100)));
        assert_eq!(order.time_in_force, Some(TimeInForce::Gtc));
        assert!(!order.reduce_only);
        assert_eq!(order.client_order_id.as_str(), "lc-1-entry");
    }

    #[test]
    fn entry_order_needs_market_rules() {
        let lc = TradeLifecycle::new(LifecycleId::new("lc-1"), intent());
        assert_eq!(lc.entry_order(q(dec!(10))), Err(StateError::NoMarketRules));
    }

    fn band_short() -> TradeIntent {
        TradeIntent::new(
            Symbol::new("ETH"),
            TradeSide::Short,
            Entry::band(Price::new(dec!(3875.33)), Price::new(dec!(3877.16))),
            Price::new(dec!(3950.019)),
            [dec!(3850.555), dec!(3800), dec!(3750), dec!(3700), dec!(3650), dec!(3600.009)]
                .map(Price::new),
        )
        .unwrap()
    }

    #[test]
    fn prices_are_floored_to_the_tick() {
        let lc = prepared(band_short(), dec!(0.001), TimeInForce::Gtc);
        let order = lc.entry_order(q(dec!(1))).unwrap();
        // Band midpoint 3876.245
        assert_eq!(order.price, Some(Price::new(dec!(3876.24))));

        let mut lc = place_entry(lc, dec!(1));
        lc.apply(status(OrderStatus::Filled, dec!(1))).unwrap();
        lc.begin_brackets(&weights()).unwrap();
        let tp1 = &lc.brackets()[0];
        assert_eq!(tp1.price(), Some(Price::new(dec!(3850.55))));
        assert_eq!(tp1.time_in_force(), Some(TimeInForce::Gtc));
        let stop = lc.brackets().last().unwrap();
        assert_eq!(stop.role(), OrderRole::Stop);
        assert_eq!(stop.price(), Some(Price::new(dec!(3950.01))));
        assert_eq!(stop.time_in_force(), None);
    }

    #[test]
    fn post_only_entry_steps_one_tick_off_the_book() {
        let long = prepared(intent(), dec!(0.001), TimeInForce::PostOnly);
        let order = long.entry_order(q(dec!(1))).unwrap();
        assert_eq!(order.price, Some(Price::new(dec!(99.99))));
        assert_eq!(order.time_in_force, Some(TimeInForce::PostOnly));

        let short = prepared(band_short(), dec!(0.001), TimeInForce::PostOnly);
        let order = short.entry_order(q(dec!(1))).unwrap();
        assert_eq!(order.price, Some(Price::new(dec!(3876.25))));
    }

    #[test]
    fn market_entry_carries_no_price_or_tif() {
        let intent = TradeIntent::new(
            Symbol::new("BTC"),
            TradeSide::Long,
            Entry::market(p(100)),
            p(95),
            [p(101), p(102), p(103), p(104), p(105), p(106)],
        )
        .unwrap();
        let lc = prepared(intent, dec!(0.001), TimeInForce::PostOnly);
        let order = lc.entry_order(q(dec!(1))).unwrap();
        assert_eq!(order.order_type, OrderType::Market);
        assert_eq!(order.price, None);
        assert_eq!(order.time_in_force, None);
    }

    #[test]
    fn price_below_one_tick_fails_preparation() {
        let intent = TradeIntent::new(
            Symbol::new("PEPE"),
            TradeSide::Long,
            Entry::limit(Price::new(dec!(0.00002))),
            Price::new(dec!(0.00001)),
            [dec!(0.00003), dec!(0.00004), dec!(0.00005), dec!(0.00006), dec!(0.00007), dec!(0.00008)]
                .map(Price::new),
        )
        .unwrap();
        let mut lc = TradeLifecycle::new(LifecycleId::new("lc-1"), intent);
        let err = lc.prepare(rules(dec!(1), dec!(0.0001)), TimeInForce::Gtc).unwrap_err();
        assert!(matches!(err, SizingError::PriceBelowTick { .. }));
        assert!(lc.market_rules().is_none());
    }

    #[test]
    fn event_before_entry_is_a_state_error() {
        let mut lc = TradeLifecycle::new(LifecycleId::new("lc-1"), intent());
        assert_eq!(lc.apply(EntryEvent::TimeoutElapsed), Err(StateError::NoEntry));
    }

    #[test]
    fn full_fill_goes_straight_to_brackets() {
        let mut lc = submitted();
        let decision = lc.apply(status(OrderStatus::Filled, dec!(10))).unwrap();
        assert_eq!(decision, EntryDecision::PlaceBrackets(q(dec!(10))));
        assert_eq!(lc.state(), LifecycleState::Filled);

        let quantities = lc.begin_brackets(&weights()).unwrap();
        assert_eq!(lc.state(), LifecycleState::BracketsSubmitted);
        assert_eq!(quantities.stop, q(dec!(10)));
        assert_eq!(lc.brackets().len(), 7);
        assert!(lc.brackets().iter().all(OrderRecord::reduce_only));
        assert!(lc.brackets().iter().all(|r| r.side() == OrderSide::Sell));
        assert_eq!(lc.brackets()[6].order_type(), OrderType::StopMarket);
        assert_eq!(lc.brackets()[6].price(), Some(p(95)));
        assert_eq!(lc.brackets()[0].price(), Some(p(101)));
    }

    #[test]
    fn repeated_identical_observation_is_ignored() {
        let mut lc = submitted();
        assert_eq!(
            lc.apply(status(OrderStatus::Pending, dec!(0))).unwrap(),
            EntryDecision::Ignore
        );
        let partial = status(OrderStatus::PartiallyFilled, dec!(0.0005));
        assert_eq!(lc.apply(partial).unwrap(), EntryDecision::KeepWaiting);
        assert_eq!(lc.apply(partial).unwrap(), EntryDecision::Ignore);
    }

    #[test]
    fn timeout_requests_exactly_one_cancel() {
        let mut lc = submitted();
        assert_eq!(lc.apply(EntryEvent::TimeoutElapsed).unwrap(), EntryDecision::CancelEntry);
        assert_eq!(lc.apply(EntryEvent::TimeoutElapsed).unwrap(), EntryDecision::Ignore);
        assert_eq!(lc.apply(EntryEvent::CancelConfirmed).unwrap(), EntryDecision::Requery);
        let decision = lc.apply(status(OrderStatus::Cancelled, dec!(0))).unwrap();
        assert_eq!(decision, EntryDecision::Finish(LifecycleState::Expired));
        assert_eq!(lc.cancel_cause(), Some(CancelCause::Timeout));
        assert!(lc.error().is_some());
        assert_eq!(lc.placed_order_ids(), vec![ExchangeOrderId::new("x-entry")]);
    }

    #[test]
    fn confirmed_cancel_with_stale_open_status_expires() {
        let mut lc = submitted();
        lc.apply(EntryEvent::TimeoutElapsed).unwrap();
        lc.apply(EntryEvent::CancelConfirmed).unwrap();
        let decision = lc.apply(status(OrderStatus::Pending, dec!(0))).unwrap();
        assert_eq!(decision, EntryDecision::Finish(LifecycleState::Expired));
    }

    #[test]
    fn refused_cancel_then_fill_takes_fill_path() {
        let mut lc = submitted();
        lc.apply(EntryEvent::TimeoutElapsed).unwrap();
        assert_eq!(lc.apply(EntryEvent::CancelRefused).unwrap(), EntryDecision::Requery);
        let decision = lc.apply(status(OrderStatus::Filled, dec!(10))).unwrap();
        assert_eq!(decision, EntryDecision::PlaceBrackets(q(dec!(10))));
        assert_eq!(lc.state(), LifecycleState::Filled);
    }

    #[test]
    fn fill_and_timeout_resolve_identically_in_either_order() {
        let fill = status(OrderStatus::Filled, dec!(10));

        let mut fill_first = submitted();
        fill_first.apply(fill).unwrap();
        assert_eq!(
            fill_first.apply(EntryEvent::TimeoutElapsed).unwrap(),
            EntryDecision::Ignore
        );

        let mut timeout_first = submitted();
        timeout_first.apply(EntryEvent::TimeoutElapsed).unwrap();
        timeout_first.apply(fill).unwrap();
        assert_eq!(
            timeout_first.apply(EntryEvent::CancelRefused).unwrap(),
            EntryDecision::Ignore
        );

        assert_eq!(fill_first.state(), timeout_first.state());
        assert_eq!(fill_first.state(), LifecycleState::Filled);
        assert_eq!(
            fill_first.begin_brackets(&weights()).unwrap(),
            timeout_first.begin_brackets(&weights()).unwrap()
        );
    }

    #[test]
    fn partial_fill_cancels_remainder_then_brackets_filled_amount() {
        let mut lc = submitted();
        let decision = lc.apply(status(OrderStatus::PartiallyFilled, dec!(4))).unwrap();
        assert_eq!(decision, EntryDecision::CancelEntry);
        assert_eq!(lc.state(), LifecycleState::PartiallyFilled);
        assert_eq!(lc.cancel_cause(), Some(CancelCause::PartialFill));

        // Timeout after a lot has filled does nothing.
        assert_eq!(lc.apply(EntryEvent::TimeoutElapsed).unwrap(), EntryDecision::Ignore);

        assert_eq!(lc.apply(EntryEvent::CancelConfirmed).unwrap(), EntryDecision::Requery);
        let decision = lc.apply(status(OrderStatus::Cancelled, dec!(4.5))).unwrap();
        assert_eq!(decision, EntryDecision::PlaceBrackets(q(dec!(4.5))));

        let quantities = lc.begin_brackets(&weights()).unwrap();
        assert_eq!(quantities.stop, q(dec!(4.5)));
        assert_eq!(quantities.take_profit_total(), q(dec!(4.5)));
    }

    #[test]
    fn unresolved_cancel_after_partial_lot_still_brackets() {
        let mut lc = submitted();
        let partial = status(OrderStatus::PartiallyFilled, dec!(4));
        assert_eq!(lc.apply(partial).unwrap(), EntryDecision::CancelEntry);
        assert_eq!(lc.apply(EntryEvent::CancelRefused).unwrap(), EntryDecision::Requery);
        assert_eq!(lc.apply(partial).unwrap(), EntryDecision::KeepWaiting);
        assert_eq!(lc.apply(partial).unwrap(), EntryDecision::Ignore);

        let decision = lc.apply(EntryEvent::CancelUnresolved).unwrap();
        assert_eq!(decision, EntryDecision::PlaceBrackets(q(dec!(4))));
        assert_eq!(lc.state(), LifecycleState::PartiallyFilled);
        assert_eq!(lc.begin_brackets(&weights()).unwrap().stop, q(dec!(4)));
    }

    #[test]
    fn unresolved_cancel_without_a_lot_rejects() {
        let mut lc = submitted();
        lc.apply(EntryEvent::TimeoutElapsed).unwrap();
        lc.apply(EntryEvent::CancelRefused).unwrap();
        lc.apply(status(OrderStatus::Pending, dec!(0))).unwrap();

        let decision = lc.apply(EntryEvent::CancelUnresolved).unwrap();
        assert_eq!(decision, EntryDecision::Finish(LifecycleState::Rejected));
        assert_eq!(lc.error(), Some("entry x-entry still unresolved after cancel"));
    }

    #[test]
    fn unresolved_without_cancel_is_ignored() {
        let mut lc = submitted();
        assert_eq!(lc.apply(EntryEvent::CancelUnresolved).unwrap(), EntryDecision::Ignore);
        assert_eq!(lc.state(), LifecycleState::EntrySubmitted);
    }

    #[test]
    fn dust_reported_filled_ends_cancelled() {
        let mut lc = submitted();
        let decision = lc.apply(status(OrderStatus::Filled, dec!(0.0004))).unwrap();
        assert_eq!(decision, EntryDecision::Finish(LifecycleState::Cancelled));
        let error = lc.error().unwrap();
        assert!(error.starts_with("entry closed by exchange"), "unexpected error: {error}");
        assert!(error.contains("below one lot"));
    }

    #[test]
    fn dust_fill_is_treated_as_unfilled() {
        let mut lc = submitted();
        lc.apply(EntryEvent::TimeoutElapsed).unwrap();
        lc.apply(EntryEvent::CancelConfirmed).unwrap();
        let decision = lc.apply(status(OrderStatus::Cancelled, dec!(0.0004))).unwrap();
        assert_eq!(decision, EntryDecision::Finish(LifecycleState::Expired));
        assert!(lc.error().unwrap().contains("below one lot"));
    }

    #[test]
    fn operator_cancel_before_fill_cancels() {
        let mut lc = submitted();
        assert_eq!(lc.apply(EntryEvent::OperatorCancel).unwrap(), EntryDecision::CancelEntry);
        lc.apply(EntryEvent::CancelConfirmed).unwrap();
        let decision = lc.apply(status(OrderStatus::Cancelled, dec!(0))).unwrap();
        assert_eq!(decision, EntryDecision::Finish(LifecycleState::Cancelled));
    }

    #[test]
    fn exchange_rejection_rejects_lifecycle() {
        let mut lc = submitted();
        let decision = lc.apply(status(OrderStatus::Rejected, dec!(0))).unwrap();
        assert_eq!(decision, EntryDecision::Finish(LifecycleState::Rejected));
        assert_eq!(lc.error(), Some("entry rejected by exchange"));
    }

    #[test]
    fn brackets_before_fill_are_a_state_error() {
        let mut lc = submitted();
        assert_eq!(
            lc.begin_brackets(&weights()),
            Err(StateError::NoFill {
                state: LifecycleState::EntrySubmitted
            })
        );
    }

    #[test]
    fn all_legs_placed_completes() {
        let mut lc = submitted();
        lc.apply(status(OrderStatus::Filled, dec!(10))).unwrap();
        lc.begin_brackets(&weights()).unwrap();
        for (i, role) in OrderRole::bracket_roles().into_iter().enumerate() {
            lc.record_bracket_placed(role, ExchangeOrderId::new(format!("x-{i}")))
                .unwrap();
        }
        assert_eq!(lc.finish_brackets().unwrap(), LifecycleState::Complete);
        assert_eq!(lc.placed_order_ids().len(), 8);
        assert!(lc.report().finished_at.is_some());
    }

    #[test]
    fn failed_leg_rejects_without_touching_siblings() {
        let mut lc = submitted();
        lc.apply(status(OrderStatus::Filled, dec!(10))).unwrap();
        lc.begin_brackets(&weights()).unwrap();
        for role in OrderRole::bracket_roles() {
            if role == OrderRole::TakeProfit(2) {
                lc.record_bracket_failed(role, "rejected: price band").unwrap();
            } else {
                lc.record_bracket_placed(role, ExchangeOrderId::new(role.label()))
                    .unwrap();
            }
        }
        assert_eq!(lc.finish_brackets().unwrap(), LifecycleState::Rejected);
        assert!(lc.error().unwrap().contains("tp3"));
        // entry + 6 placed legs
        assert_eq!(lc.placed_order_ids().len(), 7);
    }

    #[test]
    fn zero_quantity_legs_are_skipped() {
        let mut lc = place_entry(prepared(intent(), dec!(1), TimeInForce::Gtc), dec!(3));
        lc.apply(status(OrderStatus::Filled, dec!(3))).unwrap();

        let quantities = lc.begin_brackets(&weights()).unwrap();
        // floor(0.3), floor(0.45), ... are all zero; the last leg takes 3.
        assert_eq!(quantities.take_profits[5], q(dec!(3)));
        assert_eq!(lc.brackets().len(), 2);
        assert_eq!(lc.brackets()[0].role(), OrderRole::TakeProfit(5));
        assert_eq!(lc.brackets()[1].role(), OrderRole::Stop);
    }

    #[test]
    fn drained_events_end_with_finished() {
        let mut lc = submitted();
        lc.apply(EntryEvent::TimeoutElapsed).unwrap();
        lc.apply(EntryEvent::CancelConfirmed).unwrap();
        lc.apply(status(OrderStatus::Cancelled, dec!(0))).unwrap();
        let events = lc.drain_events();
        assert_eq!(events.first().map(LifecycleEvent::event_type), Some("ENTRY_SUBMITTED"));
        assert_eq!(events.last().map(LifecycleEvent::event_type), Some("LIFECYCLE_FINISHED"));
        assert!(lc.drain_events().is_empty());
    }
}
