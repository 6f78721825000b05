//! Order Sequencer
//!
//! Drives one [`TradeLifecycle`] against an [`ExchangeGateway`]: sizes and
//! submits the entry, watches it until it fills, expires or is cancelled,
//! then places the bracket. Every decision is taken by the aggregate; this
//! service only performs the gateway calls it asks for and feeds the results
//! back in.
//!
//! Each lifecycle runs as its own task. The only state shared between
//! lifecycles is the read-only [`TradeConfig`].

use std::sync::Arc;
use std::time::Duration;

use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use super::retry::{retry_gateway_call, RetryPolicy};
use crate::application::ports::{
    EventPublisherPort, ExchangeGateway, GatewayError, LifecycleRepository, PlaceOrderRequest,
};
use crate::domain::order_execution::aggregate::{LifecycleReport, OrderRecord, TradeLifecycle};
use crate::domain::order_execution::errors::StateError;
use crate::domain::order_execution::value_objects::{
    EntryDecision, EntryEvent, LifecycleState, OrderStatusReport, TimeInForce,
};
use crate::domain::shared::{ExchangeOrderId, LifecycleId, Quantity};
use crate::domain::signal_intake::TradeIntent;
use crate::domain::sizing::{BracketSizer, MarketRules, SizingError, TradeConfig};
use crate::observability::{record_lifecycle_finished, record_order_placement};

/// Timing, retry and order settings for the sequencer.
#[derive(Debug, Clone, PartialEq)]
pub struct SequencerSettings {
    /// Interval between entry status polls.
    pub poll_interval: Duration,
    /// Retry policy applied to every gateway call.
    pub retry: RetryPolicy,
    /// Polls allowed after a cancel before the entry is declared unresolved.
    pub max_polls_after_cancel: u32,
    /// Time in force of limit entries.
    pub time_in_force: TimeInForce,
}

impl Default for SequencerSettings {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(2),
            retry: RetryPolicy::default(),
            max_polls_after_cancel: 5,
            time_in_force: TimeInForce::default(),
        }
    }
}

/// Where the entry phase ended.
enum EntryOutcome {
    Bracket(Quantity),
    Finished,
}

/// Runs OTO lifecycles.
pub struct OrderSequencer<G, P, R>
where
    G: ExchangeGateway,
    P: EventPublisherPort,
    R: LifecycleRepository,
{
    gateway: Arc<G>,
    publisher: Arc<P>,
    repository: Arc<R>,
    config: Arc<TradeConfig>,
    settings: SequencerSettings,
}

impl<G, P, R> OrderSequencer<G, P, R>
where
    G: ExchangeGateway,
    P: EventPublisherPort,
    R: LifecycleRepository,
{
    /// Create a new sequencer.
    pub const fn new(
        gateway: Arc<G>,
        publisher: Arc<P>,
        repository: Arc<R>,
        config: Arc<TradeConfig>,
        settings: SequencerSettings,
    ) -> Self {
        Self {
            gateway,
            publisher,
            repository,
            config,
            settings,
        }
    }

    /// Trade configuration in use.
    #[must_use]
    pub fn config(&self) -> &TradeConfig {
        &self.config
    }

    /// Run one lifecycle to a terminal state.
    ///
    /// `cancel` is the operator cancel for this lifecycle only. It is honoured
    /// while the entry is unfilled.
    pub async fn run(
        &self,
        id: LifecycleId,
        intent: TradeIntent,
        cancel: CancellationToken,
    ) -> LifecycleReport {
        let mut lifecycle = TradeLifecycle::new(id, intent);
        tracing::info!(
            lifecycle_id = %lifecycle.id(),
            symbol = %lifecycle.intent().symbol(),
            side = %lifecycle.intent().side(),
            "Lifecycle started"
        );

        if let Err(e) = self.drive(&mut lifecycle, &cancel).await {
            tracing::error!(
                lifecycle_id = %lifecycle.id(),
                state = %lifecycle.state(),
                error = %e,
                "Lifecycle aborted on state error"
            );
            if !lifecycle.state().is_terminal()
                && let Err(reject_err) = lifecycle.reject(e.to_string())
            {
                tracing::error!(lifecycle_id = %lifecycle.id(), error = %reject_err, "Could not reject lifecycle");
            }
        }

        self.checkpoint(&mut lifecycle).await;
        let report = lifecycle.report();
        record_lifecycle_finished(report.state);
        report
    }

    async fn drive(
        &self,
        lifecycle: &mut TradeLifecycle,
        cancel: &CancellationToken,
    ) -> Result<(), StateError> {
        if !self.submit_entry(lifecycle).await? {
            return Ok(());
        }
        self.checkpoint(lifecycle).await;

        let filled = match self.watch_entry(lifecycle, cancel).await? {
            EntryOutcome::Bracket(filled) => filled,
            EntryOutcome::Finished => return Ok(()),
        };
        self.checkpoint(lifecycle).await;

        self.place_brackets(lifecycle, filled).await?;
        Ok(())
    }

    // =========================================================================
    // Entry submission
    // =========================================================================

    /// Returns false if the lifecycle was rejected before an entry existed.
    async fn submit_entry(&self, lifecycle: &mut TradeLifecycle) -> Result<bool, StateError> {
        let symbol = lifecycle.intent().symbol().clone();

        let rules = match self.market_rules(lifecycle).await {
            Ok(rules) => rules,
            Err(reason) => {
                lifecycle.reject(reason)?;
                return Ok(false);
            }
        };

        let sized = lifecycle
            .prepare(rules, self.settings.time_in_force)
            .and_then(|()| BracketSizer::compute_entry_qty(lifecycle.intent(), &self.config, Some(rules)));
        let quantity = match sized {
            Ok(quantity) => quantity,
            Err(e) => {
                tracing::warn!(lifecycle_id = %lifecycle.id(), error = %e, "Entry sizing failed");
                lifecycle.reject(e.to_string())?;
                return Ok(false);
            }
        };

        let mut record = OrderRecord::new(lifecycle.entry_order(quantity)?);
        let request = PlaceOrderRequest::from_record(&symbol, &record);
        match self.place(request).await {
            Ok(order_id) => {
                record_order_placement("entry", "placed");
                tracing::info!(
                    lifecycle_id = %lifecycle.id(),
                    order_id = %order_id,
                    quantity = %quantity,
                    price = ?record.price().map(|p| p.to_string()),
                    time_in_force = ?record.time_in_force(),
                    "Entry order placed"
                );
                record.mark_placed(order_id);
                lifecycle.submit_entry(record)?;
                Ok(true)
            }
            Err(e) => {
                record_order_placement("entry", "failed");
                tracing::warn!(lifecycle_id = %lifecycle.id(), error = %e, "Entry placement failed");
                lifecycle.reject(format!("entry placement failed: {e}"))?;
                Ok(false)
            }
        }
    }

    async fn market_rules(&self, lifecycle: &TradeLifecycle) -> Result<MarketRules, String> {
        let symbol = lifecycle.intent().symbol();
        let rules = retry_gateway_call(&self.settings.retry, "get_market_rules", || {
            self.gateway.get_market_rules(symbol)
        })
        .await
        .map_err(|e| {
            tracing::warn!(lifecycle_id = %lifecycle.id(), error = %e, "Market rules lookup failed");
            let unknown = SizingError::UnknownLotSize {
                symbol: symbol.to_string(),
            };
            format!("{unknown}: {e}")
        })?;
        tracing::debug!(
            lifecycle_id = %lifecycle.id(),
            lot_size = %rules.lot_size(),
            price_tick = %rules.price_tick(),
            min_size = ?rules.min_size().map(|m| m.to_string()),
            "Market rules"
        );
        Ok(rules)
    }

    // =========================================================================
    // Entry phase
    // =========================================================================

    async fn watch_entry(
        &self,
        lifecycle: &mut TradeLifecycle,
        cancel: &CancellationToken,
    ) -> Result<EntryOutcome, StateError> {
        let order_id = lifecycle
            .entry()
            .and_then(OrderRecord::exchange_order_id)
            .cloned()
            .ok_or(StateError::NoEntry)?;

        let timeout = tokio::time::sleep_until(Instant::now() + self.config.entry_timeout());
        tokio::pin!(timeout);
        let mut poll = tokio::time::interval(self.settings.poll_interval);
        poll.set_missed_tick_behavior(MissedTickBehavior::Delay);

        let mut timed_out = false;
        let mut operator_cancelled = false;
        let mut polls_after_cancel = 0_u32;

        loop {
            let event = tokio::select! {
                () = cancel.cancelled(), if !operator_cancelled => {
                    operator_cancelled = true;
                    tracing::info!(lifecycle_id = %lifecycle.id(), "Operator cancel received");
                    EntryEvent::OperatorCancel
                }
                () = &mut timeout, if !timed_out => {
                    timed_out = true;
                    tracing::info!(lifecycle_id = %lifecycle.id(), "Entry timeout elapsed");
                    EntryEvent::TimeoutElapsed
                }
                _ = poll.tick() => {
                    if lifecycle.cancel_cause().is_some() {
                        polls_after_cancel += 1;
                    }
                    if polls_after_cancel > self.settings.max_polls_after_cancel {
                        tracing::warn!(
                            lifecycle_id = %lifecycle.id(),
                            order_id = %order_id,
                            polls = polls_after_cancel - 1,
                            "Entry still open after cancel"
                        );
                        EntryEvent::CancelUnresolved
                    } else {
                        match self.query_status(&order_id).await {
                            Ok(report) => EntryEvent::StatusObserved(report),
                            Err(e) => {
                                tracing::warn!(lifecycle_id = %lifecycle.id(), error = %e, "Entry status poll failed");
                                continue;
                            }
                        }
                    }
                }
            };

            let mut decision = lifecycle.apply(event)?;
            loop {
                match decision {
                    EntryDecision::Ignore | EntryDecision::KeepWaiting => break,
                    EntryDecision::CancelEntry => {
                        let answer = self.cancel_entry(lifecycle, &order_id).await;
                        self.checkpoint(lifecycle).await;
                        decision = lifecycle.apply(answer)?;
                    }
                    EntryDecision::Requery => match self.query_status(&order_id).await {
                        Ok(report) => decision = lifecycle.apply(EntryEvent::StatusObserved(report))?,
                        Err(e) => {
                            tracing::warn!(lifecycle_id = %lifecycle.id(), error = %e, "Entry status unknown after cancel request");
                            decision = lifecycle.apply(EntryEvent::CancelUnresolved)?;
                        }
                    },
                    EntryDecision::PlaceBrackets(filled) => {
                        let requested = lifecycle
                            .entry()
                            .map_or(Quantity::ZERO, OrderRecord::requested_qty);
                        tracing::info!(
                            lifecycle_id = %lifecycle.id(),
                            filled = %filled,
                            unfilled = %requested.saturating_sub(filled),
                            state = %lifecycle.state(),
                            "Entry filled"
                        );
                        return Ok(EntryOutcome::Bracket(filled));
                    }
                    EntryDecision::Finish(state) => {
                        tracing::info!(lifecycle_id = %lifecycle.id(), state = %state, "Entry phase ended without a fill");
                        return Ok(EntryOutcome::Finished);
                    }
                }
            }
        }
    }

    async fn cancel_entry(&self, lifecycle: &TradeLifecycle, order_id: &ExchangeOrderId) -> EntryEvent {
        let cause = lifecycle
            .cancel_cause()
            .map_or_else(String::new, |cause| cause.to_string());
        let result = retry_gateway_call(&self.settings.retry, "cancel_order", || {
            self.gateway.cancel_order(order_id)
        })
        .await;
        match result {
            Ok(true) => {
                tracing::info!(lifecycle_id = %lifecycle.id(), order_id = %order_id, cause, "Entry cancel confirmed");
                EntryEvent::CancelConfirmed
            }
            Ok(false) => {
                tracing::info!(lifecycle_id = %lifecycle.id(), order_id = %order_id, cause, "Entry cancel refused, checking for fill");
                EntryEvent::CancelRefused
            }
            Err(e) => {
                tracing::warn!(lifecycle_id = %lifecycle.id(), order_id = %order_id, cause, error = %e, "Entry cancel failed, checking for fill");
                EntryEvent::CancelRefused
            }
        }
    }

    async fn query_status(&self, order_id: &ExchangeOrderId) -> Result<OrderStatusReport, GatewayError> {
        retry_gateway_call(&self.settings.retry, "get_order_status", || {
            self.gateway.get_order_status(order_id)
        })
        .await
    }

    // =========================================================================
    // Bracket phase
    // =========================================================================

    /// Every leg is attempted even after a sibling fails.
    async fn place_brackets(
        &self,
        lifecycle: &mut TradeLifecycle,
        filled: Quantity,
    ) -> Result<LifecycleState, StateError> {
        let quantities = lifecycle.begin_brackets(self.config.tp_weights())?;
        tracing::info!(
            lifecycle_id = %lifecycle.id(),
            filled = %filled,
            stop = %quantities.stop,
            legs = lifecycle.brackets().len(),
            "Placing bracket"
        );

        let symbol = lifecycle.intent().symbol().clone();
        let requests: Vec<_> = lifecycle
            .brackets()
            .iter()
            .map(|record| (record.role(), PlaceOrderRequest::from_record(&symbol, record)))
            .collect();

        for (role, request) in requests {
            match self.place(request).await {
                Ok(order_id) => {
                    record_order_placement(role.kind(), "placed");
                    tracing::info!(lifecycle_id = %lifecycle.id(), role = %role, order_id = %order_id, "Bracket leg placed");
                    lifecycle.record_bracket_placed(role, order_id)?;
                }
                Err(e) => {
                    record_order_placement(role.kind(), "failed");
                    tracing::error!(lifecycle_id = %lifecycle.id(), role = %role, error = %e, "Bracket leg failed");
                    lifecycle.record_bracket_failed(role, e.to_string())?;
                }
            }
        }

        lifecycle.finish_brackets()
    }

    // =========================================================================
    // Shared
    // =========================================================================

    async fn place(&self, request: PlaceOrderRequest) -> Result<ExchangeOrderId, GatewayError> {
        retry_gateway_call(&self.settings.retry, "place_order", || {
            self.gateway.place_order(request.clone())
        })
        .await
    }

    /// Publish pending events and store the current snapshot.
    async fn checkpoint(&self, lifecycle: &mut TradeLifecycle) {
        let events = lifecycle.drain_events();
        if !events.is_empty()
            && let Err(e) = self.publisher.publish_lifecycle_events(events).await
        {
            tracing::error!(lifecycle_id = %lifecycle.id(), error = %e, "Failed to publish lifecycle events");
        }
        if let Err(e) = self.repository.save(&lifecycle.report()).await {
            tracing::error!(lifecycle_id = %lifecycle.id(), error = %e, "Failed to save lifecycle");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ports::{
        InMemoryLifecycleRepository, MockExchangeGateway, NoOpEventPublisher,
    };
    use crate::domain::order_execution::value_objects::{OrderRole, OrderStatus};
    use crate::domain::shared::{Price, Symbol};
    use crate::domain::signal_intake::{Entry, TradeSide};
    use crate::domain::sizing::{ExecutionMode, LotSize, PriceTick, TakeProfitWeights};
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    fn p(v: i64) -> Price {
        Price::new(Decimal::from(v))
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

    fn config() -> Arc<TradeConfig> {
        let weights =
            TakeProfitWeights::new([dec!(0.1), dec!(0.15), dec!(0.15), dec!(0.2), dec!(0.2), dec!(0.2)])
                .unwrap();
        Arc::new(
            TradeConfig::new(dec!(1000), weights, Duration::from_secs(60), ExecutionMode::Oto, true)
                .unwrap(),
        )
    }

    fn settings() -> SequencerSettings {
        SequencerSettings {
            poll_interval: Duration::from_millis(100),
            retry: RetryPolicy {
                max_attempts: 2,
                jitter_factor: 0.0,
                ..RetryPolicy::default()
            },
            max_polls_after_cancel: 3,
            time_in_force: TimeInForce::PostOnly,
        }
    }

    fn rules() -> MarketRules {
        MarketRules::new(
            LotSize::new(dec!(0.001)).unwrap(),
            PriceTick::new(dec!(0.01)).unwrap(),
        )
    }

    fn sequencer(
        gateway: MockExchangeGateway,
    ) -> OrderSequencer<MockExchangeGateway, NoOpEventPublisher, InMemoryLifecycleRepository> {
        OrderSequencer::new(
            Arc::new(gateway),
            Arc::new(NoOpEventPublisher),
            Arc::new(InMemoryLifecycleRepository::new()),
            config(),
            settings(),
        )
    }

    #[tokio::test(start_paused = true)]
    async fn unknown_lot_size_rejects_without_orders() {
        let mut gateway = MockExchangeGateway::new();
        gateway.expect_get_market_rules().times(3).returning(|_| {
            Err(GatewayError::NetworkError {
                message: "timeout".into(),
            })
        });
        gateway.expect_place_order().never();

        let report = sequencer(gateway)
            .run(LifecycleId::new("lc-1"), intent(), CancellationToken::new())
            .await;
        assert_eq!(report.state, LifecycleState::Rejected);
        assert!(report.error.unwrap().contains("Lot size unknown for BTC"));
        assert!(report.placed_order_ids.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn rejected_entry_places_nothing_else() {
        let mut gateway = MockExchangeGateway::new();
        gateway.expect_get_market_rules().returning(|_| Ok(rules()));
        gateway.expect_place_order().times(1).returning(|_| {
            Err(GatewayError::RejectedByExchange {
                reason: "insufficient margin".into(),
            })
        });
        gateway.expect_get_order_status().never();

        let report = sequencer(gateway)
            .run(LifecycleId::new("lc-1"), intent(), CancellationToken::new())
            .await;
        assert_eq!(report.state, LifecycleState::Rejected);
        assert!(report.error.unwrap().contains("insufficient margin"));
    }

    #[tokio::test(start_paused = true)]
    async fn filled_entry_places_seven_reduce_only_legs() {
        let mut gateway = MockExchangeGateway::new();
        gateway.expect_get_market_rules().returning(|_| Ok(rules()));
        gateway
            .expect_place_order()
            .withf(|r| r.client_order_id.as_str() == "lc-1-entry" && !r.reduce_only)
            .times(1)
            .returning(|r| {
                assert_eq!(r.quantity, Quantity::new(dec!(10)));
                assert_eq!(r.price, Some(Price::new(dec!(99.99))));
                assert_eq!(r.time_in_force, Some(TimeInForce::PostOnly));
                Ok(ExchangeOrderId::new("x-entry"))
            });
        gateway
            .expect_place_order()
            .withf(|r| r.reduce_only)
            .times(7)
            .returning(|r| Ok(ExchangeOrderId::new(format!("x-{}", r.client_order_id))));
        gateway
            .expect_get_order_status()
            .returning(|_| Ok(OrderStatusReport::new(OrderStatus::Filled, Quantity::new(dec!(10)))));
        gateway.expect_cancel_order().never();

        let report = sequencer(gateway)
            .run(LifecycleId::new("lc-1"), intent(), CancellationToken::new())
            .await;
        assert_eq!(report.state, LifecycleState::Complete);
        assert_eq!(report.brackets.len(), 7);
        assert_eq!(report.placed_order_ids.len(), 8);
        let stop = report
            .brackets
            .iter()
            .find(|r| r.role() == OrderRole::Stop)
            .unwrap();
        assert_eq!(stop.requested_qty(), Quantity::new(dec!(10)));
    }

    #[tokio::test(start_paused = true)]
    async fn operator_cancel_before_fill_cancels_entry() {
        let mut gateway = MockExchangeGateway::new();
        gateway.expect_get_market_rules().returning(|_| Ok(rules()));
        gateway
            .expect_place_order()
            .times(1)
            .returning(|_| Ok(ExchangeOrderId::new("x-entry")));
        let cancelled = Arc::new(std::sync::atomic::AtomicBool::new(false));
        let flag = Arc::clone(&cancelled);
        gateway.expect_get_order_status().returning(move |_| {
            let status = if flag.load(std::sync::atomic::Ordering::SeqCst) {
                OrderStatus::Cancelled
            } else {
                OrderStatus::Pending
            };
            Ok(OrderStatusReport::new(status, Quantity::ZERO))
        });
        let flag = Arc::clone(&cancelled);
        gateway.expect_cancel_order().times(1).returning(move |_| {
            flag.store(true, std::sync::atomic::Ordering::SeqCst);
            Ok(true)
        });

        let token = CancellationToken::new();
        token.cancel();
        let report = sequencer(gateway)
            .run(LifecycleId::new("lc-1"), intent(), token)
            .await;
        assert_eq!(report.state, LifecycleState::Cancelled);
        assert_eq!(report.placed_order_ids, vec![ExchangeOrderId::new("x-entry")]);
    }

    #[tokio::test(start_paused = true)]
    async fn entry_under_exchange_minimum_rejects_without_orders() {
        let mut gateway = MockExchangeGateway::new();
        gateway
            .expect_get_market_rules()
            .returning(|_| Ok(rules().with_min_size(Some(dec!(25))).unwrap()));
        gateway.expect_place_order().never();

        let report = sequencer(gateway)
            .run(LifecycleId::new("lc-1"), intent(), CancellationToken::new())
            .await;
        assert_eq!(report.state, LifecycleState::Rejected);
        assert!(report.error.unwrap().contains("below the exchange minimum"));
    }

    #[tokio::test(start_paused = true)]
    async fn open_entry_after_cancel_without_a_lot_rejects() {
        let mut gateway = MockExchangeGateway::new();
        gateway.expect_get_market_rules().returning(|_| Ok(rules()));
        gateway
            .expect_place_order()
            .times(1)
            .returning(|_| Ok(ExchangeOrderId::new("x-entry")));
        gateway
            .expect_get_order_status()
            .returning(|_| Ok(OrderStatusReport::new(OrderStatus::Pending, Quantity::ZERO)));
        gateway.expect_cancel_order().times(1).returning(|_| Ok(false));

        let token = CancellationToken::new();
        token.cancel();
        let report = sequencer(gateway)
            .run(LifecycleId::new("lc-1"), intent(), token)
            .await;
        assert_eq!(report.state, LifecycleState::Rejected);
        assert!(report.error.unwrap().contains("still unresolved after cancel"));
        assert_eq!(report.placed_order_ids, vec![ExchangeOrderId::new("x-entry")]);
    }
}
