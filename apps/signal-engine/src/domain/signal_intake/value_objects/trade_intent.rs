//! TradeIntent: the immutable product of signal parsing.

use serde::{Deserialize, Serialize};

use super::{Entry, TradeSide};
use crate::domain::shared::{Price, SignalId, Symbol};
use crate::domain::signal_intake::errors::ParseError;

/// Number of take-profit legs every intent carries.
pub const TAKE_PROFIT_LEGS: usize = 6;

/// A fully validated trade signal.
///
/// Construction enforces that the stop sits on the loss side of entry and
/// that targets move strictly away from entry in the profit direction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TradeIntent {
    symbol: Symbol,
    side: TradeSide,
    entry: Entry,
    stop: Price,
    take_profits: [Price; TAKE_PROFIT_LEGS],
    leverage: Option<u32>,
    timeframe: Option<String>,
    signal_id: Option<SignalId>,
    source: Option<String>,
}

impl TradeIntent {
    /// Build an intent, checking price ordering against the side.
    pub fn new(
        symbol: Symbol,
        side: TradeSide,
        entry: Entry,
        stop: Price,
        take_profits: [Price; TAKE_PROFIT_LEGS],
    ) -> Result<Self, ParseError> {
        validate_ordering(side, entry.price(), stop, &take_profits)?;
        Ok(Self {
            symbol,
            side,
            entry,
            stop,
            take_profits,
            leverage: None,
            timeframe: None,
            signal_id: None,
            source: None,
        })
    }

    /// Attach a leverage hint.
    #[must_use]
    pub const fn with_leverage(mut self, leverage: Option<u32>) -> Self {
        self.leverage = leverage;
        self
    }

    /// Attach a timeframe hint (e.g. "5m").
    #[must_use]
    pub fn with_timeframe(mut self, timeframe: Option<String>) -> Self {
        self.timeframe = timeframe;
        self
    }

    /// Attach the id carried by the signal text.
    #[must_use]
    pub fn with_signal_id(mut self, signal_id: Option<SignalId>) -> Self {
        self.signal_id = signal_id;
        self
    }

    /// Attach the channel/source the message came from.
    #[must_use]
    pub fn with_source(mut self, source: Option<String>) -> Self {
        self.source = source;
        self
    }

    /// Market symbol.
    #[must_use]
    pub const fn symbol(&self) -> &Symbol {
        &self.symbol
    }

    /// Trade direction.
    #[must_use]
    pub const fn side(&self) -> TradeSide {
        self.side
    }

    /// Entry reference.
    #[must_use]
    pub const fn entry(&self) -> &Entry {
        &self.entry
    }

    /// Entry price used for sizing.
    #[must_use]
    pub const fn entry_price(&self) -> Price {
        self.entry.price()
    }

    /// Stop-loss level.
    #[must_use]
    pub const fn stop(&self) -> Price {
        self.stop
    }

    /// Take-profit levels, nearest first.
    #[must_use]
    pub const fn take_profits(&self) -> &[Price; TAKE_PROFIT_LEGS] {
        &self.take_profits
    }

    /// Leverage hint, if the signal gave one.
    #[must_use]
    pub const fn leverage(&self) -> Option<u32> {
        self.leverage
    }

    /// Timeframe hint, if the signal gave one.
    #[must_use]
    pub fn timeframe(&self) -> Option<&str> {
        self.timeframe.as_deref()
    }

    /// Signal id, if the signal gave one.
    #[must_use]
    pub const fn signal_id(&self) -> Option<&SignalId> {
        self.signal_id.as_ref()
    }

    /// Source channel, if known.
    #[must_use]
    pub fn source(&self) -> Option<&str> {
        self.source.as_deref()
    }
}

fn validate_ordering(
    side: TradeSide,
    entry: Price,
    stop: Price,
    take_profits: &[Price; TAKE_PROFIT_LEGS],
) -> Result<(), ParseError> {
    let invalid = |reason: String| Err(ParseError::InvalidOrdering { reason });

    if !entry.is_positive() || !stop.is_positive() {
        return invalid("entry and stop must be positive".to_string());
    }
    if !side.is_profit_direction(stop.amount(), entry.amount()) {
        return invalid(format!("stop {stop} is not on the loss side of entry {entry} for {side}"));
    }

    let mut previous = entry;
    for (i, tp) in take_profits.iter().enumerate() {
        if !side.is_profit_direction(previous.amount(), tp.amount()) {
            return invalid(format!(
                "TP{} {tp} does not move away from {previous} for {side}",
                i + 1
            ));
        }
        previous = *tp;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    fn prices(values: [i64; TAKE_PROFIT_LEGS]) -> [Price; TAKE_PROFIT_LEGS] {
        values.map(|v| Price::new(Decimal::from(v)))
    }

    fn p(v: i64) -> Price {
        Price::new(Decimal::from(v))
    }

    #[test]
    fn long_intent_accepts_ascending_targets() {
        let intent = TradeIntent::new(
            Symbol::new("BTC"),
            TradeSide::Long,
            Entry::limit(p(100)),
            p(95),
            prices([101, 102, 103, 104, 105, 106]),
        )
        .unwrap();
        assert_eq!(intent.entry_price(), p(100));
        assert_eq!(intent.take_profits()[5], p(106));
        assert!(intent.signal_id().is_none());
    }

    #[test]
    fn short_intent_accepts_descending_targets() {
        let intent = TradeIntent::new(
            Symbol::new("ETH/USD"),
            TradeSide::Short,
            Entry::limit(p(100)),
            p(105),
            prices([99, 98, 97, 96, 95, 94]),
        );
        assert!(intent.is_ok());
    }

    #[test]
    fn long_stop_above_entry_is_rejected() {
        let err = TradeIntent::new(
            Symbol::new("BTC"),
            TradeSide::Long,
            Entry::limit(p(100)),
            p(101),
            prices([101, 102, 103, 104, 105, 106]),
        )
        .unwrap_err();
        assert!(matches!(err, ParseError::InvalidOrdering { .. }));
    }

    #[test]
    fn non_monotonic_targets_are_rejected() {
        let err = TradeIntent::new(
            Symbol::new("BTC"),
            TradeSide::Long,
            Entry::limit(p(100)),
            p(95),
            prices([101, 103, 102, 104, 105, 106]),
        )
        .unwrap_err();
        let ParseError::InvalidOrdering { reason } = err else {
            panic!("expected InvalidOrdering");
        };
        assert!(reason.contains("TP3"));
    }

    #[test]
    fn builder_attaches_metadata() {
        let intent = TradeIntent::new(
            Symbol::new("BTC"),
            TradeSide::Long,
            Entry::limit(p(100)),
            p(95),
            prices([101, 102, 103, 104, 105, 106]),
        )
        .unwrap()
        .with_leverage(Some(20))
        .with_timeframe(Some("5m".to_string()))
        .with_signal_id(Some(SignalId::new("abc")))
        .with_source(Some("vip-channel".to_string()));

        assert_eq!(intent.leverage(), Some(20));
        assert_eq!(intent.timeframe(), Some("5m"));
        assert_eq!(intent.signal_id().map(SignalId::as_str), Some("abc"));
        assert_eq!(intent.source(), Some("vip-channel"));
    }
}
