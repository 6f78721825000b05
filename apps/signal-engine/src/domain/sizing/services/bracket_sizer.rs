//! Bracket Sizer Service
//!
//! Entry sizing from the configured notional, and the proportional split of
//! a filled entry across the take-profit legs.

use rust_decimal::Decimal;
use serde::Serialize;

use crate::domain::shared::Quantity;
use crate::domain::signal_intake::{TAKE_PROFIT_LEGS, TradeIntent};
use crate::domain::sizing::errors::SizingError;
use crate::domain::sizing::value_objects::{LotSize, MarketRules, TakeProfitWeights, TradeConfig};

/// Quantities for one bracket: six take-profit legs and the stop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BracketQuantities {
    /// Take-profit leg quantities, nearest target first.
    pub take_profits: [Quantity; TAKE_PROFIT_LEGS],
    /// Stop quantity (always the full filled quantity).
    pub stop: Quantity,
}

impl BracketQuantities {
    /// Sum of the take-profit legs.
    #[must_use]
    pub fn take_profit_total(&self) -> Quantity {
        self.take_profits.iter().copied().sum()
    }
}

/// Deterministic sizing for entries and brackets.
#[derive(Debug, Clone, Copy, Default)]
pub struct BracketSizer;

impl BracketSizer {
    /// Entry quantity: `trade_size_usd / entry_price` (or the fixed override),
    /// rounded down to the lot size and checked against the market minimum.
    ///
    /// `rules` is `None` when the exchange could not supply them.
    pub fn compute_entry_qty(
        intent: &TradeIntent,
        config: &TradeConfig,
        rules: Option<MarketRules>,
    ) -> Result<Quantity, SizingError> {
        let rules = rules.ok_or_else(|| SizingError::UnknownLotSize {
            symbol: intent.symbol().to_string(),
        })?;
        let lot = rules.lot_size();

        let raw = match config.fixed_entry_qty() {
            Some(fixed) => fixed,
            None => {
                let price = intent.entry_price().amount();
                if price <= Decimal::ZERO {
                    return Err(SizingError::InvalidInput(format!(
                        "entry price must be positive, got {price}"
                    )));
                }
                let notional = config.trade_size_usd();
                notional
                    .checked_div(price)
                    .ok_or_else(|| SizingError::Overflow(format!("{notional} / {price}")))?
            }
        };

        let qty = lot.floor(raw)?;
        if qty <= Decimal::ZERO {
            return Err(SizingError::BelowMinimum {
                calculated: raw,
                lot_size: lot.step(),
            });
        }
        if let Some(min_size) = rules.min_size()
            && qty < min_size
        {
            return Err(SizingError::BelowMinimumSize {
                size: qty,
                min_size,
            });
        }
        Ok(Quantity::new(qty))
    }

    /// Split `filled` across the take-profit legs.
    ///
    /// Every leg but the last is `floor(filled * w / lot) * lot`; the last
    /// leg takes the remainder so the legs sum to `filled` exactly. The stop
    /// always covers the whole fill.
    pub fn compute_bracket_qtys(
        filled: Quantity,
        weights: &TakeProfitWeights,
        lot_size: LotSize,
    ) -> Result<BracketQuantities, SizingError> {
        if !lot_size.covers(filled) {
            return Err(SizingError::FillBelowLotSize {
                filled: filled.amount(),
                lot_size: lot_size.step(),
            });
        }

        let mut take_profits = [Quantity::ZERO; TAKE_PROFIT_LEGS];
        let mut allocated = Decimal::ZERO;
        let (head, _) = weights.as_array().split_at(TAKE_PROFIT_LEGS - 1);
        for (leg, weight) in take_profits.iter_mut().zip(head) {
            let share = filled
                .amount()
                .checked_mul(*weight)
                .ok_or_else(|| SizingError::Overflow(format!("{filled} x {weight}")))?;
            let qty = lot_size.floor(share)?;
            *leg = Quantity::new(qty);
            allocated += qty;
        }
        take_profits[TAKE_PROFIT_LEGS - 1] = Quantity::new(filled.amount() - allocated);

        Ok(BracketQuantities {
            take_profits,
            stop: filled,
        })
    }
}
