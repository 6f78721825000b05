//! Property tests for bracket sizing.
//!
//! For any fill of at least one lot and any normalized weights:
//! - take-profit legs sum to the fill exactly
//! - every leg but the last is a whole number of lots
//! - the stop covers the whole fill

#![allow(clippy::expect_used, clippy::unwrap_used)]

use proptest::prelude::*;
use rust_decimal::Decimal;
use signal_engine::domain::shared::Quantity;
use signal_engine::domain::sizing::{BracketSizer, LotSize, TakeProfitWeights};

/// Six positive integer parts scaled to weights summing to exactly 1.
fn weights_strategy() -> impl Strategy<Value = TakeProfitWeights> {
    proptest::array::uniform6(1_u32..=20).prop_map(|parts| {
        let total: u32 = parts.iter().sum();
        let mut weights = [Decimal::ZERO; 6];
        let mut allocated = Decimal::ZERO;
        for (i, part) in parts.iter().take(5).enumerate() {
            let w = (Decimal::from(*part) / Decimal::from(total)).round_dp(6);
            weights[i] = w;
            allocated += w;
        }
        weights[5] = Decimal::ONE - allocated;
        TakeProfitWeights::new(weights).unwrap()
    })
}

fn lot_strategy() -> impl Strategy<Value = Decimal> {
    prop_oneof![
        Just(Decimal::new(1, 3)),
        Just(Decimal::new(1, 2)),
        Just(Decimal::new(5, 1)),
        Just(Decimal::ONE),
    ]
}

proptest! {
    #[test]
    fn take_profits_sum_to_fill(
        weights in weights_strategy(),
        step in lot_strategy(),
        lots in 1_u32..100_000,
    ) {
        let lot = LotSize::new(step).unwrap();
        let filled = Quantity::new(step * Decimal::from(lots));

        let qtys = BracketSizer::compute_bracket_qtys(filled, &weights, lot).unwrap();

        let sum: Decimal = qtys.take_profits.iter().map(Quantity::amount).sum();
        prop_assert_eq!(sum, filled.amount());
        prop_assert_eq!(qtys.stop, filled);
        for leg in &qtys.take_profits[..5] {
            prop_assert!(leg.amount() >= Decimal::ZERO);
            prop_assert_eq!((leg.amount() / step).fract(), Decimal::ZERO);
        }
        prop_assert!(qtys.take_profits[5].amount() >= Decimal::ZERO);
    }

    #[test]
    fn fill_below_one_lot_is_refused(
        weights in weights_strategy(),
        thousandths in 1_i64..1000,
    ) {
        let lot = LotSize::new(Decimal::ONE).unwrap();
        let filled = Quantity::new(Decimal::new(thousandths, 3));
        prop_assert!(BracketSizer::compute_bracket_qtys(filled, &weights, lot).is_err());
    }
}
