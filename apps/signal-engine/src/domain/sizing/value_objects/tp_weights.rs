//! Take-profit weights.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Serialize;

use crate::domain::signal_intake::TAKE_PROFIT_LEGS;
use crate::domain::sizing::errors::SizingError;

/// Allowed deviation of the weight sum from 1.0.
pub const WEIGHT_TOLERANCE: Decimal = dec!(0.000001);

/// Share of the filled quantity allotted to each take-profit leg.
///
/// Each weight is in (0, 1] and the weights sum to 1.0 within
/// [`WEIGHT_TOLERANCE`]. Only constructible through validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct TakeProfitWeights([Decimal; TAKE_PROFIT_LEGS]);

impl TakeProfitWeights {
    /// Validate a fixed-size weight array.
    pub fn new(weights: [Decimal; TAKE_PROFIT_LEGS]) -> Result<Self, SizingError> {
        for (index, value) in weights.iter().copied().enumerate() {
            if value <= Decimal::ZERO || value > Decimal::ONE {
                return Err(SizingError::InvalidWeight { index, value });
            }
        }
        let sum: Decimal = weights.iter().sum();
        if (sum - Decimal::ONE).abs() > WEIGHT_TOLERANCE {
            return Err(SizingError::WeightsNotNormalized { sum });
        }
        Ok(Self(weights))
    }

    /// Validate weights read from configuration, where the count is not fixed.
    pub fn try_from_slice(weights: &[Decimal]) -> Result<Self, SizingError> {
        let fixed: [Decimal; TAKE_PROFIT_LEGS] =
            weights
                .try_into()
                .map_err(|_| SizingError::WeightCountMismatch {
                    expected: TAKE_PROFIT_LEGS,
                    found: weights.len(),
                })?;
        Self::new(fixed)
    }

    /// The weights, nearest target first.
    #[must_use]
    pub const fn as_array(&self) -> &[Decimal; TAKE_PROFIT_LEGS] {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_normalized_weights() {
        let weights = TakeProfitWeights::new([
            dec!(0.1),
            dec!(0.15),
            dec!(0.15),
            dec!(0.2),
            dec!(0.2),
            dec!(0.2),
        ])
        .unwrap();
        assert_eq!(weights.as_array()[0], dec!(0.1));
    }

    #[test]
    fn accepts_sum_within_tolerance() {
        let sixth = dec!(0.1666667);
        let weights = [sixth, sixth, sixth, sixth, sixth, dec!(0.1666666)];
        assert!(TakeProfitWeights::new(weights).is_ok());
    }

    #[test]
    fn rejects_sum_off_by_more_than_tolerance() {
        let err = TakeProfitWeights::new([
            dec!(0.1),
            dec!(0.15),
            dec!(0.15),
            dec!(0.2),
            dec!(0.2),
            dec!(0.19),
        ])
        .unwrap_err();
        assert_eq!(err, SizingError::WeightsNotNormalized { sum: dec!(0.99) });
    }

    #[test]
    fn rejects_zero_weight() {
        let err = TakeProfitWeights::new([
            dec!(0.2),
            dec!(0.2),
            dec!(0.2),
            dec!(0.2),
            dec!(0.2),
            Decimal::ZERO,
        ])
        .unwrap_err();
        assert_eq!(
            err,
            SizingError::InvalidWeight {
                index: 5,
                value: Decimal::ZERO
            }
        );
    }

    #[test]
    fn rejects_wrong_count() {
        let err = TakeProfitWeights::try_from_slice(&[dec!(0.5), dec!(0.5)]).unwrap_err();
        assert_eq!(
            err,
            SizingError::WeightCountMismatch {
                expected: 6,
                found: 2
            }
        );
    }
}
