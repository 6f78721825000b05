//! Process-wide trade configuration.

use std::fmt;
use std::time::Duration;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::TakeProfitWeights;
use crate::domain::sizing::errors::SizingError;

/// Order sequencing pattern.
///
/// Only OTO is built; OCO is outside this engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ExecutionMode {
    /// One-Triggers-Others: entry first, brackets after fill.
    #[default]
    #[serde(rename = "OTO", alias = "oto")]
    Oto,
}

impl fmt::Display for ExecutionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Oto => write!(f, "OTO"),
        }
    }
}

/// Immutable trade configuration, built once at startup and passed down.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TradeConfig {
    trade_size_usd: Decimal,
    tp_weights: TakeProfitWeights,
    entry_timeout: Duration,
    execution_mode: ExecutionMode,
    dry_run: bool,
    fixed_entry_qty: Option<Decimal>,
}

impl TradeConfig {
    /// Build a configuration; trade size and timeout must be positive.
    pub fn new(
        trade_size_usd: Decimal,
        tp_weights: TakeProfitWeights,
        entry_timeout: Duration,
        execution_mode: ExecutionMode,
        dry_run: bool,
    ) -> Result<Self, SizingError> {
        if trade_size_usd <= Decimal::ZERO {
            return Err(SizingError::InvalidInput(format!(
                "trade size must be positive, got {trade_size_usd}"
            )));
        }
        if entry_timeout.is_zero() {
            return Err(SizingError::InvalidInput(
                "entry timeout must be positive".to_string(),
            ));
        }
        Ok(Self {
            trade_size_usd,
            tp_weights,
            entry_timeout,
            execution_mode,
            dry_run,
            fixed_entry_qty: None,
        })
    }

    /// Replace notional sizing with a fixed base quantity.
    pub fn with_fixed_entry_qty(mut self, qty: Option<Decimal>) -> Result<Self, SizingError> {
        if let Some(q) = qty
            && q <= Decimal::ZERO
        {
            return Err(SizingError::InvalidInput(format!(
                "fixed entry quantity must be positive, got {q}"
            )));
        }
        self.fixed_entry_qty = qty;
        Ok(self)
    }

    /// Quote-currency notional per trade.
    #[must_use]
    pub const fn trade_size_usd(&self) -> Decimal {
        self.trade_size_usd
    }

    /// Take-profit weights.
    #[must_use]
    pub const fn tp_weights(&self) -> &TakeProfitWeights {
        &self.tp_weights
    }

    /// How long an unfilled entry may rest before it is cancelled.
    #[must_use]
    pub const fn entry_timeout(&self) -> Duration {
        self.entry_timeout
    }

    /// Sequencing pattern.
    #[must_use]
    pub const fn execution_mode(&self) -> ExecutionMode {
        self.execution_mode
    }

    /// Whether the dry-run gateway is in use.
    #[must_use]
    pub const fn dry_run(&self) -> bool {
        self.dry_run
    }

    /// Fixed entry quantity override.
    #[must_use]
    pub const fn fixed_entry_qty(&self) -> Option<Decimal> {
        self.fixed_entry_qty
    }
}
