//! Trading configuration: sizing, timeouts, intake filtering and retries.

use std::time::Duration;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::application::services::{RetryPolicy, SequencerSettings};
use crate::application::use_cases::IntakeSettings;
use crate::domain::order_execution::TimeInForce;
use crate::domain::sizing::{ExecutionMode, SizingError, TakeProfitWeights, TradeConfig};

/// Trading configuration.
///
/// Keys are snake_case; the camelCase names used by signal tooling are
/// accepted as aliases.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TradingConfig {
    /// Quote-currency notional per trade.
    #[serde(alias = "tradeSizeUsd")]
    pub trade_size_usd: Decimal,
    /// Six take-profit weights, nearest target first; must sum to 1.0.
    #[serde(alias = "tpWeights")]
    pub tp_weights: Vec<Decimal>,
    /// Minutes an unfilled entry may rest before it is cancelled.
    #[serde(alias = "entryTimeoutMin", default = "default_entry_timeout_min")]
    pub entry_timeout_min: u64,
    /// Sequencing pattern (OTO only).
    #[serde(alias = "executionMode", default)]
    pub execution_mode: ExecutionMode,
    /// Route orders to the dry-run gateway.
    #[serde(alias = "dryRun", default = "default_dry_run")]
    pub dry_run: bool,
    /// Fixed base quantity that replaces notional sizing.
    #[serde(alias = "fixedEntryQty", default)]
    pub fixed_entry_qty: Option<Decimal>,
    /// Accepted symbols (full or base coin); empty accepts all.
    #[serde(alias = "allowedSymbols", default)]
    pub allowed_symbols: Vec<String>,
    /// Entry status poll interval (milliseconds).
    #[serde(alias = "fillPollIntervalMs", default = "default_poll_interval_ms")]
    pub fill_poll_interval_ms: u64,
    /// How long a signal id is remembered for de-duplication (seconds).
    #[serde(alias = "duplicateWindowSecs", default = "default_duplicate_window_secs")]
    pub duplicate_window_secs: u64,
    /// Time in force of limit entries (GTC, IOC or ALO/POST_ONLY).
    #[serde(alias = "timeInForce", default = "default_time_in_force")]
    pub time_in_force: TimeInForce,
    /// Gateway retry settings.
    #[serde(default)]
    pub retry: RetryConfig,
}

/// Gateway retry settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Retries after the first call.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    /// First backoff (milliseconds).
    #[serde(default = "default_initial_backoff_ms")]
    pub initial_backoff_ms: u64,
    /// Backoff cap (milliseconds).
    #[serde(default = "default_max_backoff_ms")]
    pub max_backoff_ms: u64,
    /// Exponential growth factor.
    #[serde(default = "default_backoff_multiplier")]
    pub backoff_multiplier: f64,
    /// Jitter factor (0.2 = ±20%).
    #[serde(default = "default_jitter_factor")]
    pub jitter_factor: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            initial_backoff_ms: default_initial_backoff_ms(),
            max_backoff_ms: default_max_backoff_ms(),
            backoff_multiplier: default_backoff_multiplier(),
            jitter_factor: default_jitter_factor(),
        }
    }
}

impl RetryConfig {
    /// Convert to the runtime policy.
    #[must_use]
    pub const fn to_policy(&self) -> RetryPolicy {
        RetryPolicy::new(
            self.max_attempts,
            Duration::from_millis(self.initial_backoff_ms),
            Duration::from_millis(self.max_backoff_ms),
            self.backoff_multiplier,
            self.jitter_factor,
        )
    }
}

impl TradingConfig {
    /// Build the immutable domain configuration, validating the weights.
    pub fn to_trade_config(&self) -> Result<TradeConfig, SizingError> {
        let weights = TakeProfitWeights::try_from_slice(&self.tp_weights)?;
        TradeConfig::new(
            self.trade_size_usd,
            weights,
            Duration::from_secs(self.entry_timeout_min.saturating_mul(60)),
            self.execution_mode,
            self.dry_run,
        )?
        .with_fixed_entry_qty(self.fixed_entry_qty)
    }

    /// Sequencer timing and retry settings.
    #[must_use]
    pub fn sequencer_settings(&self) -> SequencerSettings {
        SequencerSettings {
            poll_interval: Duration::from_millis(self.fill_poll_interval_ms.max(1)),
            retry: self.retry.to_policy(),
            max_polls_after_cancel: self.retry.max_attempts.max(1),
            time_in_force: self.time_in_force,
        }
    }

    /// Intake filtering settings.
    #[must_use]
    pub fn intake_settings(&self) -> IntakeSettings {
        IntakeSettings {
            allowed_symbols: self.allowed_symbols.clone(),
            duplicate_window: Duration::from_secs(self.duplicate_window_secs),
        }
    }
}

const fn default_entry_timeout_min() -> u64 {
    30
}

const fn default_dry_run() -> bool {
    true
}

const fn default_poll_interval_ms() -> u64 {
    2_000
}

const fn default_duplicate_window_secs() -> u64 {
    3_600
}

const fn default_time_in_force() -> TimeInForce {
    TimeInForce::PostOnly
}

const fn default_max_attempts() -> u32 {
    5
}

const fn default_initial_backoff_ms() -> u64 {
    100
}

const fn default_max_backoff_ms() -> u64 {
    30_000
}

const fn default_backoff_multiplier() -> f64 {
    2.0
}

const fn default_jitter_factor() -> f64 {
    0.2
}
