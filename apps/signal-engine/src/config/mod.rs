//! Configuration module for the signal engine.
//!
//! YAML loading with environment variable interpolation, plus the value
//! checks that must hold before any order is sent.
//!
//! # Usage
//!
//! ```rust,ignore
//! use signal_engine::config::{Config, load_config};
//!
//! // Load from SIGNAL_ENGINE_CONFIG or config.yaml
//! let config = load_config(None)?;
//!
//! let trade = config.trading.to_trade_config()?;
//! println!("HTTP port: {}", config.server.http_port);
//! ```

mod gateway;
mod observability;
mod server;
mod trading;
mod validation;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use gateway::GatewayConfig;
pub use observability::{LoggingConfig, MetricsSettings, ObservabilityConfig};
pub use server::ServerConfig;
pub use trading::{RetryConfig, TradingConfig};
pub use validation::{StartupValidation, StartupValidationError, validate_startup};

/// Environment variable naming the config file.
pub const CONFIG_PATH_ENV: &str = "SIGNAL_ENGINE_CONFIG";

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read configuration file.
    #[error("Failed to read config file '{path}': {source}")]
    ReadError {
        /// Path to the config file.
        path: String,
        /// The underlying IO error.
        source: std::io::Error,
    },

    /// Failed to parse YAML configuration.
    #[error("Failed to parse config YAML: {0}")]
    ParseError(#[from] serde_yaml_bw::Error),

    /// Configuration validation failed.
    #[error("Config validation failed: {0}")]
    ValidationError(String),
}

/// Root configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Trading configuration.
    pub trading: TradingConfig,
    /// Gateway configuration.
    #[serde(default)]
    pub gateway: GatewayConfig,
    /// Server configuration.
    #[serde(default)]
    pub server: ServerConfig,
    /// Observability configuration.
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

// ============================================
// Configuration Loading
// ============================================

/// Load configuration from a YAML file with environment variable interpolation.
///
/// The path falls back to `SIGNAL_ENGINE_CONFIG`, then `config.yaml`.
///
/// # Errors
///
/// Returns a `ConfigError` if the file cannot be read, parsed, or validated.
pub fn load_config(path: Option<&str>) -> Result<Config, ConfigError> {
    let path = path.map_or_else(
        || std::env::var(CONFIG_PATH_ENV).unwrap_or_else(|_| "config.yaml".to_string()),
        str::to_string,
    );

    let contents = std::fs::read_to_string(&path).map_err(|e| ConfigError::ReadError {
        path: path.clone(),
        source: e,
    })?;

    load_config_from_string(&contents)
}

/// Load configuration from a YAML string (useful for testing).
///
/// # Errors
///
/// Returns a `ConfigError` if the YAML cannot be parsed or validated.
pub fn load_config_from_string(yaml: &str) -> Result<Config, ConfigError> {
    let interpolated = interpolate_env_vars(yaml);
    let config: Config = serde_yaml_bw::from_str(&interpolated)?;
    validate_config(&config)?;
    Ok(config)
}

/// Interpolate environment variables in a string.
///
/// Supports both `${VAR}` and `${VAR:-default}` syntax.
#[allow(clippy::expect_used)] // Regex is compile-time constant; expect() is safe here
fn interpolate_env_vars(input: &str) -> String {
    use std::sync::OnceLock;

    static ENV_VAR_REGEX: OnceLock<regex::Regex> = OnceLock::new();

    let re = ENV_VAR_REGEX.get_or_init(|| {
        regex::Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)(?::-([^}]*))?\}")
            .expect("env var regex is valid")
    });

    re.replace_all(input, |cap: &regex::Captures<'_>| {
        let var_name = cap.get(1).map_or("", |m| m.as_str());
        match std::env::var(var_name) {
            Ok(v) if !v.is_empty() => v,
            _ => cap.get(2).map_or_else(String::new, |m| m.as_str().to_string()),
        }
    })
    .into_owned()
}

/// Validate configuration values.
fn validate_config(config: &Config) -> Result<(), ConfigError> {
    config
        .trading
        .to_trade_config()
        .map_err(|e| ConfigError::ValidationError(format!("trading: {e}")))?;

    if config.trading.fill_poll_interval_ms == 0 {
        return Err(ConfigError::ValidationError(
            "trading.fill_poll_interval_ms must be positive".to_string(),
        ));
    }

    let retry = &config.trading.retry;
    if retry.backoff_multiplier < 1.0 {
        return Err(ConfigError::ValidationError(
            "trading.retry.backoff_multiplier must be at least 1.0".to_string(),
        ));
    }
    if !(0.0..=1.0).contains(&retry.jitter_factor) {
        return Err(ConfigError::ValidationError(
            "trading.retry.jitter_factor must be between 0.0 and 1.0".to_string(),
        ));
    }

    if config.gateway.default_lot_size <= Decimal::ZERO
        || config
            .gateway
            .lot_size_overrides
            .values()
            .any(|lot| *lot <= Decimal::ZERO)
    {
        return Err(ConfigError::ValidationError(
            "gateway lot sizes must be positive".to_string(),
        ));
    }
    if config.gateway.default_price_tick <= Decimal::ZERO
        || config
            .gateway
            .price_tick_overrides
            .values()
            .any(|tick| *tick <= Decimal::ZERO)
    {
        return Err(ConfigError::ValidationError(
            "gateway price ticks must be positive".to_string(),
        ));
    }
    if config
        .gateway
        .min_size_overrides
        .values()
        .any(|min| *min <= Decimal::ZERO)
    {
        return Err(ConfigError::ValidationError(
            "gateway minimum sizes must be positive".to_string(),
        ));
    }

    let valid_formats = ["json", "pretty"];
    if !valid_formats.contains(&config.observability.logging.format.as_str()) {
        return Err(ConfigError::ValidationError(format!(
            "observability.logging.format must be one of: {valid_formats:?}"
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::order_execution::TimeInForce;
    use crate::domain::sizing::ExecutionMode;
    use rust_decimal_macros::dec;
    use std::time::Duration;

    const MINIMAL: &str = r"
trading:
  trade_size_usd: 1000
  tp_weights: [0.1, 0.15, 0.15, 0.2, 0.2, 0.2]
";

    #[test]
    fn test_load_minimal_config() {
        let config = match load_config_from_string(MINIMAL) {
            Ok(c) => c,
            Err(e) => panic!("should load minimal config: {e}"),
        };
        assert_eq!(config.trading.trade_size_usd, dec!(1000));
        assert_eq!(config.trading.entry_timeout_min, 30);
        assert!(config.trading.dry_run);
        assert_eq!(config.trading.execution_mode, ExecutionMode::Oto);
        assert_eq!(config.server.http_port, 8080);
        assert_eq!(config.gateway.default_lot_size, dec!(0.001));
        assert_eq!(config.gateway.default_price_tick, dec!(0.01));
        assert_eq!(config.trading.time_in_force, TimeInForce::PostOnly);
        assert!(!config.observability.metrics.enabled);
    }

    #[test]
    fn test_camel_case_aliases() {
        let yaml = r"
trading:
  tradeSizeUsd: 250
  tpWeights: [0.1, 0.15, 0.15, 0.2, 0.2, 0.2]
  entryTimeoutMin: 5
  executionMode: OTO
  dryRun: true
";
        let config = load_config_from_string(yaml).unwrap();
        let trade = config.trading.to_trade_config().unwrap();
        assert_eq!(trade.trade_size_usd(), dec!(250));
        assert_eq!(trade.entry_timeout(), Duration::from_secs(300));
    }

    #[test]
    fn test_weights_must_sum_to_one() {
        let yaml = r"
trading:
  trade_size_usd: 1000
  tp_weights: [0.1, 0.1, 0.1, 0.1, 0.1, 0.1]
";
        let Err(err) = load_config_from_string(yaml) else {
            panic!("expected error for weights not summing to one");
        };
        assert!(matches!(err, ConfigError::ValidationError(_)));
        assert!(err.to_string().contains("trading"));
    }

    #[test]
    fn test_weights_need_six_entries() {
        let yaml = r"
trading:
  trade_size_usd: 1000
  tp_weights: [0.5, 0.5]
";
        assert!(matches!(
            load_config_from_string(yaml),
            Err(ConfigError::ValidationError(_))
        ));
    }

    #[test]
    fn test_unknown_execution_mode_fails_to_parse() {
        let yaml = r"
trading:
  trade_size_usd: 1000
  tp_weights: [0.1, 0.15, 0.15, 0.2, 0.2, 0.2]
  execution_mode: OCO
";
        assert!(matches!(
            load_config_from_string(yaml),
            Err(ConfigError::ParseError(_))
        ));
    }

    #[test]
    fn test_invalid_log_format() {
        let yaml = format!("{MINIMAL}observability:\n  logging:\n    format: xml\n");
        let Err(err) = load_config_from_string(&yaml) else {
            panic!("expected error for log format");
        };
        assert!(err.to_string().contains("format"));
    }

    #[test]
    fn test_non_positive_lot_size_rejected() {
        let yaml = format!("{MINIMAL}gateway:\n  lot_size_overrides:\n    BTC: 0\n");
        assert!(matches!(
            load_config_from_string(&yaml),
            Err(ConfigError::ValidationError(_))
        ));
    }

    #[test]
    fn test_non_positive_tick_and_minimum_rejected() {
        for gateway in ["default_price_tick: 0", "price_tick_overrides:\n    ETH: -0.01", "min_size_overrides:\n    ETH: 0"] {
            let yaml = format!("{MINIMAL}gateway:\n  {gateway}\n");
            assert!(
                matches!(load_config_from_string(&yaml), Err(ConfigError::ValidationError(_))),
                "{gateway}"
            );
        }
    }

    #[test]
    fn test_time_in_force_accepts_alo() {
        let yaml = format!("{MINIMAL}  timeInForce: Alo\n");
        let config = load_config_from_string(&yaml).unwrap();
        assert_eq!(config.trading.sequencer_settings().time_in_force, TimeInForce::PostOnly);

        let yaml = format!("{MINIMAL}  time_in_force: GTC\n");
        let config = load_config_from_string(&yaml).unwrap();
        assert_eq!(config.trading.sequencer_settings().time_in_force, TimeInForce::Gtc);
    }

    #[test]
    fn test_settings_projection() {
        let yaml = format!(
            "{MINIMAL}  fill_poll_interval_ms: 500\n  duplicate_window_secs: 60\n  allowed_symbols: [BTC, ETHUSDT]\n  retry:\n    max_attempts: 3\n"
        );
        let config = load_config_from_string(&yaml).unwrap();
        let settings = config.trading.sequencer_settings();
        assert_eq!(settings.poll_interval, Duration::from_millis(500));
        assert_eq!(settings.retry.max_attempts, 3);
        let intake = config.trading.intake_settings();
        assert_eq!(intake.allowed_symbols, vec!["BTC", "ETHUSDT"]);
        assert_eq!(intake.duplicate_window, Duration::from_secs(60));
    }

    #[test]
    fn test_env_var_with_default_when_missing() {
        let input = "level: ${SIGNAL_ENGINE_TEST_NONEXISTENT_VAR:-debug}";
        assert_eq!(interpolate_env_vars(input), "level: debug");
    }

    #[test]
    #[expect(clippy::literal_string_with_formatting_args)] // ${...} is env var syntax, not format args
    fn test_env_var_with_default_uses_existing() {
        let input = "path: ${PATH:-default}";
        let result = interpolate_env_vars(input);
        assert_ne!(result, "path: default");
        assert!(result.starts_with("path: "));
    }

    #[test]
    fn test_env_var_without_default_becomes_empty() {
        let input = "key: ${SIGNAL_ENGINE_TEST_UNLIKELY_TO_EXIST}";
        assert_eq!(interpolate_env_vars(input), "key: ");
    }

    #[test]
    fn test_missing_file_is_read_error() {
        let Err(err) = load_config(Some("/nonexistent/signal-engine.yaml")) else {
            panic!("expected read error");
        };
        assert!(matches!(err, ConfigError::ReadError { .. }));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(&path, MINIMAL).unwrap();
        let config = load_config(path.to_str()).unwrap();
        assert_eq!(config.trading.trade_size_usd, dec!(1000));
    }
}
