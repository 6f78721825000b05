//! Checks run once at startup, before the intake accepts signals.

use super::Config;

/// Errors from startup validation.
#[derive(Debug, thiserror::Error)]
pub enum StartupValidationError {
    /// Live routing requested but no live gateway is linked into this build.
    #[error("Live trading unavailable: {0}")]
    LiveGatewayUnavailable(String),

    /// Invalid configuration.
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),
}

/// Result of startup validation.
#[derive(Debug)]
pub struct StartupValidation {
    /// Whether validation passed.
    pub valid: bool,
    /// Warning messages (non-fatal).
    pub warnings: Vec<String>,
}

impl StartupValidation {
    /// Create a successful validation result.
    #[must_use]
    pub const fn ok() -> Self {
        Self {
            valid: true,
            warnings: Vec::new(),
        }
    }

    /// Create a successful validation with warnings.
    #[must_use]
    pub const fn ok_with_warnings(warnings: Vec<String>) -> Self {
        Self {
            valid: true,
            warnings,
        }
    }
}

/// Validate the loaded configuration against what this binary can run.
///
/// # Errors
///
/// Returns `StartupValidationError` when `dry_run` is off, since only the
/// dry-run gateway ships with the engine, or when the metrics address does
/// not parse while metrics are enabled.
pub fn validate_startup(config: &Config) -> Result<StartupValidation, StartupValidationError> {
    if !config.trading.dry_run {
        return Err(StartupValidationError::LiveGatewayUnavailable(
            "trading.dry_run is false but only the dry-run gateway is available. \
             Set trading.dry_run: true."
                .to_string(),
        ));
    }

    let metrics = &config.observability.metrics;
    if metrics.enabled && metrics.listen_addr.parse::<std::net::SocketAddr>().is_err() {
        return Err(StartupValidationError::InvalidConfiguration(format!(
            "observability.metrics.listen_addr '{}' is not a socket address",
            metrics.listen_addr
        )));
    }

    let mut warnings = Vec::new();

    if config.trading.allowed_symbols.is_empty() {
        warnings.push("trading.allowed_symbols is empty; every symbol is accepted".to_string());
    }

    if config.trading.fixed_entry_qty.is_some() {
        warnings.push(
            "trading.fixed_entry_qty set; trade_size_usd is ignored for entry sizing".to_string(),
        );
    }

    if warnings.is_empty() {
        Ok(StartupValidation::ok())
    } else {
        Ok(StartupValidation::ok_with_warnings(warnings))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::load_config_from_string;

    fn config(extra: &str) -> Config {
        let yaml = format!(
            "trading:\n  trade_size_usd: 1000\n  tp_weights: [0.1, 0.15, 0.15, 0.2, 0.2, 0.2]\n{extra}"
        );
        load_config_from_string(&yaml).unwrap()
    }

    #[test]
    fn test_dry_run_with_allow_list_is_clean() {
        let result = validate_startup(&config("  allowed_symbols: [BTC]\n")).unwrap();
        assert!(result.valid);
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn test_empty_allow_list_warns() {
        let result = validate_startup(&config("")).unwrap();
        assert!(result.valid);
        assert_eq!(result.warnings.len(), 1);
        assert!(result.warnings[0].contains("allowed_symbols"));
    }

    #[test]
    fn test_live_mode_is_refused() {
        let err = validate_startup(&config("  dry_run: false\n")).unwrap_err();
        assert!(matches!(
            err,
            StartupValidationError::LiveGatewayUnavailable(_)
        ));
    }

    #[test]
    fn test_bad_metrics_address() {
        let cfg = config(
            "  allowed_symbols: [BTC]\nobservability:\n  metrics:\n    enabled: true\n    listen_addr: nowhere\n",
        );
        assert!(matches!(
            validate_startup(&cfg),
            Err(StartupValidationError::InvalidConfiguration(_))
        ));
    }
}
