//! Exchange gateway configuration.

use std::collections::HashMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Gateway configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    /// Lot size the dry-run gateway reports for unlisted markets.
    #[serde(default = "default_lot_size")]
    pub default_lot_size: Decimal,
    /// Per-market lot sizes, keyed by full symbol or base coin.
    #[serde(default)]
    pub lot_size_overrides: HashMap<String, Decimal>,
    /// Price tick for unlisted markets.
    #[serde(default = "default_price_tick")]
    pub default_price_tick: Decimal,
    /// Per-market price ticks, keyed like lot sizes.
    #[serde(default)]
    pub price_tick_overrides: HashMap<String, Decimal>,
    /// Per-market minimum order sizes in base units.
    #[serde(default)]
    pub min_size_overrides: HashMap<String, Decimal>,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            default_lot_size: default_lot_size(),
            lot_size_overrides: HashMap::new(),
            default_price_tick: default_price_tick(),
            price_tick_overrides: HashMap::new(),
            min_size_overrides: HashMap::new(),
        }
    }
}

fn default_lot_size() -> Decimal {
    Decimal::new(1, 3)
}

fn default_price_tick() -> Decimal {
    Decimal::new(1, 2)
}
