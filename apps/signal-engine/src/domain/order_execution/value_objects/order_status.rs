//! Exchange-reported order status.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::shared::Quantity;

/// Status of a single order as the exchange reports it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    /// Resting on the book (or not yet acknowledged), nothing filled.
    Pending,
    /// Some quantity filled, order still working.
    PartiallyFilled,
    /// Completely filled.
    Filled,
    /// Cancelled (possibly after a partial fill).
    Cancelled,
    /// Rejected by the exchange.
    Rejected,
    /// Expired by the exchange (possibly after a partial fill).
    Expired,
}

impl OrderStatus {
    /// Returns true if the order can no longer fill.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::Filled | Self::Cancelled | Self::Rejected | Self::Expired
        )
    }

    /// Returns true if the order is still working on the exchange.
    #[must_use]
    pub const fn is_open(&self) -> bool {
        matches!(self, Self::Pending | Self::PartiallyFilled)
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pending => write!(f, "PENDING"),
            Self::PartiallyFilled => write!(f, "PARTIALLY_FILLED"),
            Self::Filled => write!(f, "FILLED"),
            Self::Cancelled => write!(f, "CANCELLED"),
            Self::Rejected => write!(f, "REJECTED"),
            Self::Expired => write!(f, "EXPIRED"),
        }
    }
}

/// One status observation: status plus cumulative filled quantity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderStatusReport {
    /// Reported status.
    pub status: OrderStatus,
    /// Cumulative filled quantity.
    pub filled_qty: Quantity,
}

impl OrderStatusReport {
    /// Create a report.
    #[must_use]
    pub const fn new(status: OrderStatus, filled_qty: Quantity) -> Self {
        Self { status, filled_qty }
    }
}
