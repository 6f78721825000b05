//! Strongly-typed identifiers for signals, lifecycles and orders.
//!
//! Client-side ids (`LifecycleId`, `ClientOrderId`) are generated locally;
//! `ExchangeOrderId` is whatever the venue hands back on placement.

use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! define_id {
    ($name:ident, $doc:expr) => {
        #[doc = $doc]
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Create a new identifier from a string.
            #[must_use]
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            /// Generate a new unique identifier using UUID v4.
            #[must_use]
            pub fn generate() -> Self {
                Self(uuid::Uuid::new_v4().to_string())
            }

            /// Get the inner string value.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(value)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }
    };
}

define_id!(LifecycleId, "Unique identifier for one signal's trade lifecycle.");
define_id!(
    SignalId,
    "Identifier carried by the signal text itself (`id=...`), used for de-duplication."
);
define_id!(
    ClientOrderId,
    "Locally generated order id sent with every placement so retries stay idempotent."
);
define_id!(ExchangeOrderId, "Venue-assigned identifier for a placed order.");

impl ClientOrderId {
    /// Derive the client id for one order of a lifecycle.
    ///
    /// The same lifecycle and leg always yield the same id, so a placement
    /// retried after a lost response cannot open a second order.
    #[must_use]
    pub fn for_leg(lifecycle: &LifecycleId, leg: &str) -> Self {
        Self(format!("{lifecycle}-{leg}"))
    }
}
