//! Strongly-typed identifiers used across the service.
//!
//! Product and order ids are opaque client strings. Reservation and event ids
//! may be generated server-side from 128 random bits; the prefix keeps the two
//! namespaces apart.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identifier of a product (one stock record per product).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductId(String);

/// Identifier of the order a reservation is held for.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderId(String);

/// Identifier of a reservation (client-supplied or generated).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReservationId(String);

/// Identifier of a recorded inventory event.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventId(String);

macro_rules! impl_string_newtype {
    ($t:ty) => {
        impl $t {
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// True when the id is empty or whitespace only.
            pub fn is_blank(&self) -> bool {
                self.0.trim().is_empty()
            }
        }

        impl core::fmt::Display for $t {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<String> for $t {
            fn from(value: String) -> Self {
                Self(value)
            }
        }

        impl From<&str> for $t {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }

        impl AsRef<str> for $t {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

impl_string_newtype!(ProductId);
impl_string_newtype!(OrderId);
impl_string_newtype!(ReservationId);
impl_string_newtype!(EventId);

fn random_token(prefix: &str) -> String {
    format!("{prefix}-{}", Uuid::new_v4().simple())
}

impl ReservationId {
    pub const PREFIX: &'static str = "res";

    /// Generate a fresh `res-<32 hex>` identifier.
    pub fn generate() -> Self {
        Self(random_token(Self::PREFIX))
    }
}

impl EventId {
    pub const PREFIX: &'static str = "event";

    /// Generate a fresh `event-<32 hex>` identifier.
    pub fn generate() -> Self {
        Self(random_token(Self::PREFIX))
    }
}
