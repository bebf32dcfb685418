//! Read results tagged with where they came from
//!
//! Lets consumers tell a cached value from a live one.

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Source of a read result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "source", rename_all = "snake_case")]
pub enum Origin {
    /// Fetched over the network by this call
    Network,
    /// Served from the response cache
    Cache {
        /// When the cached payload was stored
        cached_at: DateTime<Utc>,
    },
}

/// A read result and its origin
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Fetched<T> {
    pub value: T,
    pub origin: Origin,
}

impl<T> Fetched<T> {
    pub fn network(value: T) -> Self {
        Self {
            value,
            origin: Origin::Network,
        }
    }

    pub fn cached(value: T, cached_at: DateTime<Utc>) -> Self {
        Self {
            value,
            origin: Origin::Cache { cached_at },
        }
    }

    pub fn is_cached(&self) -> bool {
        matches!(self.origin, Origin::Cache { .. })
    }

    pub fn into_value(self) -> T {
        self.value
    }
}
