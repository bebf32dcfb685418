//! Cache Entry Module
//!
//! Defines the timestamped payload stored for each cache key.

use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use serde_json::Value;

// == Cache Entry ==
/// A decoded response payload and the moment it was stored.
///
/// Entries carry no TTL of their own: freshness is decided per read by the
/// caller's TTL, so the same entry may be fresh for one call and stale for
/// another.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    /// The stored payload
    pub payload: Value,
    /// Monotonic storage time, used for freshness checks
    pub stored_at: Instant,
    /// Wall-clock storage time, reported to callers
    pub cached_at: DateTime<Utc>,
}

impl CacheEntry {
    // == Constructor ==
    /// Creates a new cache entry stamped with the current time.
    pub fn new(payload: Value) -> Self {
        Self {
            payload,
            stored_at: Instant::now(),
            cached_at: Utc::now(),
        }
    }

    // == Age ==
    /// Returns how long ago the entry was stored.
    pub fn age(&self) -> Duration {
        self.stored_at.elapsed()
    }

    // == Is Fresh ==
    /// Checks whether the entry is still usable under the given TTL.
    ///
    /// Boundary condition: an entry whose age equals the TTL is stale.
    pub fn is_fresh(&self, ttl: Duration) -> bool {
        self.is_fresh_at(ttl, Instant::now())
    }

    /// Freshness check against an explicit clock reading.
    pub fn is_fresh_at(&self, ttl: Duration, now: Instant) -> bool {
        now.saturating_duration_since(self.stored_at) < ttl
    }
}
