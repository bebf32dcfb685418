//! Cache Module
//!
//! Provides the in-memory response cache used by the read path: canonical
//! keys, timestamped entries and prefix invalidation.

mod entry;
mod key;
mod stats;
mod store;


// Re-export public types
pub use entry::CacheEntry;
pub use key::{canonical_json, CacheKey, KEY_SEPARATOR};
pub use stats::CacheStats;
pub use store::CacheStore;
