//! Single-flight registry
//!
//! Concurrent reads for the same key attach to one pending fetch instead of
//! each hitting the network. The registry only keeps weak handles: when every
//! waiter has gone away the fetch future is dropped, which aborts the request.

use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use futures::future::{BoxFuture, FutureExt, Shared, WeakShared};
use parking_lot::Mutex;

/// Pending fetch that several callers can await
pub type SharedFetch<T> = Shared<BoxFuture<'static, T>>;

struct Slot<T> {
    id: u64,
    fetch: WeakShared<BoxFuture<'static, T>>,
}

/// Per-key registry of pending fetches
pub struct InFlight<T> {
    slots: Arc<Mutex<HashMap<String, Slot<T>>>>,
    next_id: Arc<AtomicU64>,
}

impl<T> Clone for InFlight<T> {
    fn clone(&self) -> Self {
        Self {
            slots: Arc::clone(&self.slots),
            next_id: Arc::clone(&self.next_id),
        }
    }
}

impl<T> Default for InFlight<T> {
    fn default() -> Self {
        Self {
            slots: Arc::new(Mutex::new(HashMap::new())),
            next_id: Arc::new(AtomicU64::new(0)),
        }
    }
}

impl<T> fmt::Debug for InFlight<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InFlight")
            .field("slots", &self.slots.lock().len())
            .finish()
    }
}

impl<T> InFlight<T>
where
    T: Clone + Send + Sync + 'static,
{
    pub fn new() -> Self {
        Self::default()
    }

    /// Attaches to the pending fetch for `key`, or starts one with `start`.
    ///
    /// Returns the shared fetch and whether it was joined rather than started.
    /// `start` is only called when no live fetch exists for the key.
    pub fn join_or_start<F>(&self, key: &str, start: F) -> (SharedFetch<T>, bool)
    where
        F: FnOnce() -> BoxFuture<'static, T>,
    {
        let mut slots = self.slots.lock();

        if let Some(fetch) = slots.get(key).and_then(|slot| slot.fetch.upgrade()) {
            return (fetch, true);
        }

        // Abandoned fetches leave dead weak handles behind
        slots.retain(|_, slot| slot.fetch.upgrade().is_some());

        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let registry = Arc::clone(&self.slots);
        let owned_key = key.to_string();
        let inner = start();

        let fetch = async move {
            let output = inner.await;
            let mut slots = registry.lock();
            if slots.get(&owned_key).is_some_and(|slot| slot.id == id) {
                slots.remove(&owned_key);
            }
            output
        }
        .boxed()
        .shared();

        if let Some(weak) = fetch.downgrade() {
            slots.insert(key.to_string(), Slot { id, fetch: weak });
        }

        (fetch, false)
    }

    /// Number of fetches that still have at least one waiter.
    pub fn pending(&self) -> usize {
        self.slots
            .lock()
            .values()
            .filter(|slot| slot.fetch.upgrade().is_some())
            .count()
    }
}
