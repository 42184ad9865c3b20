//! Single-flight cache with evict-on-failure
//!
//! For a given key at most one fetch is in flight. Callers arriving while it
//! is pending join it and observe the same outcome. Successful results are
//! kept until invalidated; failures are evicted before being returned so the
//! next call starts a fresh fetch.

use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use futures_util::future::{BoxFuture, FutureExt, Shared};
use tracing::{debug, warn};

use crate::RegistryResult;

type SharedFetch<V> = Shared<BoxFuture<'static, RegistryResult<V>>>;

/// Pending or completed fetch for one key
struct Slot<V> {
    /// Distinguishes a slot from a later one under the same key
    id: u64,
    fetch: SharedFetch<V>,
}

/// Keyed in-flight registry and result cache
pub struct SingleFlight<V> {
    /// Name used in log events
    name: &'static str,
    slots: DashMap<String, Slot<V>>,
    next_id: AtomicU64,
}

impl<V> SingleFlight<V>
where
    V: Clone + Send + Sync + 'static,
{
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            slots: DashMap::new(),
            next_id: AtomicU64::new(0),
        }
    }

    /// Return the cached result for `key`, join the fetch in flight, or
    /// start one with `fetch`.
    ///
    /// `fetch` runs while the key's shard is locked: it must only build the
    /// future, never touch this cache.
    pub async fn get_or_fetch<F, Fut>(&self, key: &str, fetch: F) -> RegistryResult<V>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = RegistryResult<V>> + Send + 'static,
    {
        let (id, shared) = self.slot_for(key, fetch);
        let result = shared.await;

        if result.is_err() && self.slots.remove_if(key, |_, slot| slot.id == id).is_some() {
            warn!(cache = self.name, key, "evicted failed fetch");
        }
        result
    }

    fn slot_for<F, Fut>(&self, key: &str, fetch: F) -> (u64, SharedFetch<V>)
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = RegistryResult<V>> + Send + 'static,
    {
        match self.slots.entry(key.to_string()) {
            Entry::Occupied(slot) => {
                debug!(cache = self.name, key, "joining cached or in-flight fetch");
                (slot.get().id, slot.get().fetch.clone())
            },
            Entry::Vacant(vacant) => {
                let id = self.next_id.fetch_add(1, Ordering::Relaxed);
                let shared = fetch().boxed().shared();
                vacant.insert(Slot {
                    id,
                    fetch: shared.clone(),
                });
                debug!(cache = self.name, key, "started fetch");
                (id, shared)
            },
        }
    }

    /// Completed successful value for `key`, without fetching
    pub fn peek(&self, key: &str) -> Option<V> {
        let slot = self.slots.get(key)?;
        match slot.fetch.peek() {
            Some(Ok(value)) => Some(value.clone()),
            _ => None,
        }
    }

    /// Check if `key` has a pending or completed fetch
    pub fn contains(&self, key: &str) -> bool {
        self.slots.contains_key(key)
    }

    /// Forget `key`; a fetch already in flight still completes for its waiters
    pub fn invalidate(&self, key: &str) -> bool {
        self.slots.remove(key).is_some()
    }

    /// Forget every key
    pub fn clear(&self) {
        self.slots.clear();
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

impl<V> std::fmt::Debug for SingleFlight<V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SingleFlight")
            .field("name", &self.name)
            .field("keys", &self.slots.len())
            .finish()
    }
}
