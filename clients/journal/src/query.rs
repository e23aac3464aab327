//! Query Cache
//!
//! An explicit key -> result map with manual invalidation. A value is served
//! from the cache until its key is invalidated; the next fetch for a missing
//! or stale key runs the loader and stores the result.
//!
//! Locks are never held across the loader's `.await`, so two concurrent
//! fetches of the same stale key both load and the later write wins.

use crate::error::JournalResult;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::future::Future;
use std::hash::Hash;
use tracing::debug;

/// One cached query result.
#[derive(Debug)]
struct Slot<V> {
    value: Option<V>,
    stale: bool,
    invalidations: u64,
    loads: u64,
}

impl<V> Default for Slot<V> {
    fn default() -> Self {
        Self {
            value: None,
            stale: false,
            invalidations: 0,
            loads: 0,
        }
    }
}

/// Cache of query results keyed by `K`.
#[derive(Debug)]
pub struct QueryCache<K, V> {
    name: &'static str,
    slots: Mutex<HashMap<K, Slot<V>>>,
}

impl<K, V> QueryCache<K, V>
where
    K: Eq + Hash + Clone + std::fmt::Debug,
    V: Clone,
{
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            slots: Mutex::new(HashMap::new()),
        }
    }

    /// Cached value for `key` if present and fresh, else the loader's result.
    ///
    /// A failed load leaves the previous value (if any) in place and still
    /// marked stale.
    pub async fn fetch_with<F, Fut>(&self, key: K, loader: F) -> JournalResult<V>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = JournalResult<V>>,
    {
        if let Some(value) = self.fresh(&key) {
            debug!(query = self.name, ?key, "cache hit");
            return Ok(value);
        }

        debug!(query = self.name, ?key, "loading");
        let value = loader().await?;

        let mut slots = self.slots.lock();
        let slot = slots.entry(key).or_default();
        slot.value = Some(value.clone());
        slot.stale = false;
        slot.loads += 1;
        Ok(value)
    }

    /// Last stored value, fresh or stale.
    pub fn peek(&self, key: &K) -> Option<V> {
        self.slots.lock().get(key).and_then(|slot| slot.value.clone())
    }

    /// Mark `key` for refetch. Returns whether a value was cached.
    pub fn invalidate(&self, key: &K) -> bool {
        let mut slots = self.slots.lock();
        let slot = slots.entry(key.clone()).or_default();
        slot.stale = true;
        slot.invalidations += 1;
        slot.value.is_some()
    }

    /// Mark every key for refetch.
    pub fn invalidate_all(&self) {
        for slot in self.slots.lock().values_mut() {
            slot.stale = true;
            slot.invalidations += 1;
        }
    }

    /// How many times `key` has been marked for refetch.
    pub fn invalidations(&self, key: &K) -> u64 {
        self.slots.lock().get(key).map_or(0, |slot| slot.invalidations)
    }

    /// How many times the loader ran for `key`.
    pub fn loads(&self, key: &K) -> u64 {
        self.slots.lock().get(key).map_or(0, |slot| slot.loads)
    }

    /// Whether `key` is missing or marked for refetch.
    pub fn is_stale(&self, key: &K) -> bool {
        self.slots
            .lock()
            .get(key)
            .map_or(true, |slot| slot.stale || slot.value.is_none())
    }

    fn fresh(&self, key: &K) -> Option<V> {
        self.slots
            .lock()
            .get(key)
            .filter(|slot| !slot.stale)
            .and_then(|slot| slot.value.clone())
    }
}
