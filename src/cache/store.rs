//! Memoizing Cache Module
//!
//! Main cache engine: get-or-compute on top of a concurrent map, with lazy
//! TTL expiry and per-key exclusion around producer runs.

use std::any::Any;
use std::convert::Infallible;
use std::future::Future;
use std::sync::Arc;

use chrono::Duration;
use dashmap::DashMap;
use tracing::{debug, warn};

use crate::cache::gate::KeyGates;
use crate::cache::stats::StatsRecorder;
use crate::cache::{compose_key, CacheEntry, CacheKeyParameter, CacheStats, Clock, SystemClock};

// == Memoizing Cache ==
/// In-memory memoization layer keyed by composite keys.
///
/// Values of any `Clone + Send + Sync + 'static` type can be stored side by
/// side. A call site must use one value type per composite key; a lookup
/// with a different type is treated as a miss and the entry is replaced.
/// [`TypedCache`](crate::cache::TypedCache) pins the type per call site.
///
/// A cached `None` is a value like any other: once an `Option<T>` producer
/// returns `None`, later lookups hit and `exists` reports the key.
///
/// # Example
/// ```
/// use memocache::cache::{CacheKeyParameter, MemoizingCache};
///
/// let cache = MemoizingCache::new();
/// let name = cache.get_or_compute(
///     || "Ada".to_string(),
///     10,
///     "user_name",
///     &[CacheKeyParameter::new("id", 7)],
/// );
/// assert_eq!(name, "Ada");
/// assert!(cache.exists("user_name", &[CacheKeyParameter::new("id", 7)]));
/// ```
#[derive(Debug)]
pub struct MemoizingCache {
    /// Composite key to entry
    entries: DashMap<String, CacheEntry>,
    /// Exclusion gates for keys under computation
    gates: KeyGates,
    /// Time source for expiry
    clock: Arc<dyn Clock>,
    /// Performance statistics
    stats: StatsRecorder,
}

impl MemoizingCache {
    // == Constructor ==
    /// Creates an empty cache driven by the system clock.
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    /// Creates an empty cache driven by `clock`.
    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: DashMap::new(),
            gates: KeyGates::new(),
            clock,
            stats: StatsRecorder::default(),
        }
    }

    // == Get Or Compute (sync) ==
    /// Returns the cached value for the key, or runs `produce` and caches it
    /// for `ttl_minutes`.
    ///
    /// A `ttl_minutes` of zero disables caching for the call: the producer
    /// runs and its value is returned without being stored.
    ///
    /// # Panics
    /// Blocks while another caller computes the same key. On a multi-thread
    /// runtime the wait goes through `block_in_place`; on a current-thread
    /// runtime a contended wait panics. Prefer
    /// [`get_or_compute_async`](Self::get_or_compute_async) in async code.
    pub fn get_or_compute<T, F>(
        &self,
        produce: F,
        ttl_minutes: u32,
        base_key: &str,
        parameters: &[CacheKeyParameter],
    ) -> T
    where
        T: Any + Clone + Send + Sync,
        F: FnOnce() -> T,
    {
        match self.try_get_or_compute(
            || Ok::<T, Infallible>(produce()),
            ttl_minutes,
            base_key,
            parameters,
        ) {
            Ok(value) => value,
            Err(never) => match never {},
        }
    }

    /// Fallible form of [`get_or_compute`](Self::get_or_compute).
    ///
    /// A producer error is returned unchanged and nothing is stored, so the
    /// next call runs the producer again.
    pub fn try_get_or_compute<T, E, F>(
        &self,
        produce: F,
        ttl_minutes: u32,
        base_key: &str,
        parameters: &[CacheKeyParameter],
    ) -> Result<T, E>
    where
        T: Any + Clone + Send + Sync,
        F: FnOnce() -> Result<T, E>,
    {
        let key = compose_key(base_key, parameters);
        if let Some(value) = self.cached(&key) {
            return Ok(value);
        }

        let _lease = self.gates.acquire_blocking(&key);
        if let Some(value) = self.cached(&key) {
            return Ok(value);
        }

        self.stats.record_miss();
        debug!(key = %key, "Cache miss, running producer");
        match produce() {
            Ok(value) => {
                self.store(key, value.clone(), ttl_minutes);
                Ok(value)
            }
            Err(err) => {
                self.stats.record_failure();
                debug!(key = %key, "Producer failed, nothing cached");
                Err(err)
            }
        }
    }

    // == Get Or Compute (async) ==
    /// Asynchronous form of [`get_or_compute`](Self::get_or_compute).
    ///
    /// Concurrent callers on the same key wait for the first one instead of
    /// running `produce` again. Dropping the returned future leaves the cache
    /// untouched and lets a waiting caller take over.
    pub async fn get_or_compute_async<T, F, Fut>(
        &self,
        produce: F,
        ttl_minutes: u32,
        base_key: &str,
        parameters: &[CacheKeyParameter],
    ) -> T
    where
        T: Any + Clone + Send + Sync,
        F: FnOnce() -> Fut,
        Fut: Future<Output = T>,
    {
        let result = self
            .try_get_or_compute_async(
                move || async move { Ok::<T, Infallible>(produce().await) },
                ttl_minutes,
                base_key,
                parameters,
            )
            .await;
        match result {
            Ok(value) => value,
            Err(never) => match never {},
        }
    }

    /// Fallible form of [`get_or_compute_async`](Self::get_or_compute_async).
    pub async fn try_get_or_compute_async<T, E, F, Fut>(
        &self,
        produce: F,
        ttl_minutes: u32,
        base_key: &str,
        parameters: &[CacheKeyParameter],
    ) -> Result<T, E>
    where
        T: Any + Clone + Send + Sync,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let key = compose_key(base_key, parameters);
        if let Some(value) = self.cached(&key) {
            return Ok(value);
        }

        let _lease = self.gates.acquire(&key).await;
        if let Some(value) = self.cached(&key) {
            return Ok(value);
        }

        self.stats.record_miss();
        debug!(key = %key, "Cache miss, awaiting producer");
        match produce().await {
            Ok(value) => {
                self.store(key, value.clone(), ttl_minutes);
                Ok(value)
            }
            Err(err) => {
                self.stats.record_failure();
                debug!(key = %key, "Producer failed, nothing cached");
                Err(err)
            }
        }
    }

    // == Exists ==
    /// Returns true if a live entry is stored for the key.
    ///
    /// Does not run any producer, touch the entry's TTL or count as a lookup.
    pub fn exists(&self, base_key: &str, parameters: &[CacheKeyParameter]) -> bool {
        let key = compose_key(base_key, parameters);
        let now = self.clock.now();
        self.entries
            .get(&key)
            .is_some_and(|entry| !entry.is_expired(now))
    }

    // == Remove ==
    /// Deletes the entry for the key regardless of its remaining TTL.
    ///
    /// Removing an absent key is a no-op.
    pub fn remove(&self, base_key: &str, parameters: &[CacheKeyParameter]) {
        let key = compose_key(base_key, parameters);
        if self.entries.remove(&key).is_some() {
            debug!(key = %key, "Removed cache entry");
        }
    }

    // == Time To Live ==
    /// Returns the remaining lifetime of a live entry.
    pub fn ttl_remaining(
        &self,
        base_key: &str,
        parameters: &[CacheKeyParameter],
    ) -> Option<Duration> {
        let key = compose_key(base_key, parameters);
        let now = self.clock.now();
        self.entries
            .get(&key)
            .filter(|entry| !entry.is_expired(now))
            .map(|entry| entry.ttl_remaining(now))
    }

    // == Purge Expired ==
    /// Removes all expired entries from the cache.
    ///
    /// Returns the number of entries removed.
    pub fn purge_expired(&self) -> usize {
        let now = self.clock.now();
        let expired_keys: Vec<String> = self
            .entries
            .iter()
            .filter(|entry| entry.value().is_expired(now))
            .map(|entry| entry.key().clone())
            .collect();

        let mut count = 0;
        for key in expired_keys {
            // Re-checked under the shard lock: the key may have been refilled.
            if self
                .entries
                .remove_if(&key, |_, entry| entry.is_expired(now))
                .is_some()
            {
                count += 1;
            }
        }

        self.stats.record_reclaimed(count);
        count
    }

    // == Clear ==
    /// Drops every entry.
    pub fn clear(&self) {
        self.entries.clear();
    }

    // == Stats ==
    /// Returns current cache statistics.
    pub fn stats(&self) -> CacheStats {
        self.stats.snapshot(self.entries.len())
    }

    // == Length ==
    /// Returns the number of stored entries, expired ones included until reclaimed.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    // == Is Empty ==
    /// Returns true if the cache holds no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns a clone of the live `T` stored under `key`, recording a hit.
    fn cached<T: Any + Clone>(&self, key: &str) -> Option<T> {
        let now = self.clock.now();
        let entry = self.entries.get(key)?;
        if entry.is_expired(now) {
            return None;
        }

        match entry.value_as::<T>() {
            Some(value) => {
                self.stats.record_hit();
                debug!(key = %key, "Cache hit");
                Some(value)
            }
            None => {
                warn!(
                    key = %key,
                    expected = std::any::type_name::<T>(),
                    "Cached value has a different type, recomputing"
                );
                None
            }
        }
    }

    /// Stores a freshly produced value; the entry is written in one insert.
    fn store<T: Any + Send + Sync>(&self, key: String, value: T, ttl_minutes: u32) {
        if ttl_minutes == 0 {
            debug!(key = %key, "TTL of zero, value not cached");
            return;
        }

        self.stats.record_computation();
        let entry = CacheEntry::new(value, self.clock.now(), ttl_minutes);
        self.entries.insert(key, entry);
    }
}

impl Default for MemoizingCache {
    fn default() -> Self {
        Self::new()
    }
}
