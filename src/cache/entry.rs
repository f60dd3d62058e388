//! Cache Entry Module
//!
//! Defines the structure for individual memoized values with TTL support.

use std::any::Any;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};

/// Type-erased value held by the cache.
pub type StoredValue = Arc<dyn Any + Send + Sync>;

// == Cache Entry ==
/// A memoized value together with its lifetime.
#[derive(Clone)]
pub struct CacheEntry {
    /// The stored value
    value: StoredValue,
    /// Insertion time
    pub created_at: DateTime<Utc>,
    /// Instant from which the entry is treated as absent
    pub expires_at: DateTime<Utc>,
}

impl CacheEntry {
    // == Constructor ==
    /// Creates a new entry expiring `ttl_minutes` after `now`.
    pub fn new<T: Any + Send + Sync>(value: T, now: DateTime<Utc>, ttl_minutes: u32) -> Self {
        Self {
            value: Arc::new(value),
            created_at: now,
            expires_at: now + Duration::minutes(i64::from(ttl_minutes)),
        }
    }

    // == Is Expired ==
    /// Checks if the entry has expired at `now`.
    ///
    /// Boundary condition: an entry is expired once `now >= expires_at`, so
    /// it is already absent at the exact instant its TTL runs out.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }

    // == Downcast ==
    /// Returns a clone of the value if it was stored as a `T`.
    pub fn value_as<T: Any + Clone>(&self) -> Option<T> {
        self.value.downcast_ref::<T>().cloned()
    }

    // == Time To Live ==
    /// Returns the remaining lifetime at `now`, zero once expired.
    pub fn ttl_remaining(&self, now: DateTime<Utc>) -> Duration {
        if self.expires_at > now {
            self.expires_at - now
        } else {
            Duration::zero()
        }
    }
}

impl std::fmt::Debug for CacheEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CacheEntry")
            .field("created_at", &self.created_at)
            .field("expires_at", &self.expires_at)
            .finish_non_exhaustive()
    }
}
