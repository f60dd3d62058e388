//! Typed Cache Module
//!
//! A call-site view over a shared [`MemoizingCache`] with a fixed base key,
//! TTL and value type.

use std::any::Any;
use std::fmt;
use std::future::Future;
use std::marker::PhantomData;
use std::sync::Arc;

use crate::cache::{CacheKeyParameter, MemoizingCache};

// == Typed Cache ==
/// Memoizes values of one type `T` under one base key.
///
/// # Example
/// ```
/// use std::sync::Arc;
/// use memocache::cache::{CacheKeyParameter, MemoizingCache, TypedCache};
///
/// let shared = Arc::new(MemoizingCache::new());
/// let squares: TypedCache<u64> = TypedCache::new(shared, "square", 5);
///
/// let nine = squares.get_or_compute(|| 3 * 3, &[CacheKeyParameter::new("n", 3)]);
/// assert_eq!(nine, 9);
/// assert!(squares.exists(&[CacheKeyParameter::new("n", 3)]));
/// ```
pub struct TypedCache<T> {
    cache: Arc<MemoizingCache>,
    base_key: String,
    ttl_minutes: u32,
    _marker: PhantomData<fn() -> T>,
}

impl<T> TypedCache<T>
where
    T: Any + Clone + Send + Sync,
{
    /// Binds `base_key` and `ttl_minutes` on top of `cache`.
    pub fn new(cache: Arc<MemoizingCache>, base_key: impl Into<String>, ttl_minutes: u32) -> Self {
        Self {
            cache,
            base_key: base_key.into(),
            ttl_minutes,
            _marker: PhantomData,
        }
    }

    /// The base key every lookup starts from.
    pub fn base_key(&self) -> &str {
        &self.base_key
    }

    /// TTL applied to newly computed values.
    pub fn ttl_minutes(&self) -> u32 {
        self.ttl_minutes
    }

    /// Returns the cached value for `parameters`, or computes and stores it.
    pub fn get_or_compute<F>(&self, produce: F, parameters: &[CacheKeyParameter]) -> T
    where
        F: FnOnce() -> T,
    {
        self.cache
            .get_or_compute(produce, self.ttl_minutes, &self.base_key, parameters)
    }

    /// Fallible form of [`get_or_compute`](Self::get_or_compute); errors are not cached.
    pub fn try_get_or_compute<E, F>(
        &self,
        produce: F,
        parameters: &[CacheKeyParameter],
    ) -> Result<T, E>
    where
        F: FnOnce() -> Result<T, E>,
    {
        self.cache
            .try_get_or_compute(produce, self.ttl_minutes, &self.base_key, parameters)
    }

    /// Asynchronous form of [`get_or_compute`](Self::get_or_compute).
    pub async fn get_or_compute_async<F, Fut>(
        &self,
        produce: F,
        parameters: &[CacheKeyParameter],
    ) -> T
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = T>,
    {
        self.cache
            .get_or_compute_async(produce, self.ttl_minutes, &self.base_key, parameters)
            .await
    }

    /// Fallible form of [`get_or_compute_async`](Self::get_or_compute_async).
    pub async fn try_get_or_compute_async<E, F, Fut>(
        &self,
        produce: F,
        parameters: &[CacheKeyParameter],
    ) -> Result<T, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        self.cache
            .try_get_or_compute_async(produce, self.ttl_minutes, &self.base_key, parameters)
            .await
    }

    /// Returns true if a live entry is stored for `parameters`.
    pub fn exists(&self, parameters: &[CacheKeyParameter]) -> bool {
        self.cache.exists(&self.base_key, parameters)
    }

    /// Deletes the entry for `parameters`, if any.
    pub fn remove(&self, parameters: &[CacheKeyParameter]) {
        self.cache.remove(&self.base_key, parameters)
    }
}

impl<T> Clone for TypedCache<T> {
    fn clone(&self) -> Self {
        Self {
            cache: self.cache.clone(),
            base_key: self.base_key.clone(),
            ttl_minutes: self.ttl_minutes,
            _marker: PhantomData,
        }
    }
}

impl<T> fmt::Debug for TypedCache<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypedCache")
            .field("base_key", &self.base_key)
            .field("ttl_minutes", &self.ttl_minutes)
            .field("value_type", &std::any::type_name::<T>())
            .finish()
    }
}
