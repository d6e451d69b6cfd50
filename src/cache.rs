//! Memoization of catalog operations keyed by their primitive arguments.

use std::{
    num::NonZeroUsize,
    sync::{Mutex, MutexGuard},
    time::{Duration, Instant},
};

use lru::LruCache;
use serde::Deserialize;

/// A single memoizable argument. Only primitives cross the cache boundary.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CacheArg {
    Str(String),
    Bool(bool),
}

impl From<&str> for CacheArg {
    fn from(value: &str) -> Self {
        CacheArg::Str(value.to_string())
    }
}

impl From<String> for CacheArg {
    fn from(value: String) -> Self {
        CacheArg::Str(value)
    }
}

impl From<bool> for CacheArg {
    fn from(value: bool) -> Self {
        CacheArg::Bool(value)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub operation: &'static str,
    pub args: Vec<CacheArg>,
}

impl CacheKey {
    pub fn new(operation: &'static str, args: impl IntoIterator<Item = CacheArg>) -> Self {
        Self {
            operation,
            args: args.into_iter().collect(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EvictionPolicy {
    /// reads refresh an entry, the least recently used one is evicted
    #[default]
    Lru,
    /// reads leave order untouched, the oldest insert is evicted
    Fifo,
}

struct Entry<V> {
    value: V,
    inserted_at: Instant,
}

/// Bounded, thread-safe cache for the results of one operation.
pub struct MemoCache<V> {
    operation: &'static str,
    entries: Mutex<LruCache<CacheKey, Entry<V>>>,
    policy: EvictionPolicy,
    ttl: Option<Duration>,
}

impl<V: Clone> MemoCache<V> {
    /// `capacity` of zero is bumped to one.
    pub fn new(
        operation: &'static str,
        capacity: usize,
        policy: EvictionPolicy,
        ttl: Option<Duration>,
    ) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            operation,
            entries: Mutex::new(LruCache::new(capacity)),
            policy,
            ttl,
        }
    }

    pub fn key(&self, args: impl IntoIterator<Item = CacheArg>) -> CacheKey {
        CacheKey::new(self.operation, args)
    }

    /// A panic while the lock was held leaves the cache usable: the entries
    /// are only ever replaced whole, so the poisoned state is recovered.
    fn lock(&self) -> MutexGuard<'_, LruCache<CacheKey, Entry<V>>> {
        self.entries.lock().unwrap_or_else(|poisoned| {
            log::warn!("{} cache lock poisoned, recovering", self.operation);
            self.entries.clear_poison();
            poisoned.into_inner()
        })
    }

    pub fn get(&self, key: &CacheKey) -> Option<V> {
        let mut entries = self.lock();
        let entry = match self.policy {
            EvictionPolicy::Lru => entries.get(key),
            EvictionPolicy::Fifo => entries.peek(key),
        }?;
        if self.ttl.is_some_and(|ttl| entry.inserted_at.elapsed() >= ttl) {
            entries.pop(key);
            return None;
        }
        Some(entry.value.clone())
    }

    pub fn put(&self, key: CacheKey, value: V) {
        self.lock().put(
            key,
            Entry {
                value,
                inserted_at: Instant::now(),
            },
        );
    }

    /// Returns the cached value for `key`, or runs `compute` and stores its
    /// `Ok` result. Errors are passed through and never stored.
    ///
    /// The lock is released while `compute` runs, so two racing callers may
    /// both compute; the later insert wins.
    pub fn get_or_try_insert<E>(
        &self,
        key: CacheKey,
        compute: impl FnOnce() -> Result<V, E>,
    ) -> Result<V, E> {
        self.get_or_try_insert_if(key, || compute().map(|value| (value, true)))
    }

    /// Like [`MemoCache::get_or_try_insert`], but `compute` also reports
    /// whether its value is complete. Incomplete values are returned without
    /// being stored.
    pub fn get_or_try_insert_if<E>(
        &self,
        key: CacheKey,
        compute: impl FnOnce() -> Result<(V, bool), E>,
    ) -> Result<V, E> {
        if let Some(value) = self.get(&key) {
            log::debug!("cache hit: {} {:?}", self.operation, key.args);
            return Ok(value);
        }
        let (value, complete) = compute()?;
        if complete {
            self.put(key, value.clone());
        } else {
            log::debug!("not caching partial {} {:?}", self.operation, key.args);
        }
        Ok(value)
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
