//! Expiring key-value cache.
//!
//! Expiry is checked lazily on read: an entry is a hit iff the clock is
//! strictly before its deadline. Nothing sweeps in the background, so
//! [`TtlCache::entry_count`] includes entries that have expired but not
//! yet been overwritten or invalidated.
//!
//! Every invalidation bumps a generation counter. A value computed across
//! an `.await` is stored with [`TtlCache::put_if_current`] against the
//! generation read before the computation started, so an invalidation that
//! lands mid-computation is never undone by the late write.

use std::collections::HashMap;
use std::future::Future;
use std::hash::Hash;
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::RwLock;

use crate::clock::{Clock, SystemClock};

/// Lifetime of a cached entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ttl {
    /// Expires after the given duration.
    For(Duration),
    /// Lives until explicitly invalidated.
    Never,
}

#[derive(Debug, Clone)]
struct Entry<V> {
    value: V,
    expires_at: Option<Instant>,
}

#[derive(Debug)]
struct Inner<K, V> {
    entries: HashMap<K, Entry<V>>,
    generation: u64,
}

/// Concurrent map with per-entry expiry.
///
/// Reads take a shared lock. Writes and invalidations take an exclusive
/// lock that is never held across an `.await`.
pub struct TtlCache<K, V> {
    inner: RwLock<Inner<K, V>>,
    clock: Arc<dyn Clock>,
}

impl<K, V> TtlCache<K, V>
where
    K: Eq + Hash,
    V: Clone,
{
    #[must_use]
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    #[must_use]
    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            inner: RwLock::new(Inner {
                entries: HashMap::new(),
                generation: 0,
            }),
            clock,
        }
    }

    /// Return the live value for `key`, if any.
    #[must_use]
    pub fn get(&self, key: &K) -> Option<V> {
        let now = self.clock.now();
        let inner = self.inner.read();
        inner
            .entries
            .get(key)
            .filter(|entry| entry.expires_at.is_none_or(|deadline| now < deadline))
            .map(|entry| entry.value.clone())
    }

    /// Insert or replace `key`.
    pub fn put(&self, key: K, value: V, ttl: Ttl) {
        let entry = self.entry(value, ttl);
        self.inner.write().entries.insert(key, entry);
    }

    /// Current invalidation generation. Read it before computing a value
    /// that will be stored with [`TtlCache::put_if_current`].
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.inner.read().generation
    }

    /// Insert `key` only if no invalidation happened since `generation`
    /// was read. Returns whether the value was stored.
    pub fn put_if_current(&self, key: K, value: V, ttl: Ttl, generation: u64) -> bool {
        let entry = self.entry(value, ttl);
        let mut inner = self.inner.write();
        if inner.generation != generation {
            return false;
        }
        inner.entries.insert(key, entry);
        true
    }

    pub fn invalidate(&self, key: &K) {
        let mut inner = self.inner.write();
        inner.entries.remove(key);
        inner.generation += 1;
    }

    pub fn invalidate_all(&self) {
        let mut inner = self.inner.write();
        inner.entries.clear();
        inner.generation += 1;
    }

    /// Drop every entry whose key matches `predicate`.
    pub fn invalidate_where(&self, predicate: impl Fn(&K) -> bool) {
        let mut inner = self.inner.write();
        inner.entries.retain(|key, _| !predicate(key));
        inner.generation += 1;
    }

    #[must_use]
    pub fn entry_count(&self) -> usize {
        self.inner.read().entries.len()
    }

    fn entry(&self, value: V, ttl: Ttl) -> Entry<V> {
        let expires_at = match ttl {
            Ttl::For(duration) => Some(self.clock.now() + duration),
            Ttl::Never => None,
        };
        Entry { value, expires_at }
    }

    /// Return the cached value, or compute and store it.
    ///
    /// The lock is released while `compute` runs. Only `Ok` values are
    /// stored, and only when no invalidation ran in the meantime; if the
    /// future is dropped before completing nothing is written.
    ///
    /// # Errors
    ///
    /// Propagates the error returned by `compute`.
    pub async fn get_or_try_insert_with<F, Fut, E>(
        &self,
        key: K,
        ttl: Ttl,
        compute: F,
    ) -> Result<V, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, E>>,
    {
        if let Some(hit) = self.get(&key) {
            return Ok(hit);
        }
        let generation = self.generation();
        let value = compute().await?;
        self.put_if_current(key, value.clone(), ttl, generation);
        Ok(value)
    }
}

impl<K, V> Default for TtlCache<K, V>
where
    K: Eq + Hash,
    V: Clone,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> std::fmt::Debug for TtlCache<K, V>
where
    K: Eq + Hash,
    V: Clone,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TtlCache")
            .field("entries", &self.entry_count())
            .finish_non_exhaustive()
    }
}
