//! Resolution cache for resolved callables
//!
//! Bounded LRU map from `(owner, signature)` to the callable it resolved to.
//! Entries are only ever dropped by capacity eviction.

use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicU64, Ordering};

use callgate_sdk::ResolvedCallable;
use lru::LruCache;
use parking_lot::Mutex;

/// Cache key: owner type name and method signature
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CallableKey {
    /// Qualified owner type name
    pub owner: String,
    /// Method signature, e.g. `square(I)I`
    pub signature: String,
}

impl CallableKey {
    /// Create a key
    pub fn new(owner: impl Into<String>, signature: impl Into<String>) -> Self {
        CallableKey {
            owner: owner.into(),
            signature: signature.into(),
        }
    }
}

/// Hit/miss/eviction counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Lookups answered from the cache
    pub hits: u64,
    /// Lookups that had to compute a value
    pub misses: u64,
    /// Entries dropped to stay within capacity
    pub evictions: u64,
}

/// Thread-safe, bounded cache of resolved callables
pub struct ResolutionCache {
    entries: Mutex<LruCache<CallableKey, ResolvedCallable>>,
    hits: AtomicU64,
    misses: AtomicU64,
    evictions: AtomicU64,
}

impl ResolutionCache {
    /// Create a cache holding at most `capacity` entries
    pub fn new(capacity: NonZeroUsize) -> Self {
        ResolutionCache {
            entries: Mutex::new(LruCache::new(capacity)),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            evictions: AtomicU64::new(0),
        }
    }

    /// Look up a key, marking it most recently used
    pub fn get(&self, key: &CallableKey) -> Option<ResolvedCallable> {
        self.entries.lock().get(key).cloned()
    }

    /// Look up a key without touching its recency
    pub fn peek(&self, key: &CallableKey) -> Option<ResolvedCallable> {
        self.entries.lock().peek(key).cloned()
    }

    /// Return the cached callable for `key`, computing it on a miss.
    ///
    /// `compute` runs without the cache lock held, so a slow computation
    /// never blocks lookups of other keys. If another thread stored the same
    /// key in the meantime, that value is kept and returned; at most one
    /// value per key is ever retained. Errors are returned and not cached.
    pub fn get_or_try_insert_with<E>(
        &self,
        key: CallableKey,
        compute: impl FnOnce() -> Result<ResolvedCallable, E>,
    ) -> Result<ResolvedCallable, E> {
        if let Some(hit) = self.get(&key) {
            self.hits.fetch_add(1, Ordering::Relaxed);
            tracing::trace!(owner = %key.owner, signature = %key.signature, "resolution cache hit");
            return Ok(hit);
        }

        self.misses.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(owner = %key.owner, signature = %key.signature, "resolution cache miss");
        let computed = compute()?;

        let mut entries = self.entries.lock();
        if let Some(existing) = entries.get(&key) {
            return Ok(existing.clone());
        }
        if let Some((evicted, _)) = entries.push(key, computed.clone()) {
            self.evictions.fetch_add(1, Ordering::Relaxed);
            tracing::trace!(
                owner = %evicted.owner,
                signature = %evicted.signature,
                "resolution cache eviction"
            );
        }
        Ok(computed)
    }

    /// Check if a key is cached
    pub fn contains(&self, key: &CallableKey) -> bool {
        self.entries.lock().contains(key)
    }

    /// Number of live entries
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    /// Check if the cache is empty
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Maximum number of live entries
    pub fn capacity(&self) -> usize {
        self.entries.lock().cap().get()
    }

    /// Snapshot of the counters
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            evictions: self.evictions.load(Ordering::Relaxed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use callgate_sdk::{Callable, Value};
    use std::sync::Arc;

    fn make_callable(sig: &str) -> ResolvedCallable {
        Callable::from_signature(sig, |_| Ok(Value::Void))
            .unwrap()
            .into_resolved()
    }

    fn cap(n: usize) -> NonZeroUsize {
        NonZeroUsize::new(n).unwrap()
    }

    #[test]
    fn test_miss_then_hit() {
        let cache = ResolutionCache::new(cap(4));
        let key = CallableKey::new("a.B", "f()V");

        let first = cache
            .get_or_try_insert_with(key.clone(), || Ok::<_, ()>(make_callable("f()V")))
            .unwrap();
        let second = cache
            .get_or_try_insert_with(key.clone(), || -> Result<_, ()> {
                panic!("must not recompute a cached key")
            })
            .unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(
            cache.stats(),
            CacheStats {
                hits: 1,
                misses: 1,
                evictions: 0
            }
        );
    }

    #[test]
    fn test_errors_are_not_cached() {
        let cache = ResolutionCache::new(cap(4));
        let key = CallableKey::new("a.B", "f()V");
        assert_eq!(
            cache.get_or_try_insert_with(key.clone(), || Err("nope")).unwrap_err(),
            "nope"
        );
        assert!(!cache.contains(&key));
        assert!(cache.is_empty());
    }

    #[test]
    fn test_eviction_is_lru() {
        let cache = ResolutionCache::new(cap(2));
        for name in ["a", "b"] {
            let sig = format!("{}()V", name);
            cache
                .get_or_try_insert_with(CallableKey::new("T", sig.as_str()), || {
                    Ok::<_, ()>(make_callable(&sig))
                })
                .unwrap();
        }
        // Touch "a" so "b" becomes least recently used
        assert!(cache.get(&CallableKey::new("T", "a()V")).is_some());
        cache
            .get_or_try_insert_with(CallableKey::new("T", "c()V"), || {
                Ok::<_, ()>(make_callable("c()V"))
            })
            .unwrap();

        assert_eq!(cache.len(), 2);
        assert_eq!(cache.capacity(), 2);
        assert!(cache.contains(&CallableKey::new("T", "a()V")));
        assert!(!cache.contains(&CallableKey::new("T", "b()V")));
        assert_eq!(cache.stats().evictions, 1);
    }

    #[test]
    fn test_keys_compare_both_fields() {
        assert_ne!(CallableKey::new("A", "f()V"), CallableKey::new("B", "f()V"));
        assert_ne!(CallableKey::new("A", "f()V"), CallableKey::new("A", "g()V"));
        assert_eq!(CallableKey::new("A", "f()V"), CallableKey::new("A", "f()V"));
    }
}
