//! Resolves `(owner, signature)` pairs to static callables.
//!
//! On a cache miss the owner type is loaded and its static members are
//! scanned for one whose qualified signature equals `owner/signature`.
//! The first exact match is cached.

use std::sync::Arc;

use callgate_sdk::{BridgeError, BridgeResult, ResolvedCallable, TypeLoader};

use crate::cache::{CacheStats, CallableKey, ResolutionCache};
use crate::config::BridgeConfig;

/// Cached member resolution over a [`TypeLoader`]
pub struct Resolver {
    loader: Arc<dyn TypeLoader>,
    cache: ResolutionCache,
}

impl Resolver {
    /// Create a resolver with a cache sized by `config`
    pub fn new(loader: Arc<dyn TypeLoader>, config: &BridgeConfig) -> Self {
        Resolver {
            loader,
            cache: ResolutionCache::new(config.capacity()),
        }
    }

    /// Resolve `signature` among the static members of `owner`.
    ///
    /// Fails with `BridgeError::Resolution` if the type cannot be loaded or
    /// has no matching static member. Loader errors are not passed on: every
    /// failure reads `Method not found: <owner>/<signature>`.
    pub fn resolve(&self, owner: &str, signature: &str) -> BridgeResult<ResolvedCallable> {
        self.cache
            .get_or_try_insert_with(CallableKey::new(owner, signature), || {
                self.scan(owner, signature)
            })
    }

    /// Cached callable for a key, if present (does not load or scan)
    pub fn cached(&self, owner: &str, signature: &str) -> Option<ResolvedCallable> {
        self.cache.peek(&CallableKey::new(owner, signature))
    }

    /// Number of cached resolutions
    pub fn len(&self) -> usize {
        self.cache.len()
    }

    /// Check if nothing has been cached yet
    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }

    /// Cache capacity
    pub fn capacity(&self) -> usize {
        self.cache.capacity()
    }

    /// Cache counters
    pub fn stats(&self) -> CacheStats {
        self.cache.stats()
    }

    fn scan(&self, owner: &str, signature: &str) -> BridgeResult<ResolvedCallable> {
        let target = format!("{}/{}", owner, signature);
        let not_found = || BridgeError::Resolution(format!("Method not found: {}", target));

        let descriptor = self.loader.load(owner).map_err(|_| not_found())?;
        descriptor
            .members()
            .into_iter()
            .filter(|member| member.is_static())
            .find(|member| member.qualified_signature(descriptor.name()) == target)
            .ok_or_else(not_found)
    }
}
