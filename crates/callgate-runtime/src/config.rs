//! Bridge configuration

use std::num::NonZeroUsize;

/// Default number of resolved callables kept in the resolution cache
pub const DEFAULT_CACHE_CAPACITY: usize = 100;

/// Configuration for a [`Bridge`](crate::Bridge)
#[derive(Debug, Clone)]
pub struct BridgeConfig {
    /// Maximum live entries in the resolution cache (default: 100, min 1)
    pub cache_capacity: usize,
    /// Report callee panics as `Callee` errors instead of unwinding
    /// through the bridge (default: true)
    pub catch_panics: bool,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        BridgeConfig {
            cache_capacity: DEFAULT_CACHE_CAPACITY,
            catch_panics: true,
        }
    }
}

impl BridgeConfig {
    /// Default configuration with a different cache capacity
    pub fn with_cache_capacity(cache_capacity: usize) -> Self {
        Self {
            cache_capacity,
            ..Default::default()
        }
    }

    /// Same configuration with panic capture turned on or off
    pub fn with_catch_panics(self, catch_panics: bool) -> Self {
        Self {
            catch_panics,
            ..self
        }
    }

    /// Cache capacity, clamped to at least one entry
    pub(crate) fn capacity(&self) -> NonZeroUsize {
        NonZeroUsize::new(self.cache_capacity).unwrap_or(NonZeroUsize::MIN)
    }
}
