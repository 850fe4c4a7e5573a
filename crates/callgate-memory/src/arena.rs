//! Handle table of packed argument buffers
//!
//! Generated code passes arguments to the bridge as a single `u64` handle.
//! `ArgArena` owns the buffers behind those handles; the bridge reads
//! through a handle with the `ArgumentDecoder` impl and never keeps it.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use callgate_sdk::{ArgHandle, ArgumentDecoder, DecodeError, Value, ValueType};
use dashmap::DashMap;

use crate::pack::{unpack, ArgPacker};

/// Thread-safe table of packed buffers indexed by handle.
pub struct ArgArena {
    buffers: DashMap<u64, Arc<[u8]>>,
    next_handle: AtomicU64,
}

impl ArgArena {
    /// Create an empty arena
    pub fn new() -> Self {
        ArgArena {
            buffers: DashMap::new(),
            // 0 is ArgHandle::NONE
            next_handle: AtomicU64::new(1),
        }
    }

    /// Store a packed buffer and return its handle (never `ArgHandle::NONE`)
    pub fn store(&self, bytes: Vec<u8>) -> ArgHandle {
        let raw = self.next_handle.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(handle = raw, len = bytes.len(), "argument buffer stored");
        self.buffers.insert(raw, Arc::from(bytes));
        ArgHandle::from_raw(raw)
    }

    /// Pack values with `build` and store the result
    pub fn pack(&self, build: impl FnOnce(&mut ArgPacker)) -> ArgHandle {
        let mut packer = ArgPacker::new();
        build(&mut packer);
        self.store(packer.finish())
    }

    /// Free a buffer. Returns false if the handle was not live.
    pub fn release(&self, handle: ArgHandle) -> bool {
        self.buffers.remove(&handle.as_raw()).is_some()
    }

    /// Bytes behind a handle
    pub fn bytes(&self, handle: ArgHandle) -> Option<Arc<[u8]>> {
        self.buffers.get(&handle.as_raw()).map(|b| Arc::clone(b.value()))
    }

    /// Number of live buffers
    pub fn len(&self) -> usize {
        self.buffers.len()
    }

    /// Check if no buffers are live
    pub fn is_empty(&self) -> bool {
        self.buffers.is_empty()
    }
}

impl Default for ArgArena {
    fn default() -> Self {
        Self::new()
    }
}

impl ArgumentDecoder for ArgArena {
    fn unpack(&self, handle: ArgHandle, types: &[ValueType]) -> Result<Vec<Value>, DecodeError> {
        // Clone the Arc so the shard lock is not held while decoding
        let bytes = self
            .bytes(handle)
            .ok_or(DecodeError::DanglingHandle(handle.as_raw()))?;
        unpack(&bytes, types)
    }
}
