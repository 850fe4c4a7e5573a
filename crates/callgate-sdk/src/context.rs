//! Collaborator contracts: type loading and argument decoding
//!
//! The bridge programs against these traits only. Hosts supply the concrete
//! loader (which types exist and what members they expose) and the decoder
//! (how a packed argument handle turns into values).

use std::sync::Arc;

use crate::callable::ResolvedCallable;
use crate::error::{DecodeError, LoadError};
use crate::types::ValueType;
use crate::value::Value;

/// Opaque handle to a packed argument buffer.
///
/// `ArgHandle::NONE` (zero) means "no arguments".
#[repr(transparent)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ArgHandle(u64);

impl ArgHandle {
    /// The "no arguments" sentinel
    pub const NONE: ArgHandle = ArgHandle(0);

    /// Wrap a raw handle value
    #[inline]
    pub const fn from_raw(raw: u64) -> Self {
        ArgHandle(raw)
    }

    /// Raw handle value
    #[inline]
    pub const fn as_raw(self) -> u64 {
        self.0
    }

    /// Check if this is the "no arguments" sentinel
    #[inline]
    pub const fn is_none(self) -> bool {
        self.0 == 0
    }
}

/// Description of a loaded type: its name and its members.
pub trait TypeDescriptor: Send + Sync {
    /// Qualified type name
    fn name(&self) -> &str;

    /// All members, static and instance, in declaration order
    fn members(&self) -> Vec<ResolvedCallable>;
}

/// Maps a qualified type name to its descriptor.
pub trait TypeLoader: Send + Sync {
    /// Load the type named `name`
    fn load(&self, name: &str) -> Result<Arc<dyn TypeDescriptor>, LoadError>;
}

/// Decodes a packed argument buffer by expected types.
pub trait ArgumentDecoder: Send + Sync {
    /// Produce one value per entry of `types`, in order.
    ///
    /// Never called with `ArgHandle::NONE`.
    fn unpack(&self, handle: ArgHandle, types: &[ValueType]) -> Result<Vec<Value>, DecodeError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_arg_handle_sentinel() {
        assert!(ArgHandle::NONE.is_none());
        assert!(ArgHandle::default().is_none());
        let h = ArgHandle::from_raw(0x1000);
        assert!(!h.is_none());
        assert_eq!(h.as_raw(), 0x1000);
    }
}
