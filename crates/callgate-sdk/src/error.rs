//! Error types for the callgate bridge
//!
//! `BridgeError` is the only error an invocation ever surfaces. The
//! collaborator errors (`LoadError`, `DecodeError`, `CallFault`) are produced
//! by type loaders, argument decoders and callees, and are converted into a
//! `BridgeError` at the bridge boundary.

/// Result type for bridge operations
pub type BridgeResult<T> = Result<T, BridgeError>;

/// Failure of a single bridge invocation.
///
/// Generated callers branch on the variant, so every failure keeps its kind
/// all the way to the caller.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum BridgeError {
    /// Owner type, method or external signature could not be found
    #[error("{0}")]
    Resolution(String),

    /// The packed argument buffer does not match the declared parameters
    #[error("Argument decode error: {0}")]
    ArgumentDecode(String),

    /// The callee returned a value of the wrong category
    #[error("Type mismatch: expected {expected}, got {got}")]
    TypeMismatch {
        /// Category the entry point returns
        expected: String,
        /// Category the callee produced
        got: String,
    },

    /// The resolved member may not be invoked from the bridge
    #[error("{0}")]
    InvocationAccess(String),

    /// The callee itself failed; carries the callee's message verbatim
    #[error("{0}")]
    Callee(String),
}

/// Stable numeric failure kind, shared with foreign callers.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// See [`BridgeError::Resolution`]
    Resolution = 1,
    /// See [`BridgeError::ArgumentDecode`]
    ArgumentDecode = 2,
    /// See [`BridgeError::TypeMismatch`]
    TypeMismatch = 3,
    /// See [`BridgeError::InvocationAccess`]
    InvocationAccess = 4,
    /// See [`BridgeError::Callee`]
    Callee = 5,
}

impl BridgeError {
    /// Failure kind of this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            BridgeError::Resolution(_) => ErrorKind::Resolution,
            BridgeError::ArgumentDecode(_) => ErrorKind::ArgumentDecode,
            BridgeError::TypeMismatch { .. } => ErrorKind::TypeMismatch,
            BridgeError::InvocationAccess(_) => ErrorKind::InvocationAccess,
            BridgeError::Callee(_) => ErrorKind::Callee,
        }
    }
}

/// A type loader could not produce a type descriptor.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LoadError {
    /// No type is known under this name
    #[error("Type not found: {0}")]
    NotFound(String),

    /// The type exists but could not be enumerated
    #[error("Type could not be loaded: {name}: {reason}")]
    Failed {
        /// Qualified type name
        name: String,
        /// Loader-specific reason
        reason: String,
    },
}

/// A packed argument buffer could not be decoded.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DecodeError {
    /// The handle does not refer to a live buffer
    #[error("dangling argument handle {0:#x}")]
    DanglingHandle(u64),

    /// The buffer ended before all parameters were read
    #[error("buffer truncated: need {needed} bytes at offset {offset}, have {len}")]
    Truncated {
        /// Offset of the parameter being read
        offset: usize,
        /// Bytes the parameter needs
        needed: usize,
        /// Total buffer length
        len: usize,
    },

    /// The buffer holds more bytes than the parameters consume
    #[error("{trailing} trailing bytes after {count} arguments")]
    TrailingBytes {
        /// Number of arguments decoded
        count: usize,
        /// Unconsumed byte count
        trailing: usize,
    },

    /// A value's bytes are not a valid encoding of its type
    #[error("invalid {ty} encoding at offset {offset}")]
    InvalidEncoding {
        /// Declared type name
        ty: String,
        /// Offset of the bad value
        offset: usize,
    },

    /// The declared parameter type has no packed representation
    #[error("unsupported parameter type {0}")]
    UnsupportedType(String),
}

/// Failure raised by a callee while running.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CallFault {
    /// The callee raised an error with this message
    #[error("{0}")]
    Raised(String),
}

impl From<String> for CallFault {
    fn from(s: String) -> Self {
        CallFault::Raised(s)
    }
}

impl From<&str> for CallFault {
    fn from(s: &str) -> Self {
        CallFault::Raised(s.to_string())
    }
}

impl From<DecodeError> for BridgeError {
    fn from(e: DecodeError) -> Self {
        BridgeError::ArgumentDecode(e.to_string())
    }
}

impl From<CallFault> for BridgeError {
    fn from(fault: CallFault) -> Self {
        match fault {
            CallFault::Raised(msg) => BridgeError::Callee(msg),
        }
    }
}
