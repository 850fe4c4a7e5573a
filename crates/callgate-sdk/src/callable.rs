//! Callable: an invokable member with its declared signature
//!
//! Type descriptors expose their members as callables, and the external
//! pointer table maps signature strings straight to them. A resolved
//! callable is shared as an `Arc<Callable>` between the resolution cache and
//! every in-flight invocation.

use std::fmt;
use std::sync::Arc;

use crate::error::CallFault;
use crate::signature::{MethodSignature, SignatureError};
use crate::types::ValueType;
use crate::value::Value;

/// Body of a callable: decoded arguments in, boxed result out.
pub type CallableFn = Arc<dyn Fn(&[Value]) -> Result<Value, CallFault> + Send + Sync>;

/// A callable shared by the cache, the external table and invocations.
pub type ResolvedCallable = Arc<Callable>;

/// Whether a member belongs to the type or to its instances.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MemberKind {
    /// Invoked without a receiver
    Static,
    /// Needs a receiver; never matched by resolution
    Instance,
}

/// Visibility of a member to the bridge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Access {
    /// May be invoked
    Public,
    /// Resolves, but invoking it is an access error
    Private,
}

/// An invokable member.
#[derive(Clone)]
pub struct Callable {
    signature: MethodSignature,
    kind: MemberKind,
    access: Access,
    body: CallableFn,
}

impl Callable {
    /// Create a public static callable from an already-parsed signature
    pub fn new(
        signature: MethodSignature,
        body: impl Fn(&[Value]) -> Result<Value, CallFault> + Send + Sync + 'static,
    ) -> Self {
        Callable {
            signature,
            kind: MemberKind::Static,
            access: Access::Public,
            body: Arc::new(body),
        }
    }

    /// Create a public static callable from a signature string like `add(II)I`
    pub fn from_signature(
        signature: &str,
        body: impl Fn(&[Value]) -> Result<Value, CallFault> + Send + Sync + 'static,
    ) -> Result<Self, SignatureError> {
        Ok(Self::new(MethodSignature::parse(signature)?, body))
    }

    /// Set the member kind
    pub fn with_kind(mut self, kind: MemberKind) -> Self {
        self.kind = kind;
        self
    }

    /// Set the access level
    pub fn with_access(mut self, access: Access) -> Self {
        self.access = access;
        self
    }

    /// Wrap in an `Arc` for sharing
    pub fn into_resolved(self) -> ResolvedCallable {
        Arc::new(self)
    }

    /// Method name
    pub fn name(&self) -> &str {
        self.signature.name()
    }

    /// Parsed signature
    pub fn signature(&self) -> &MethodSignature {
        &self.signature
    }

    /// Declared parameter types, in order
    pub fn params(&self) -> &[ValueType] {
        self.signature.params()
    }

    /// Declared return type
    pub fn return_type(&self) -> &ValueType {
        self.signature.ret()
    }

    /// Member kind
    pub fn kind(&self) -> MemberKind {
        self.kind
    }

    /// Check if this member can be invoked without a receiver
    pub fn is_static(&self) -> bool {
        self.kind == MemberKind::Static
    }

    /// Access level
    pub fn access(&self) -> Access {
        self.access
    }

    /// `owner/name(PARAMS)RET`
    pub fn qualified_signature(&self, owner: &str) -> String {
        self.signature.qualified(owner)
    }

    /// Run the body. Access is not checked here; the bridge does that.
    pub fn call(&self, args: &[Value]) -> Result<Value, CallFault> {
        (self.body)(args)
    }
}

impl fmt::Debug for Callable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Callable")
            .field("signature", &self.signature.to_string())
            .field("kind", &self.kind)
            .field("access", &self.access)
            .finish()
    }
}
