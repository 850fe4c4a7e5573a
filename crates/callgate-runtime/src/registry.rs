//! Class registry: the in-process type loader
//!
//! Host types register their members explicitly when they are loaded,
//! instead of being discovered by runtime introspection. The registry then
//! serves them to the resolver through [`TypeLoader`].

use std::sync::Arc;

use callgate_sdk::{
    CallFault, Callable, LoadError, ResolvedCallable, SignatureError, TypeDescriptor, TypeLoader,
    Value,
};
use parking_lot::RwLock;
use rustc_hash::FxHashMap;

/// A host type and the members it exposes to the bridge
#[derive(Debug, Clone)]
pub struct ClassDescriptor {
    name: String,
    members: Vec<ResolvedCallable>,
}

impl ClassDescriptor {
    /// Create a descriptor with no members
    pub fn new(name: impl Into<String>) -> Self {
        ClassDescriptor {
            name: name.into(),
            members: Vec::new(),
        }
    }

    /// Add a member
    pub fn with_member(mut self, callable: Callable) -> Self {
        self.members.push(callable.into_resolved());
        self
    }

    /// Add a public static member from a signature string like `square(I)I`
    pub fn with_static(
        self,
        signature: &str,
        body: impl Fn(&[Value]) -> Result<Value, CallFault> + Send + Sync + 'static,
    ) -> Result<Self, SignatureError> {
        Ok(self.with_member(Callable::from_signature(signature, body)?))
    }
}

impl TypeDescriptor for ClassDescriptor {
    fn name(&self) -> &str {
        &self.name
    }

    fn members(&self) -> Vec<ResolvedCallable> {
        self.members.clone()
    }
}

/// Thread-safe map of qualified type names to descriptors
pub struct ClassRegistry {
    classes: RwLock<FxHashMap<String, Arc<ClassDescriptor>>>,
}

impl ClassRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        ClassRegistry {
            classes: RwLock::new(FxHashMap::default()),
        }
    }

    /// Register a type, returning the descriptor it replaced.
    ///
    /// Callables already resolved from a replaced descriptor stay cached.
    pub fn register_class(&self, class: ClassDescriptor) -> Option<Arc<ClassDescriptor>> {
        tracing::debug!(class = %class.name, members = class.members.len(), "class registered");
        self.classes.write().insert(class.name.clone(), Arc::new(class))
    }

    /// Remove a type
    pub fn unregister_class(&self, name: &str) -> Option<Arc<ClassDescriptor>> {
        self.classes.write().remove(name)
    }

    /// Check if a type is registered
    pub fn contains(&self, name: &str) -> bool {
        self.classes.read().contains_key(name)
    }

    /// Number of registered types
    pub fn len(&self) -> usize {
        self.classes.read().len()
    }

    /// Check if no types are registered
    pub fn is_empty(&self) -> bool {
        self.classes.read().is_empty()
    }
}

impl Default for ClassRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl TypeLoader for ClassRegistry {
    fn load(&self, name: &str) -> Result<Arc<dyn TypeDescriptor>, LoadError> {
        let class = self
            .classes
            .read()
            .get(name)
            .cloned()
            .ok_or_else(|| LoadError::NotFound(name.to_string()))?;
        Ok(class)
    }
}
