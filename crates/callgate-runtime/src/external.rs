//! External pointer table
//!
//! Callables registered directly under a signature string, bypassing
//! type-based resolution. Invocations with an empty owner look here and
//! nowhere else.

use callgate_sdk::ResolvedCallable;
use dashmap::DashMap;

/// Concurrent map of signature strings to callables
#[derive(Default)]
pub struct ExternalPointerTable {
    pointers: DashMap<String, ResolvedCallable>,
}

impl ExternalPointerTable {
    /// Create an empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `callable` under `signature`, returning the one it replaced.
    ///
    /// The callable's declared signature is not checked against `signature`.
    pub fn register(
        &self,
        signature: impl Into<String>,
        callable: ResolvedCallable,
    ) -> Option<ResolvedCallable> {
        let signature = signature.into();
        tracing::debug!(%signature, "external function registered");
        self.pointers.insert(signature, callable)
    }

    /// Remove the callable registered under `signature`
    pub fn unregister(&self, signature: &str) -> Option<ResolvedCallable> {
        let removed = self.pointers.remove(signature).map(|(_, callable)| callable);
        if removed.is_some() {
            tracing::debug!(%signature, "external function unregistered");
        }
        removed
    }

    /// Remove every registration
    pub fn clear(&self) {
        tracing::debug!(count = self.pointers.len(), "external functions cleared");
        self.pointers.clear();
    }

    /// Callable registered under `signature`
    pub fn get(&self, signature: &str) -> Option<ResolvedCallable> {
        self.pointers.get(signature).map(|entry| entry.value().clone())
    }

    /// Check if `signature` is registered
    pub fn contains(&self, signature: &str) -> bool {
        self.pointers.contains_key(signature)
    }

    /// Number of registrations
    pub fn len(&self) -> usize {
        self.pointers.len()
    }

    /// Check if the table is empty
    pub fn is_empty(&self) -> bool {
        self.pointers.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use callgate_sdk::{Callable, Value};
    use std::sync::Arc;

    fn constant(sig: &str, v: i32) -> ResolvedCallable {
        Callable::from_signature(sig, move |_| Ok(Value::I32(v)))
            .unwrap()
            .into_resolved()
    }

    #[test]
    fn test_register_get_unregister() {
        let table = ExternalPointerTable::new();
        let one = constant("one()I", 1);
        assert!(table.register("one()I", one.clone()).is_none());
        assert!(table.contains("one()I"));
        assert!(Arc::ptr_eq(&table.get("one()I").unwrap(), &one));

        assert!(table.unregister("one()I").is_some());
        assert!(table.unregister("one()I").is_none());
        assert!(table.get("one()I").is_none());
    }

    #[test]
    fn test_register_replaces() {
        let table = ExternalPointerTable::new();
        table.register("k()I", constant("k()I", 1));
        let old = table.register("k()I", constant("k()I", 2)).unwrap();
        assert_eq!(old.call(&[]), Ok(Value::I32(1)));
        assert_eq!(table.get("k()I").unwrap().call(&[]), Ok(Value::I32(2)));
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_clear() {
        let table = ExternalPointerTable::new();
        table.register("a()I", constant("a()I", 1));
        table.register("b()I", constant("b()I", 2));
        table.clear();
        assert!(table.is_empty());
    }

    #[test]
    fn test_signature_shape_not_validated() {
        let table = ExternalPointerTable::new();
        // Registered key and declared signature need not agree
        table.register("whatever", constant("f()I", 3));
        assert!(table.contains("whatever"));
    }
}
