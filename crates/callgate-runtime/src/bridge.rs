//! Invocation bridge: typed entry points for translated code
//!
//! Every entry point takes an owner type name, a method signature and a
//! packed argument handle:
//!
//! - non-empty owner: the callable is resolved among the owner's static
//!   members (and cached)
//! - empty owner: the signature is looked up in the external pointer table
//!
//! Arguments are decoded strictly by the callable's declared parameter
//! types, the callable is invoked, and the result must be of the category
//! the entry point returns.

use std::any::Any;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

use callgate_sdk::{
    Access, ArgHandle, ArgumentDecoder, BridgeError, BridgeResult, FromValue, ResolvedCallable,
    TypeLoader, Value,
};

use crate::config::BridgeConfig;
use crate::external::ExternalPointerTable;
use crate::resolver::Resolver;

/// Callback bridge context: resolution cache, external table and decoder.
///
/// Construct one per process (or per test) and share it by reference; all
/// methods take `&self` and are safe to call from many threads at once.
pub struct Bridge {
    config: BridgeConfig,
    resolver: Resolver,
    externals: ExternalPointerTable,
    decoder: Arc<dyn ArgumentDecoder>,
}

impl Bridge {
    /// Create a bridge with default configuration
    pub fn new(loader: Arc<dyn TypeLoader>, decoder: Arc<dyn ArgumentDecoder>) -> Self {
        Self::with_config(BridgeConfig::default(), loader, decoder)
    }

    /// Create a bridge with custom configuration
    pub fn with_config(
        config: BridgeConfig,
        loader: Arc<dyn TypeLoader>,
        decoder: Arc<dyn ArgumentDecoder>,
    ) -> Self {
        let resolver = Resolver::new(loader, &config);
        Bridge {
            config,
            resolver,
            externals: ExternalPointerTable::new(),
            decoder,
        }
    }

    /// Configuration in use
    pub fn config(&self) -> &BridgeConfig {
        &self.config
    }

    /// Class-based resolver and its cache
    pub fn resolver(&self) -> &Resolver {
        &self.resolver
    }

    /// External pointer table
    pub fn externals(&self) -> &ExternalPointerTable {
        &self.externals
    }

    // ========================================================================
    // Dispatch
    // ========================================================================

    /// Find the callable an invocation targets
    pub fn lookup(&self, owner: &str, signature: &str) -> BridgeResult<ResolvedCallable> {
        if !owner.is_empty() {
            self.resolver.resolve(owner, signature)
        } else {
            self.externals.get(signature).ok_or_else(|| {
                BridgeError::Resolution(format!(
                    "Cannot resolve an external function for `{}`",
                    signature
                ))
            })
        }
    }

    /// Invoke and return the callee's result unchecked
    pub fn invoke(&self, owner: &str, signature: &str, args: ArgHandle) -> BridgeResult<Value> {
        let callable = self.lookup(owner, signature)?;
        let result = self.call(&callable, args)?;
        tracing::debug!(
            signature,
            return_type = callable.return_type().name(),
            "function invoked"
        );
        Ok(result)
    }

    /// Invoke and require a result of category `T`
    pub fn invoke_as<T: FromValue>(
        &self,
        owner: &str,
        signature: &str,
        args: ArgHandle,
    ) -> BridgeResult<T> {
        T::from_value(self.invoke(owner, signature, args)?)
    }

    fn call(&self, callable: &ResolvedCallable, args: ArgHandle) -> BridgeResult<Value> {
        let values = self.decode(callable, args)?;

        if callable.access() != Access::Public {
            return Err(BridgeError::InvocationAccess(format!(
                "Cannot invoke a method via reflection: {}",
                callable.name()
            )));
        }

        if !self.config.catch_panics {
            return callable.call(&values).map_err(BridgeError::from);
        }
        match catch_unwind(AssertUnwindSafe(|| callable.call(&values))) {
            Ok(result) => result.map_err(BridgeError::from),
            Err(payload) => Err(BridgeError::Callee(panic_message(payload.as_ref()))),
        }
    }

    fn decode(&self, callable: &ResolvedCallable, args: ArgHandle) -> BridgeResult<Vec<Value>> {
        let params = callable.params();
        if args.is_none() {
            if params.is_empty() {
                return Ok(Vec::new());
            }
            return Err(BridgeError::ArgumentDecode(format!(
                "no arguments supplied for {} parameter(s) of {}",
                params.len(),
                callable.signature()
            )));
        }

        let values = self.decoder.unpack(args, params)?;
        if values.len() != params.len() {
            return Err(BridgeError::ArgumentDecode(format!(
                "decoder produced {} value(s) for {} parameter(s) of {}",
                values.len(),
                params.len(),
                callable.signature()
            )));
        }
        Ok(values)
    }

    // ========================================================================
    // Typed entry points
    // ========================================================================

    /// Invoke a callable, discarding its result
    pub fn invoke_void(&self, owner: &str, signature: &str, args: ArgHandle) -> BridgeResult<()> {
        self.invoke(owner, signature, args).map(|_| ())
    }

    /// Invoke a callable returning a boolean (`Z`)
    pub fn invoke_i1(&self, owner: &str, signature: &str, args: ArgHandle) -> BridgeResult<bool> {
        self.invoke_as(owner, signature, args)
    }

    /// Invoke a callable returning an 8-bit integer (`B`)
    pub fn invoke_i8(&self, owner: &str, signature: &str, args: ArgHandle) -> BridgeResult<i8> {
        self.invoke_as(owner, signature, args)
    }

    /// Invoke a callable returning a 16-bit integer (`S`)
    pub fn invoke_i16(&self, owner: &str, signature: &str, args: ArgHandle) -> BridgeResult<i16> {
        self.invoke_as(owner, signature, args)
    }

    /// Invoke a callable returning a 32-bit integer (`I`)
    pub fn invoke_i32(&self, owner: &str, signature: &str, args: ArgHandle) -> BridgeResult<i32> {
        self.invoke_as(owner, signature, args)
    }

    /// Invoke a callable returning a 64-bit integer (`J`)
    pub fn invoke_i64(&self, owner: &str, signature: &str, args: ArgHandle) -> BridgeResult<i64> {
        self.invoke_as(owner, signature, args)
    }

    /// Invoke a callable returning a 32-bit float (`F`)
    pub fn invoke_f32(&self, owner: &str, signature: &str, args: ArgHandle) -> BridgeResult<f32> {
        self.invoke_as(owner, signature, args)
    }

    /// Invoke a callable returning a 64-bit float (`D`)
    pub fn invoke_f64(&self, owner: &str, signature: &str, args: ArgHandle) -> BridgeResult<f64> {
        self.invoke_as(owner, signature, args)
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "callee panicked".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::{ClassDescriptor, ClassRegistry};
    use callgate_memory::ArgArena;
    use callgate_sdk::{Callable, CallFault, DecodeError, ErrorKind, ValueType};

    fn setup() -> (Bridge, Arc<ArgArena>) {
        let classes = Arc::new(ClassRegistry::new());
        classes.register_class(
            ClassDescriptor::new("com.example.Math")
                .with_static("square(I)I", |args| {
                    let x = args[0].as_i32().unwrap_or(0);
                    Ok(Value::I32(x * x))
                })
                .unwrap()
                .with_static("answer()I", |_| Ok(Value::I32(42)))
                .unwrap()
                .with_static("wrong()I", |_| Ok(Value::I64(42)))
                .unwrap()
                .with_static("fail()V", |_| Err(CallFault::from("boom: index 7 out of range")))
                .unwrap()
                .with_static("explode()V", |_| panic!("callee exploded"))
                .unwrap()
                .with_member(
                    Callable::from_signature("hidden()V", |_| Ok(Value::Void))
                        .unwrap()
                        .with_access(Access::Private),
                ),
        );
        let memory = Arc::new(ArgArena::new());
        (Bridge::new(classes, memory.clone()), memory)
    }

    #[test]
    fn test_class_invoke() {
        let (bridge, memory) = setup();
        let args = memory.pack(|p| {
            p.i32(4);
        });
        assert_eq!(bridge.invoke_i32("com.example.Math", "square(I)I", args), Ok(16));
    }

    #[test]
    fn test_zero_arity_with_no_args() {
        let (bridge, _) = setup();
        assert_eq!(
            bridge.invoke_i32("com.example.Math", "answer()I", ArgHandle::NONE),
            Ok(42)
        );
    }

    #[test]
    fn test_no_args_for_nonzero_arity() {
        let (bridge, _) = setup();
        let err = bridge
            .invoke_i32("com.example.Math", "square(I)I", ArgHandle::NONE)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ArgumentDecode);
    }

    #[test]
    fn test_result_category_checked() {
        let (bridge, _) = setup();
        let err = bridge
            .invoke_i32("com.example.Math", "wrong()I", ArgHandle::NONE)
            .unwrap_err();
        assert_eq!(
            err,
            BridgeError::TypeMismatch {
                expected: "i32".to_string(),
                got: "i64".to_string(),
            }
        );
        // invoke_void discards whatever came back
        assert!(bridge
            .invoke_void("com.example.Math", "wrong()I", ArgHandle::NONE)
            .is_ok());
    }

    #[test]
    fn test_callee_error_passthrough() {
        let (bridge, _) = setup();
        let err = bridge
            .invoke_void("com.example.Math", "fail()V", ArgHandle::NONE)
            .unwrap_err();
        assert_eq!(
            err,
            BridgeError::Callee("boom: index 7 out of range".to_string())
        );
    }

    #[test]
    fn test_callee_panic_is_captured() {
        let (bridge, _) = setup();
        let err = bridge
            .invoke_void("com.example.Math", "explode()V", ArgHandle::NONE)
            .unwrap_err();
        assert_eq!(err, BridgeError::Callee("callee exploded".to_string()));
    }

    #[test]
    fn test_private_member_is_access_error() {
        let (bridge, _) = setup();
        let err = bridge
            .invoke_void("com.example.Math", "hidden()V", ArgHandle::NONE)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvocationAccess);
    }

    #[test]
    fn test_external_invoke() {
        let (bridge, memory) = setup();
        bridge.externals().register(
            "add(II)I",
            Callable::from_signature("add(II)I", |args| {
                let a = args[0].as_i32().unwrap_or(0);
                let b = args[1].as_i32().unwrap_or(0);
                Ok(Value::I32(a + b))
            })
            .unwrap()
            .into_resolved(),
        );
        let args = memory.pack(|p| {
            p.i32(2).i32(3);
        });
        assert_eq!(bridge.invoke_i32("", "add(II)I", args), Ok(5));

        bridge.externals().unregister("add(II)I");
        assert_eq!(
            bridge.invoke_i32("", "add(II)I", args),
            Err(BridgeError::Resolution(
                "Cannot resolve an external function for `add(II)I`".to_string()
            ))
        );
    }

    #[test]
    fn test_lookup_paths_are_disjoint() {
        let (bridge, _) = setup();
        // Class members are not visible without an owner
        assert!(bridge.lookup("", "answer()I").is_err());

        bridge.externals().register(
            "ext()I",
            Callable::from_signature("ext()I", |_| Ok(Value::I32(1)))
                .unwrap()
                .into_resolved(),
        );
        // External registrations are not visible through a class
        assert!(bridge.lookup("com.example.Math", "ext()I").is_err());
    }

    struct ShortDecoder;

    impl ArgumentDecoder for ShortDecoder {
        fn unpack(&self, _: ArgHandle, _: &[ValueType]) -> Result<Vec<Value>, DecodeError> {
            Ok(vec![])
        }
    }

    #[test]
    fn test_decoder_count_is_enforced() {
        let classes = Arc::new(ClassRegistry::new());
        classes.register_class(
            ClassDescriptor::new("T")
                .with_static("f(I)I", |_| Ok(Value::I32(0)))
                .unwrap(),
        );
        let bridge = Bridge::new(classes, Arc::new(ShortDecoder));
        let err = bridge
            .invoke_i32("T", "f(I)I", ArgHandle::from_raw(1))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ArgumentDecode);
    }

    type Fields = Vec<(String, String)>;

    /// Records the fields of every event dispatched while it is the default
    #[derive(Clone, Default)]
    struct CapturedEvents(Arc<parking_lot::Mutex<Vec<Fields>>>);

    impl CapturedEvents {
        fn invocations(&self) -> Vec<Fields> {
            self.0
                .lock()
                .iter()
                .filter(|fields| {
                    fields
                        .iter()
                        .any(|(k, v)| k == "message" && v == "function invoked")
                })
                .cloned()
                .collect()
        }
    }

    struct FieldCollector<'a>(&'a mut Fields);

    impl tracing::field::Visit for FieldCollector<'_> {
        fn record_str(&mut self, field: &tracing::field::Field, value: &str) {
            self.0.push((field.name().to_string(), value.to_string()));
        }

        fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
            self.0.push((field.name().to_string(), format!("{:?}", value)));
        }
    }

    impl tracing::Subscriber for CapturedEvents {
        fn enabled(&self, _: &tracing::Metadata<'_>) -> bool {
            true
        }

        fn new_span(&self, _: &tracing::span::Attributes<'_>) -> tracing::span::Id {
            tracing::span::Id::from_u64(1)
        }

        fn record(&self, _: &tracing::span::Id, _: &tracing::span::Record<'_>) {}

        fn record_follows_from(&self, _: &tracing::span::Id, _: &tracing::span::Id) {}

        fn event(&self, event: &tracing::Event<'_>) {
            let mut fields = Vec::new();
            event.record(&mut FieldCollector(&mut fields));
            self.0.lock().push(fields);
        }

        fn enter(&self, _: &tracing::span::Id) {}

        fn exit(&self, _: &tracing::span::Id) {}
    }

    fn field<'a>(fields: &'a Fields, name: &str) -> Option<&'a str> {
        fields
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    #[test]
    fn test_successful_invocation_is_traced() {
        let (bridge, memory) = setup();
        let args = memory.pack(|p| {
            p.i32(3);
        });
        let events = CapturedEvents::default();

        tracing::subscriber::with_default(events.clone(), || {
            assert_eq!(bridge.invoke_i32("com.example.Math", "square(I)I", args), Ok(9));
        });

        let invocations = events.invocations();
        assert_eq!(invocations.len(), 1);
        assert_eq!(field(&invocations[0], "signature"), Some("square(I)I"));
        assert_eq!(field(&invocations[0], "return_type"), Some("i32"));
    }

    #[test]
    fn test_failed_invocation_is_not_traced() {
        let (bridge, _) = setup();
        let events = CapturedEvents::default();

        tracing::subscriber::with_default(events.clone(), || {
            assert!(bridge
                .invoke_void("com.example.Math", "fail()V", ArgHandle::NONE)
                .is_err());
        });

        assert!(events.invocations().is_empty());
    }
}
