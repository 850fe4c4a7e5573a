//! Callgate runtime - callback bridge for translated code
//!
//! Translated code calls back into host methods by owner type name and
//! signature string, passing its arguments as one packed buffer handle.
//! This crate provides:
//! - [`Bridge`]: typed entry points (`invoke_void`, `invoke_i1` ..
//!   `invoke_f64`) that resolve, decode, invoke and check the result
//! - [`Resolver`] and [`ResolutionCache`]: bounded, cached resolution of
//!   static members over a [`TypeLoader`](callgate_sdk::TypeLoader)
//! - [`ClassRegistry`]: explicit registration of host types and members
//! - [`ExternalPointerTable`]: callables registered by bare signature
//! - [`c_api`]: `extern "C"` entry points over a process-wide runtime
//!
//! # Example
//!
//! ```ignore
//! let classes = Arc::new(ClassRegistry::new());
//! classes.register_class(
//!     ClassDescriptor::new("com.example.Math").with_static("square(I)I", |args| {
//!         let x: i32 = arg(args, 0)?;
//!         Ok(Value::I32(x * x))
//!     })?,
//! );
//! let memory = Arc::new(ArgArena::new());
//! let bridge = Bridge::new(classes, memory.clone());
//!
//! let args = memory.pack(|p| { p.i32(4); });
//! assert_eq!(bridge.invoke_i32("com.example.Math", "square(I)I", args)?, 16);
//! ```

#![warn(missing_docs)]

pub mod bridge;
pub mod c_api;
pub mod cache;
pub mod config;
pub mod external;
pub mod naming;
pub mod registry;
pub mod resolver;

pub use bridge::Bridge;
pub use cache::{CacheStats, CallableKey, ResolutionCache};
pub use config::{BridgeConfig, DEFAULT_CACHE_CAPACITY};
pub use external::ExternalPointerTable;
pub use naming::{generated_unit_name, FixedGenerationId, GenerationIdSupplier, UnitNamer};
pub use registry::{ClassDescriptor, ClassRegistry};
pub use resolver::Resolver;

// Re-export SDK types so hosts can depend on the runtime alone
pub use callgate_sdk::{
    arg, Access, ArgHandle, ArgumentDecoder, BridgeError, BridgeResult, CallFault, Callable,
    ErrorKind, FromValue, IntoValue, MemberKind, MethodSignature, ResolvedCallable,
    TypeDescriptor, TypeLoader, Value, ValueType,
};
