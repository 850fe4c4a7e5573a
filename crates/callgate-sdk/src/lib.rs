//! Callgate SDK - shared types for the callback bridge
//!
//! This crate provides the types translated code, hosts and the bridge
//! runtime agree on, without depending on the runtime itself:
//!
//! - [`Value`] and [`ValueType`]: boxed arguments/results and declared types
//! - [`MethodSignature`]: `name(PARAMS)RET` signature strings
//! - [`Callable`]: an invokable member with its declared signature
//! - [`TypeLoader`], [`TypeDescriptor`], [`ArgumentDecoder`]: collaborator
//!   contracts the bridge programs against
//! - [`BridgeError`]: the failure taxonomy of a single invocation
//!
//! # Example
//!
//! ```ignore
//! use callgate_sdk::{arg, Callable, IntoValue};
//!
//! let add = Callable::from_signature("add(II)I", |args| {
//!     let a: i32 = arg(args, 0)?;
//!     let b: i32 = arg(args, 1)?;
//!     Ok((a + b).into_value())
//! })?;
//! ```

#![warn(missing_docs)]

pub mod callable;
pub mod context;
pub mod convert;
pub mod error;
pub mod signature;
pub mod types;
pub mod value;

pub use callable::{Access, Callable, CallableFn, MemberKind, ResolvedCallable};
pub use context::{ArgHandle, ArgumentDecoder, TypeDescriptor, TypeLoader};
pub use convert::{arg, FromValue, IntoValue};
pub use error::{BridgeError, BridgeResult, CallFault, DecodeError, ErrorKind, LoadError};
pub use signature::{MethodSignature, SignatureError};
pub use types::ValueType;
pub use value::Value;
