//! Traits for converting between `Value` and Rust primitives.
//!
//! The typed bridge entry points use `FromValue` to check that a callee's
//! result has the category the entry point promises. Callable bodies use
//! `arg` and `IntoValue` to read arguments and box results.
//!
//! # Example
//!
//! ```ignore
//! use callgate_sdk::{arg, Callable, IntoValue};
//!
//! let square = Callable::from_signature("square(I)I", |args| {
//!     let x: i32 = arg(args, 0)?;
//!     Ok((x * x).into_value())
//! })?;
//! ```

use crate::error::{BridgeError, CallFault};
use crate::types::ValueType;
use crate::value::Value;

/// Extract a Rust primitive from a `Value` of exactly the matching category.
pub trait FromValue: Sized {
    /// Category this type expects
    const TYPE: ValueType;

    /// Convert, failing with `TypeMismatch` on any other category
    fn from_value(value: Value) -> Result<Self, BridgeError>;
}

/// Box a Rust primitive into a `Value`.
pub trait IntoValue {
    /// Convert to a `Value`
    fn into_value(self) -> Value;
}

fn mismatch(expected: &ValueType, got: Value) -> BridgeError {
    BridgeError::TypeMismatch {
        expected: expected.name().to_string(),
        got: got.type_name().to_string(),
    }
}

macro_rules! impl_primitive {
    ($ty:ty, $variant:ident, $accessor:ident, $value_type:expr) => {
        impl FromValue for $ty {
            const TYPE: ValueType = $value_type;

            fn from_value(value: Value) -> Result<Self, BridgeError> {
                value.$accessor().ok_or_else(|| mismatch(&Self::TYPE, value))
            }
        }

        impl IntoValue for $ty {
            fn into_value(self) -> Value {
                Value::$variant(self)
            }
        }
    };
}

impl_primitive!(bool, Bool, as_bool, ValueType::Bool);
impl_primitive!(i8, I8, as_i8, ValueType::I8);
impl_primitive!(i16, I16, as_i16, ValueType::I16);
impl_primitive!(i32, I32, as_i32, ValueType::I32);
impl_primitive!(i64, I64, as_i64, ValueType::I64);
impl_primitive!(f32, F32, as_f32, ValueType::F32);
impl_primitive!(f64, F64, as_f64, ValueType::F64);

// Void results are discarded whatever the callee produced
impl FromValue for () {
    const TYPE: ValueType = ValueType::Void;

    fn from_value(_value: Value) -> Result<Self, BridgeError> {
        Ok(())
    }
}

impl IntoValue for () {
    fn into_value(self) -> Value {
        Value::Void
    }
}

/// Read argument `index` as `T` inside a callable body.
pub fn arg<T: FromValue>(args: &[Value], index: usize) -> Result<T, CallFault> {
    let value = args
        .get(index)
        .copied()
        .ok_or_else(|| CallFault::Raised(format!("missing argument {}", index)))?;
    T::from_value(value).map_err(|e| CallFault::Raised(e.to_string()))
}
