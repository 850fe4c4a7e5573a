//! Value: boxed argument and result representation
//!
//! Every argument decoded from a packed buffer and every result returned by
//! a callable is a `Value`. The variant is the value's category; accessors
//! never coerce between categories, so an `I16` is not an `I32`.

use crate::types::ValueType;

/// Boxed primitive value crossing the bridge.
#[derive(Clone, Copy, PartialEq, Default)]
pub enum Value {
    /// No value (result of a void callable)
    #[default]
    Void,
    /// 1-bit boolean
    Bool(bool),
    /// 8-bit signed integer
    I8(i8),
    /// 16-bit signed integer
    I16(i16),
    /// 32-bit signed integer
    I32(i32),
    /// 64-bit signed integer
    I64(i64),
    /// 32-bit float
    F32(f32),
    /// 64-bit float
    F64(f64),
}

impl Value {
    // ========================================================================
    // Type checks
    // ========================================================================

    /// Check if value is void
    #[inline]
    pub const fn is_void(&self) -> bool {
        matches!(self, Value::Void)
    }

    /// Type of this value
    pub fn value_type(&self) -> ValueType {
        match self {
            Value::Void => ValueType::Void,
            Value::Bool(_) => ValueType::Bool,
            Value::I8(_) => ValueType::I8,
            Value::I16(_) => ValueType::I16,
            Value::I32(_) => ValueType::I32,
            Value::I64(_) => ValueType::I64,
            Value::F32(_) => ValueType::F32,
            Value::F64(_) => ValueType::F64,
        }
    }

    /// Name of this value's category (used in error messages)
    pub const fn type_name(&self) -> &'static str {
        match self {
            Value::Void => "void",
            Value::Bool(_) => "bool",
            Value::I8(_) => "i8",
            Value::I16(_) => "i16",
            Value::I32(_) => "i32",
            Value::I64(_) => "i64",
            Value::F32(_) => "f32",
            Value::F64(_) => "f64",
        }
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    /// Get as bool if this is a bool
    #[inline]
    pub const fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Get as i8 if this is an i8
    #[inline]
    pub const fn as_i8(&self) -> Option<i8> {
        match self {
            Value::I8(i) => Some(*i),
            _ => None,
        }
    }

    /// Get as i16 if this is an i16
    #[inline]
    pub const fn as_i16(&self) -> Option<i16> {
        match self {
            Value::I16(i) => Some(*i),
            _ => None,
        }
    }

    /// Get as i32 if this is an i32
    #[inline]
    pub const fn as_i32(&self) -> Option<i32> {
        match self {
            Value::I32(i) => Some(*i),
            _ => None,
        }
    }

    /// Get as i64 if this is an i64
    #[inline]
    pub const fn as_i64(&self) -> Option<i64> {
        match self {
            Value::I64(i) => Some(*i),
            _ => None,
        }
    }

    /// Get as f32 if this is an f32
    #[inline]
    pub const fn as_f32(&self) -> Option<f32> {
        match self {
            Value::F32(f) => Some(*f),
            _ => None,
        }
    }

    /// Get as f64 if this is an f64
    #[inline]
    pub const fn as_f64(&self) -> Option<f64> {
        match self {
            Value::F64(f) => Some(*f),
            _ => None,
        }
    }
}

impl std::fmt::Debug for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Void => write!(f, "Value::Void"),
            Value::Bool(b) => write!(f, "Value::Bool({})", b),
            Value::I8(i) => write!(f, "Value::I8({})", i),
            Value::I16(i) => write!(f, "Value::I16({})", i),
            Value::I32(i) => write!(f, "Value::I32({})", i),
            Value::I64(i) => write!(f, "Value::I64({})", i),
            Value::F32(x) => write!(f, "Value::F32({})", x),
            Value::F64(x) => write!(f, "Value::F64({})", x),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accessors_do_not_coerce() {
        let v = Value::I16(7);
        assert_eq!(v.as_i16(), Some(7));
        assert_eq!(v.as_i32(), None);
        assert_eq!(v.as_i64(), None);

        let v = Value::F32(1.5);
        assert_eq!(v.as_f32(), Some(1.5));
        assert_eq!(v.as_f64(), None);
    }

    #[test]
    fn test_value_type_and_name() {
        assert_eq!(Value::Bool(true).value_type(), ValueType::Bool);
        assert_eq!(Value::I64(1).type_name(), "i64");
        assert!(Value::default().is_void());
    }
}
