//! Declared parameter and return types
//!
//! Types are written with single-character descriptors in signature
//! strings (`V Z B S I J F D`). Reference and array descriptors
//! (`Ljava/lang/String;`, `[I`) are accepted by the parser but have no
//! packed representation; they surface as [`ValueType::Other`].

use std::fmt;

/// Declared type of a parameter or a return value.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ValueType {
    /// `V`
    Void,
    /// `Z`
    Bool,
    /// `B`
    I8,
    /// `S`
    I16,
    /// `I`
    I32,
    /// `J`
    I64,
    /// `F`
    F32,
    /// `D`
    F64,
    /// Any other descriptor, kept verbatim
    Other(String),
}

impl ValueType {
    /// Map a primitive descriptor character to its type
    pub fn from_descriptor_char(c: char) -> Option<Self> {
        Some(match c {
            'V' => ValueType::Void,
            'Z' => ValueType::Bool,
            'B' => ValueType::I8,
            'S' => ValueType::I16,
            'I' => ValueType::I32,
            'J' => ValueType::I64,
            'F' => ValueType::F32,
            'D' => ValueType::F64,
            _ => return None,
        })
    }

    /// Display name used in traces and type-mismatch errors
    pub fn name(&self) -> &str {
        match self {
            ValueType::Void => "void",
            ValueType::Bool => "bool",
            ValueType::I8 => "i8",
            ValueType::I16 => "i16",
            ValueType::I32 => "i32",
            ValueType::I64 => "i64",
            ValueType::F32 => "f32",
            ValueType::F64 => "f64",
            ValueType::Other(desc) => desc,
        }
    }

    /// Size in bytes of this type inside a packed argument buffer.
    ///
    /// `None` for `Void` and `Other`, which cannot be passed as arguments.
    pub const fn packed_size(&self) -> Option<usize> {
        match self {
            ValueType::Bool | ValueType::I8 => Some(1),
            ValueType::I16 => Some(2),
            ValueType::I32 | ValueType::F32 => Some(4),
            ValueType::I64 | ValueType::F64 => Some(8),
            ValueType::Void | ValueType::Other(_) => None,
        }
    }

    /// Check if this type can appear in a packed argument buffer
    pub const fn is_primitive(&self) -> bool {
        self.packed_size().is_some()
    }
}

impl fmt::Display for ValueType {
    /// Writes the descriptor form (`I`, `[J`, `Lfoo;`)
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueType::Void => f.write_str("V"),
            ValueType::Bool => f.write_str("Z"),
            ValueType::I8 => f.write_str("B"),
            ValueType::I16 => f.write_str("S"),
            ValueType::I32 => f.write_str("I"),
            ValueType::I64 => f.write_str("J"),
            ValueType::F32 => f.write_str("F"),
            ValueType::F64 => f.write_str("D"),
            ValueType::Other(desc) => f.write_str(desc),
        }
    }
}
