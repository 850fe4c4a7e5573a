//! Packed argument layout
//!
//! Arguments are laid out back to back, little-endian, each aligned to its
//! own size relative to the start of the buffer:
//!
//! ```text
//! bool / i8   1 byte  (bool is 0 or 1)
//! i16         2 bytes
//! i32 / f32   4 bytes
//! i64 / f64   8 bytes
//! ```
//!
//! There is no header and no trailing padding, so the buffer length is
//! fully determined by the parameter types.

use callgate_sdk::{DecodeError, Value, ValueType};

/// A value could not be appended to a packed buffer.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PackError {
    /// `Value::Void` has no packed representation
    #[error("void cannot be passed as an argument")]
    VoidArgument,
}

#[inline]
fn align_up(offset: usize, align: usize) -> usize {
    (offset + align - 1) & !(align - 1)
}

/// Builder for a packed argument buffer.
#[derive(Debug, Default, Clone)]
pub struct ArgPacker {
    bytes: Vec<u8>,
    count: usize,
}

impl ArgPacker {
    /// Create an empty packer
    pub fn new() -> Self {
        Self::default()
    }

    fn put(&mut self, data: &[u8]) -> &mut Self {
        let start = align_up(self.bytes.len(), data.len());
        self.bytes.resize(start, 0);
        self.bytes.extend_from_slice(data);
        self.count += 1;
        self
    }

    /// Append a bool
    pub fn bool(&mut self, b: bool) -> &mut Self {
        self.put(&[b as u8])
    }

    /// Append an i8
    pub fn i8(&mut self, v: i8) -> &mut Self {
        self.put(&v.to_le_bytes())
    }

    /// Append an i16
    pub fn i16(&mut self, v: i16) -> &mut Self {
        self.put(&v.to_le_bytes())
    }

    /// Append an i32
    pub fn i32(&mut self, v: i32) -> &mut Self {
        self.put(&v.to_le_bytes())
    }

    /// Append an i64
    pub fn i64(&mut self, v: i64) -> &mut Self {
        self.put(&v.to_le_bytes())
    }

    /// Append an f32
    pub fn f32(&mut self, v: f32) -> &mut Self {
        self.put(&v.to_le_bytes())
    }

    /// Append an f64
    pub fn f64(&mut self, v: f64) -> &mut Self {
        self.put(&v.to_le_bytes())
    }

    /// Append a boxed value
    pub fn value(&mut self, value: Value) -> Result<&mut Self, PackError> {
        Ok(match value {
            Value::Void => return Err(PackError::VoidArgument),
            Value::Bool(b) => self.bool(b),
            Value::I8(v) => self.i8(v),
            Value::I16(v) => self.i16(v),
            Value::I32(v) => self.i32(v),
            Value::I64(v) => self.i64(v),
            Value::F32(v) => self.f32(v),
            Value::F64(v) => self.f64(v),
        })
    }

    /// Number of values appended so far
    pub fn count(&self) -> usize {
        self.count
    }

    /// Packed bytes
    pub fn finish(self) -> Vec<u8> {
        self.bytes
    }
}

/// Decode `bytes` as exactly one value per entry of `types`.
pub fn unpack(bytes: &[u8], types: &[ValueType]) -> Result<Vec<Value>, DecodeError> {
    let mut values = Vec::with_capacity(types.len());
    let mut offset = 0usize;

    for ty in types {
        let size = ty
            .packed_size()
            .ok_or_else(|| DecodeError::UnsupportedType(ty.name().to_string()))?;
        offset = align_up(offset, size);
        let end = offset + size;
        let raw = bytes.get(offset..end).ok_or(DecodeError::Truncated {
            offset,
            needed: size,
            len: bytes.len(),
        })?;

        let value = match ty {
            ValueType::Bool => match raw[0] {
                0 => Value::Bool(false),
                1 => Value::Bool(true),
                _ => {
                    return Err(DecodeError::InvalidEncoding {
                        ty: ty.name().to_string(),
                        offset,
                    })
                }
            },
            ValueType::I8 => Value::I8(raw[0] as i8),
            ValueType::I16 => Value::I16(i16::from_le_bytes([raw[0], raw[1]])),
            ValueType::I32 => Value::I32(i32::from_le_bytes(word4(raw))),
            ValueType::F32 => Value::F32(f32::from_le_bytes(word4(raw))),
            ValueType::I64 => Value::I64(i64::from_le_bytes(word8(raw))),
            ValueType::F64 => Value::F64(f64::from_le_bytes(word8(raw))),
            ValueType::Void | ValueType::Other(_) => {
                return Err(DecodeError::UnsupportedType(ty.name().to_string()))
            }
        };
        values.push(value);
        offset = end;
    }

    if offset != bytes.len() {
        return Err(DecodeError::TrailingBytes {
            count: values.len(),
            trailing: bytes.len() - offset,
        });
    }
    Ok(values)
}

fn word4(raw: &[u8]) -> [u8; 4] {
    [raw[0], raw[1], raw[2], raw[3]]
}

fn word8(raw: &[u8]) -> [u8; 8] {
    [raw[0], raw[1], raw[2], raw[3], raw[4], raw[5], raw[6], raw[7]]
}
