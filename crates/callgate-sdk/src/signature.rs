//! Method signature strings
//!
//! A signature is `name(PARAMS)RET`, e.g. `add(II)I` or `reset()V`. The
//! qualified form used during resolution prefixes the owner type:
//! `com.example.Math/square(I)I`.

use std::fmt;

use crate::types::ValueType;

/// A signature string could not be parsed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SignatureError {
    /// The method name is empty
    #[error("missing method name in `{0}`")]
    MissingName(String),

    /// No parameter list was found
    #[error("missing parameter list in `{0}`")]
    MissingParams(String),

    /// A descriptor could not be read
    #[error("bad type descriptor at offset {offset} in `{signature}`")]
    BadDescriptor {
        /// Full signature text
        signature: String,
        /// Byte offset of the bad descriptor
        offset: usize,
    },

    /// Zero or more than one return type follows the parameter list
    #[error("expected exactly one return type in `{0}`")]
    BadReturn(String),
}

/// Parsed method signature.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MethodSignature {
    name: String,
    params: Vec<ValueType>,
    ret: ValueType,
}

impl MethodSignature {
    /// Build a signature from its parts
    pub fn new(name: impl Into<String>, params: Vec<ValueType>, ret: ValueType) -> Self {
        MethodSignature {
            name: name.into(),
            params,
            ret,
        }
    }

    /// Parse `name(PARAMS)RET`
    pub fn parse(text: &str) -> Result<Self, SignatureError> {
        let open = text
            .find('(')
            .ok_or_else(|| SignatureError::MissingParams(text.to_string()))?;
        let close = text[open..]
            .find(')')
            .map(|i| open + i)
            .ok_or_else(|| SignatureError::MissingParams(text.to_string()))?;

        let name = &text[..open];
        if name.is_empty() {
            return Err(SignatureError::MissingName(text.to_string()));
        }

        let mut params = Vec::new();
        let mut pos = open + 1;
        while pos < close {
            let (ty, next) = parse_descriptor(text, pos, close)?;
            if ty == ValueType::Void {
                return Err(SignatureError::BadDescriptor {
                    signature: text.to_string(),
                    offset: pos,
                });
            }
            params.push(ty);
            pos = next;
        }

        let end = text.len();
        if close + 1 >= end {
            return Err(SignatureError::BadReturn(text.to_string()));
        }
        let (ret, next) = parse_descriptor(text, close + 1, end)?;
        if next != end {
            return Err(SignatureError::BadReturn(text.to_string()));
        }

        Ok(MethodSignature {
            name: name.to_string(),
            params,
            ret,
        })
    }

    /// Method name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declared parameter types, in order
    pub fn params(&self) -> &[ValueType] {
        &self.params
    }

    /// Declared return type
    pub fn ret(&self) -> &ValueType {
        &self.ret
    }

    /// Render `owner/name(PARAMS)RET`
    pub fn qualified(&self, owner: &str) -> String {
        format!("{}/{}", owner, self)
    }
}

impl fmt::Display for MethodSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(", self.name)?;
        for p in &self.params {
            write!(f, "{}", p)?;
        }
        write!(f, "){}", self.ret)
    }
}

impl std::str::FromStr for MethodSignature {
    type Err = SignatureError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        MethodSignature::parse(s)
    }
}

/// Read one descriptor starting at `pos`, not past `end`.
fn parse_descriptor(
    text: &str,
    pos: usize,
    end: usize,
) -> Result<(ValueType, usize), SignatureError> {
    let bad = || SignatureError::BadDescriptor {
        signature: text.to_string(),
        offset: pos,
    };
    let bytes = text.as_bytes();
    let c = *bytes.get(pos).ok_or_else(bad)? as char;

    if let Some(ty) = ValueType::from_descriptor_char(c) {
        return Ok((ty, pos + 1));
    }

    match c {
        'L' => {
            let semi = text[pos..end].find(';').ok_or_else(bad)? + pos;
            if semi == pos + 1 {
                return Err(bad());
            }
            Ok((ValueType::Other(text[pos..=semi].to_string()), semi + 1))
        }
        '[' => {
            let (elem, next) = parse_descriptor(text, pos + 1, end)?;
            if elem == ValueType::Void {
                return Err(bad());
            }
            Ok((ValueType::Other(format!("[{}", elem)), next))
        }
        _ => Err(bad()),
    }
}
