//! Runtime values for encoding/decoding (bencode value tree).

use crate::codec::CodecError;
use std::collections::HashMap;
use std::fmt;

/// A single decoded value (leaf or container).
///
/// Dictionaries are stored unordered; canonical key order is applied by the
/// encoder, so two dictionaries compare equal whenever they hold the same
/// key/value pairs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    /// Raw byte string, not necessarily UTF-8.
    String(Vec<u8>),
    Integer(i64),
    List(Vec<Value>),
    Dictionary(HashMap<Vec<u8>, Value>),
}

/// Variant tag of a [`Value`], used in type-mismatch errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    String,
    Integer,
    List,
    Dictionary,
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ValueKind::String => "string",
            ValueKind::Integer => "integer",
            ValueKind::List => "list",
            ValueKind::Dictionary => "dictionary",
        };
        f.write_str(name)
    }
}

impl Value {
    pub fn string(bytes: impl Into<Vec<u8>>) -> Self {
        Value::String(bytes.into())
    }

    pub fn integer(n: i64) -> Self {
        Value::Integer(n)
    }

    pub fn list(items: Vec<Value>) -> Self {
        Value::List(items)
    }

    /// Build a dictionary from key/value pairs. Later pairs replace earlier ones with the same key.
    pub fn dictionary<K, I>(entries: I) -> Self
    where
        K: Into<Vec<u8>>,
        I: IntoIterator<Item = (K, Value)>,
    {
        Value::Dictionary(entries.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    pub fn kind(&self) -> ValueKind {
        match self {
            Value::String(_) => ValueKind::String,
            Value::Integer(_) => ValueKind::Integer,
            Value::List(_) => ValueKind::List,
            Value::Dictionary(_) => ValueKind::Dictionary,
        }
    }

    pub fn is_string(&self) -> bool {
        matches!(self, Value::String(_))
    }

    pub fn is_integer(&self) -> bool {
        matches!(self, Value::Integer(_))
    }

    pub fn is_list(&self) -> bool {
        matches!(self, Value::List(_))
    }

    pub fn is_dictionary(&self) -> bool {
        matches!(self, Value::Dictionary(_))
    }

    pub fn as_bytes(&self) -> Result<&[u8], CodecError> {
        match self {
            Value::String(b) => Ok(b),
            other => Err(other.mismatch(ValueKind::String)),
        }
    }

    /// String payload as UTF-8 text. Fails with `InvalidUtf8` on non-text bytes.
    pub fn as_str(&self) -> Result<&str, CodecError> {
        std::str::from_utf8(self.as_bytes()?).map_err(|_| CodecError::InvalidUtf8)
    }

    pub fn as_integer(&self) -> Result<i64, CodecError> {
        match self {
            Value::Integer(n) => Ok(*n),
            other => Err(other.mismatch(ValueKind::Integer)),
        }
    }

    pub fn as_list(&self) -> Result<&[Value], CodecError> {
        match self {
            Value::List(v) => Ok(v),
            other => Err(other.mismatch(ValueKind::List)),
        }
    }

    pub fn as_dictionary(&self) -> Result<&HashMap<Vec<u8>, Value>, CodecError> {
        match self {
            Value::Dictionary(m) => Ok(m),
            other => Err(other.mismatch(ValueKind::Dictionary)),
        }
    }

    pub fn into_bytes(self) -> Result<Vec<u8>, CodecError> {
        match self {
            Value::String(b) => Ok(b),
            other => Err(other.mismatch(ValueKind::String)),
        }
    }

    pub fn into_list(self) -> Result<Vec<Value>, CodecError> {
        match self {
            Value::List(v) => Ok(v),
            other => Err(other.mismatch(ValueKind::List)),
        }
    }

    pub fn into_dictionary(self) -> Result<HashMap<Vec<u8>, Value>, CodecError> {
        match self {
            Value::Dictionary(m) => Ok(m),
            other => Err(other.mismatch(ValueKind::Dictionary)),
        }
    }

    /// Look up `key` in a dictionary. `None` for missing keys and for non-dictionary values.
    pub fn get(&self, key: &[u8]) -> Option<&Value> {
        match self {
            Value::Dictionary(m) => m.get(key),
            _ => None,
        }
    }

    fn mismatch(&self, expected: ValueKind) -> CodecError {
        CodecError::TypeMismatch {
            expected,
            found: self.kind(),
        }
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Integer(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Integer(n as i64)
    }
}

impl From<u32> for Value {
    fn from(n: u32) -> Self {
        Value::Integer(n as i64)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.as_bytes().to_vec())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s.into_bytes())
    }
}

impl From<&[u8]> for Value {
    fn from(b: &[u8]) -> Self {
        Value::String(b.to_vec())
    }
}

impl From<Vec<u8>> for Value {
    fn from(b: Vec<u8>) -> Self {
        Value::String(b)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::List(items)
    }
}

impl From<HashMap<Vec<u8>, Value>> for Value {
    fn from(m: HashMap<Vec<u8>, Value>) -> Self {
        Value::Dictionary(m)
    }
}
