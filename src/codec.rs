//! Encode/decode bencode values.
//!
//! Decoding is a recursive descent over a [`ByteSource`] with one byte of lookahead;
//! it consumes exactly one top-level value and reports how many bytes it used.
//! Encoding writes canonical form (dictionary keys sorted byte-wise, minimal integers)
//! to any [`Write`] sink and reports how many bytes it wrote.

use crate::source::ByteSource;
use crate::stream::ValueIter;
use crate::value::{Value, ValueKind};
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::io::Write;

/// Default limit on container nesting (lists and dictionaries).
pub const DEFAULT_MAX_DEPTH: usize = 64;

#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    #[error("unexpected end of input")]
    UnexpectedEnd,
    #[error("malformed string length: {0}")]
    MalformedLength(String),
    #[error("malformed integer: {0}")]
    MalformedInteger(String),
    #[error("dictionary key must be a string, found byte 0x{0:02x}")]
    InvalidDictKey(u8),
    #[error("duplicate dictionary key: {}", String::from_utf8_lossy(.0))]
    DuplicateKey(Vec<u8>),
    #[error("invalid format: {}", describe_byte(.0))]
    InvalidFormat(Option<u8>),
    #[error("type mismatch: expected {expected}, found {found}")]
    TypeMismatch { expected: ValueKind, found: ValueKind },
    #[error("nesting deeper than {0} levels")]
    NestingTooDeep(usize),
    #[error("trailing data at offset {offset}")]
    TrailingData { offset: usize },
    #[error("string is not valid UTF-8")]
    InvalidUtf8,
    #[error("source read: {0}")]
    SourceRead(#[source] std::io::Error),
    #[error("sink write: {0}")]
    SinkWrite(#[source] std::io::Error),
}

fn describe_byte(b: &Option<u8>) -> String {
    match *b {
        Some(b) if b.is_ascii_graphic() => format!("unexpected byte '{}'", b as char),
        Some(b) => format!("unexpected byte 0x{:02x}", b),
        None => "expected a value, found end of input".to_string(),
    }
}

/// What the decoder does when a dictionary repeats a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DuplicateKeyPolicy {
    /// Fail with [`CodecError::DuplicateKey`].
    #[default]
    Reject,
    /// Keep the value of the last occurrence.
    LastWins,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CodecOptions {
    /// Maximum number of nested containers; deeper input fails with `NestingTooDeep`.
    pub max_depth: usize,
    /// Maximum declared string length accepted by the decoder.
    pub max_string_len: usize,
    pub duplicate_keys: DuplicateKeyPolicy,
}

impl Default for CodecOptions {
    fn default() -> Self {
        CodecOptions {
            max_depth: DEFAULT_MAX_DEPTH,
            max_string_len: usize::MAX,
            duplicate_keys: DuplicateKeyPolicy::Reject,
        }
    }
}

impl CodecOptions {
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn with_max_string_len(mut self, max_string_len: usize) -> Self {
        self.max_string_len = max_string_len;
        self
    }

    pub fn with_duplicate_keys(mut self, policy: DuplicateKeyPolicy) -> Self {
        self.duplicate_keys = policy;
        self
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Codec {
    pub options: CodecOptions,
}

impl Codec {
    pub fn new(options: CodecOptions) -> Self {
        Codec { options }
    }

    /// Decode one value from the front of `src`. Returns (value, bytes_consumed).
    /// The source is left positioned right after the value.
    pub fn decode_value<S: ByteSource + ?Sized>(&self, src: &mut S) -> Result<(Value, usize), CodecError> {
        let mut d = Decoder::new(src, &self.options);
        let v = d.value(0)?;
        Ok((v, d.consumed))
    }

    /// Decode a length-prefixed string `<len>:<bytes>`. Returns (bytes, bytes_consumed).
    pub fn decode_string<S: ByteSource + ?Sized>(&self, src: &mut S) -> Result<(Vec<u8>, usize), CodecError> {
        let mut d = Decoder::new(src, &self.options);
        let s = d.string()?;
        Ok((s, d.consumed))
    }

    /// Decode an integer `i<digits>e`. Returns (integer, bytes_consumed).
    pub fn decode_integer<S: ByteSource + ?Sized>(&self, src: &mut S) -> Result<(i64, usize), CodecError> {
        let mut d = Decoder::new(src, &self.options);
        let n = d.integer()?;
        Ok((n, d.consumed))
    }

    /// Decode a buffer holding exactly one value; leftover bytes are `TrailingData`.
    pub fn decode_slice(&self, bytes: &[u8]) -> Result<Value, CodecError> {
        let mut src = bytes;
        let (v, consumed) = self.decode_value(&mut src)?;
        if consumed != bytes.len() {
            return Err(CodecError::TrailingData { offset: consumed });
        }
        Ok(v)
    }

    /// Iterate over back-to-back top-level values read from `src`.
    pub fn iter<S: ByteSource>(&self, src: S) -> ValueIter<S> {
        ValueIter::new(*self, src)
    }

    /// Encode `value` in canonical form. Returns bytes written.
    pub fn encode<W: Write + ?Sized>(&self, w: &mut W, value: &Value) -> Result<usize, CodecError> {
        match value {
            Value::String(b) => self.encode_string(w, b),
            Value::Integer(n) => self.encode_integer(w, *n),
            Value::List(items) => self.encode_list(w, items),
            Value::Dictionary(entries) => self.encode_dict(w, entries),
        }
    }

    /// `<len>:<bytes>`; the empty string is `0:`.
    pub fn encode_string<W: Write + ?Sized>(&self, w: &mut W, bytes: &[u8]) -> Result<usize, CodecError> {
        let header = format!("{}:", bytes.len());
        write_all(w, header.as_bytes())?;
        write_all(w, bytes)?;
        Ok(header.len() + bytes.len())
    }

    pub fn encode_integer<W: Write + ?Sized>(&self, w: &mut W, n: i64) -> Result<usize, CodecError> {
        let text = format!("i{}e", n);
        write_all(w, text.as_bytes())?;
        Ok(text.len())
    }

    pub fn encode_list<W: Write + ?Sized>(&self, w: &mut W, items: &[Value]) -> Result<usize, CodecError> {
        write_all(w, b"l")?;
        let mut written = 1;
        for item in items {
            written += self.encode(w, item)?;
        }
        write_all(w, b"e")?;
        Ok(written + 1)
    }

    /// Entries are written in ascending byte-wise key order regardless of map order.
    pub fn encode_dict<W: Write + ?Sized>(
        &self,
        w: &mut W,
        entries: &HashMap<Vec<u8>, Value>,
    ) -> Result<usize, CodecError> {
        let mut sorted: Vec<(&Vec<u8>, &Value)> = entries.iter().collect();
        sorted.sort_unstable_by(|a, b| a.0.cmp(b.0));

        write_all(w, b"d")?;
        let mut written = 1;
        for (key, value) in sorted {
            written += self.encode_string(w, key)?;
            written += self.encode(w, value)?;
        }
        write_all(w, b"e")?;
        Ok(written + 1)
    }

    pub fn encode_to_vec(&self, value: &Value) -> Vec<u8> {
        let mut out = Vec::new();
        self.encode(&mut out, value)
            .expect("writes into a Vec are infallible");
        out
    }
}

/// Decode a buffer holding exactly one value with default options.
pub fn decode(bytes: &[u8]) -> Result<Value, CodecError> {
    Codec::default().decode_slice(bytes)
}

/// Encode `value` to canonical bytes with default options.
pub fn encode(value: &Value) -> Vec<u8> {
    Codec::default().encode_to_vec(value)
}

fn write_all<W: Write + ?Sized>(w: &mut W, bytes: &[u8]) -> Result<(), CodecError> {
    w.write_all(bytes).map_err(CodecError::SinkWrite)
}

/// Per-call decode state: the source cursor and a running byte count.
struct Decoder<'a, S: ?Sized> {
    src: &'a mut S,
    options: &'a CodecOptions,
    consumed: usize,
}

impl<'a, S: ByteSource + ?Sized> Decoder<'a, S> {
    fn new(src: &'a mut S, options: &'a CodecOptions) -> Self {
        Decoder {
            src,
            options,
            consumed: 0,
        }
    }

    fn peek(&mut self) -> Result<Option<u8>, CodecError> {
        self.src.peek()
    }

    fn next(&mut self) -> Result<Option<u8>, CodecError> {
        let b = self.src.read_byte()?;
        if b.is_some() {
            self.consumed += 1;
        }
        Ok(b)
    }

    /// `depth` is the number of containers enclosing this value.
    fn value(&mut self, depth: usize) -> Result<Value, CodecError> {
        match self.peek()? {
            Some(b'0'..=b'9') => self.string().map(Value::String),
            Some(b'i') => self.integer().map(Value::Integer),
            Some(b'l') => self.list(depth + 1),
            Some(b'd') => self.dictionary(depth + 1),
            other => Err(CodecError::InvalidFormat(other)),
        }
    }

    fn string(&mut self) -> Result<Vec<u8>, CodecError> {
        let mut len: usize = 0;
        let mut digits = 0usize;
        loop {
            match self.next()? {
                None => return Err(CodecError::UnexpectedEnd),
                Some(b':') => break,
                Some(b @ b'0'..=b'9') => {
                    if digits == 1 && len == 0 {
                        return Err(CodecError::MalformedLength("leading zero".into()));
                    }
                    len = len
                        .checked_mul(10)
                        .and_then(|n| n.checked_add((b - b'0') as usize))
                        .ok_or_else(|| CodecError::MalformedLength("length overflows usize".into()))?;
                    digits += 1;
                }
                Some(b) => {
                    return Err(CodecError::MalformedLength(format!(
                        "unexpected byte 0x{:02x} before ':'",
                        b
                    )))
                }
            }
        }
        if digits == 0 {
            return Err(CodecError::MalformedLength("empty length".into()));
        }
        if len > self.options.max_string_len {
            return Err(CodecError::MalformedLength(format!(
                "length {} exceeds limit {}",
                len, self.options.max_string_len
            )));
        }
        let bytes = self.src.read_exact_bytes(len)?;
        self.consumed += len;
        Ok(bytes)
    }

    fn integer(&mut self) -> Result<i64, CodecError> {
        match self.next()? {
            Some(b'i') => {}
            other => return Err(CodecError::InvalidFormat(other)),
        }
        let negative = if self.peek()? == Some(b'-') {
            self.next()?;
            true
        } else {
            false
        };

        // Accumulate toward the sign so i64::MIN parses without overflow.
        let mut n: i64 = 0;
        let mut digits = 0usize;
        loop {
            match self.next()? {
                None => return Err(CodecError::MalformedInteger("missing terminator 'e'".into())),
                Some(b'e') => break,
                Some(b @ b'0'..=b'9') => {
                    if digits == 1 && n == 0 {
                        return Err(CodecError::MalformedInteger("leading zero".into()));
                    }
                    let d = (b - b'0') as i64;
                    n = n
                        .checked_mul(10)
                        .and_then(|n| if negative { n.checked_sub(d) } else { n.checked_add(d) })
                        .ok_or_else(|| CodecError::MalformedInteger("overflows i64".into()))?;
                    digits += 1;
                }
                Some(b) => {
                    return Err(CodecError::MalformedInteger(format!(
                        "unexpected byte 0x{:02x}",
                        b
                    )))
                }
            }
        }
        if digits == 0 {
            return Err(CodecError::MalformedInteger("no digits".into()));
        }
        if negative && n == 0 {
            return Err(CodecError::MalformedInteger("negative zero".into()));
        }
        Ok(n)
    }

    fn enter(&mut self, depth: usize) -> Result<(), CodecError> {
        if depth > self.options.max_depth {
            return Err(CodecError::NestingTooDeep(self.options.max_depth));
        }
        // Opening 'l' or 'd', already peeked.
        self.next()?;
        Ok(())
    }

    /// True when the container's closing 'e' was consumed.
    fn at_end(&mut self) -> Result<bool, CodecError> {
        match self.peek()? {
            None => Err(CodecError::UnexpectedEnd),
            Some(b'e') => {
                self.next()?;
                Ok(true)
            }
            Some(_) => Ok(false),
        }
    }

    fn list(&mut self, depth: usize) -> Result<Value, CodecError> {
        self.enter(depth)?;
        let mut items = Vec::new();
        while !self.at_end()? {
            items.push(self.value(depth)?);
        }
        Ok(Value::List(items))
    }

    fn dictionary(&mut self, depth: usize) -> Result<Value, CodecError> {
        self.enter(depth)?;
        let mut entries = HashMap::new();
        while !self.at_end()? {
            match self.peek()? {
                Some(b'0'..=b'9') => {}
                Some(b) => return Err(CodecError::InvalidDictKey(b)),
                None => return Err(CodecError::UnexpectedEnd),
            }
            let key = self.string()?;
            let value = self.value(depth)?;
            match entries.entry(key) {
                Entry::Vacant(e) => {
                    e.insert(value);
                }
                Entry::Occupied(mut e) => match self.options.duplicate_keys {
                    DuplicateKeyPolicy::Reject => return Err(CodecError::DuplicateKey(e.key().clone())),
                    DuplicateKeyPolicy::LastWins => {
                        e.insert(value);
                    }
                },
            }
        }
        Ok(Value::Dictionary(entries))
    }
}
