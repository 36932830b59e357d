//! Zero-copy walk over encoded bencode.
//!
//! This module provides **structure-only** traversal: it advances a byte position
//! through the grammar without building [`Value`](crate::value::Value) trees.
//! Use it when you need extent (byte length of one value), the raw span of a
//! dictionary entry, or a well-formedness check without full decode.
//!
//! ## When to use walk vs codec
//!
//! | Use case | Prefer |
//! |----------|--------|
//! | Byte length of the value at an offset | [`value_extent`] |
//! | Raw bytes of one top-level dictionary entry (e.g. `info` for hashing) | [`find_dict_value`] |
//! | Check a buffer is exactly one well-formed value | [`validate`] |
//! | Full decode for inspection | [codec](crate::codec) |
//!
//! Grammar checks (leading zeros, `-0`, key types, truncation) match the
//! decoder and produce the same [`CodecError`] kinds. Duplicate and unsorted
//! keys are not checked here; see [lint](crate::lint).
//!
//! ## Example
//!
//! ```
//! use bencode::walk::{find_dict_value, value_extent};
//!
//! let torrent = b"d8:announce3:url4:infod4:name1:aee";
//! assert_eq!(value_extent(torrent, 0).unwrap(), torrent.len());
//! let span = find_dict_value(torrent, b"info").unwrap().unwrap();
//! assert_eq!(&torrent[span], b"d4:name1:ae");
//! ```

use crate::codec::{CodecError, DEFAULT_MAX_DEPTH};
use std::ops::Range;

/// Cursor over an encoded buffer. Reads borrow from the buffer; nothing is copied.
#[derive(Debug, Clone)]
pub struct BencodeWalker<'a> {
    data: &'a [u8],
    pos: usize,
    max_depth: usize,
}

impl<'a> BencodeWalker<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self::at(data, 0)
    }

    pub fn at(data: &'a [u8], pos: usize) -> Self {
        BencodeWalker {
            data,
            pos,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn data(&self) -> &'a [u8] {
        self.data
    }

    pub fn is_at_end(&self) -> bool {
        self.pos >= self.data.len()
    }

    pub fn peek(&self) -> Option<u8> {
        self.data.get(self.pos).copied()
    }

    fn bump(&mut self) -> Option<u8> {
        let b = self.peek()?;
        self.pos += 1;
        Some(b)
    }

    /// Consume `byte` or fail: `UnexpectedEnd` at end of input, `InvalidFormat` otherwise.
    pub fn expect(&mut self, byte: u8) -> Result<(), CodecError> {
        match self.peek() {
            Some(b) if b == byte => {
                self.pos += 1;
                Ok(())
            }
            Some(b) => Err(CodecError::InvalidFormat(Some(b))),
            None => Err(CodecError::UnexpectedEnd),
        }
    }

    /// Read `<len>:<bytes>` and return the string payload as a slice of the buffer.
    pub fn read_string(&mut self) -> Result<&'a [u8], CodecError> {
        let mut len: usize = 0;
        let mut digits = 0usize;
        loop {
            match self.bump() {
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
        let remaining = self.data.len() - self.pos;
        if len > remaining {
            return Err(CodecError::UnexpectedEnd);
        }
        let s = &self.data[self.pos..self.pos + len];
        self.pos += len;
        Ok(s)
    }

    /// Read `i<digits>e`.
    pub fn read_integer(&mut self) -> Result<i64, CodecError> {
        match self.bump() {
            Some(b'i') => {}
            other => return Err(CodecError::InvalidFormat(other)),
        }
        let start = self.pos;
        let end = match self.data[start..].iter().position(|&b| b == b'e') {
            Some(i) => start + i,
            None => return Err(CodecError::MalformedInteger("missing terminator 'e'".into())),
        };
        let n = parse_integer(&self.data[start..end])?;
        self.pos = end + 1;
        Ok(n)
    }

    /// Skip one complete value.
    pub fn skip_value(&mut self) -> Result<(), CodecError> {
        self.skip_nested(0)
    }

    fn skip_nested(&mut self, depth: usize) -> Result<(), CodecError> {
        match self.peek() {
            Some(b'0'..=b'9') => self.read_string().map(|_| ()),
            Some(b'i') => self.read_integer().map(|_| ()),
            Some(b'l') => {
                self.enter(depth + 1)?;
                while !self.at_container_end()? {
                    self.skip_nested(depth + 1)?;
                }
                Ok(())
            }
            Some(b'd') => {
                self.enter(depth + 1)?;
                while !self.at_container_end()? {
                    self.read_key()?;
                    self.skip_nested(depth + 1)?;
                }
                Ok(())
            }
            other => Err(CodecError::InvalidFormat(other)),
        }
    }

    /// Consume the opening byte of a container at nesting `depth`.
    pub(crate) fn enter(&mut self, depth: usize) -> Result<(), CodecError> {
        if depth > self.max_depth {
            return Err(CodecError::NestingTooDeep(self.max_depth));
        }
        self.pos += 1;
        Ok(())
    }

    /// True (and the `e` consumed) when the current container is closed.
    pub(crate) fn at_container_end(&mut self) -> Result<bool, CodecError> {
        match self.peek() {
            None => Err(CodecError::UnexpectedEnd),
            Some(b'e') => {
                self.pos += 1;
                Ok(true)
            }
            Some(_) => Ok(false),
        }
    }

    /// Read a dictionary key; non-string keys are `InvalidDictKey`.
    pub(crate) fn read_key(&mut self) -> Result<&'a [u8], CodecError> {
        match self.peek() {
            Some(b'0'..=b'9') => self.read_string(),
            Some(b) => Err(CodecError::InvalidDictKey(b)),
            None => Err(CodecError::UnexpectedEnd),
        }
    }
}

/// Parse the digits between `i` and `e` with the decoder's canonical-form rules.
fn parse_integer(text: &[u8]) -> Result<i64, CodecError> {
    let (negative, digits) = match text.split_first() {
        Some((b'-', rest)) => (true, rest),
        _ => (false, text),
    };
    if digits.is_empty() {
        return Err(CodecError::MalformedInteger("no digits".into()));
    }
    if let Some(&b) = digits.iter().find(|b| !b.is_ascii_digit()) {
        return Err(CodecError::MalformedInteger(format!("unexpected byte 0x{:02x}", b)));
    }
    if digits[0] == b'0' && digits.len() > 1 {
        return Err(CodecError::MalformedInteger("leading zero".into()));
    }
    if negative && digits == b"0" {
        return Err(CodecError::MalformedInteger("negative zero".into()));
    }
    let mut n: i64 = 0;
    for &b in digits {
        let d = (b - b'0') as i64;
        n = n
            .checked_mul(10)
            .and_then(|n| if negative { n.checked_sub(d) } else { n.checked_add(d) })
            .ok_or_else(|| CodecError::MalformedInteger("overflows i64".into()))?;
    }
    Ok(n)
}

/// Number of bytes occupied by the value starting at `pos`.
pub fn value_extent(data: &[u8], pos: usize) -> Result<usize, CodecError> {
    let mut w = BencodeWalker::at(data, pos);
    w.skip_value()?;
    Ok(w.position() - pos)
}

/// Raw byte span of the value stored under `key` in the top-level dictionary.
///
/// Returns `Ok(None)` if the key is absent. The whole dictionary is walked, so a
/// malformed entry after the match is still reported.
pub fn find_dict_value(data: &[u8], key: &[u8]) -> Result<Option<Range<usize>>, CodecError> {
    let mut w = BencodeWalker::new(data);
    match w.peek() {
        Some(b'd') => {}
        other => return Err(CodecError::InvalidFormat(other)),
    }
    w.enter(1)?;
    let mut found = None;
    while !w.at_container_end()? {
        let k = w.read_key()?;
        let start = w.position();
        w.skip_nested(1)?;
        if found.is_none() && k == key {
            found = Some(start..w.position());
        }
    }
    Ok(found)
}

/// Check that `data` is exactly one well-formed value.
pub fn validate(data: &[u8]) -> Result<(), CodecError> {
    let mut w = BencodeWalker::new(data);
    w.skip_value()?;
    if !w.is_at_end() {
        return Err(CodecError::TrailingData { offset: w.position() });
    }
    Ok(())
}
