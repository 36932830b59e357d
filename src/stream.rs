//! Stream handling: decode input that holds several bencode values back to back.
//!
//! Bencode values are self-delimiting, so a buffer or reader may carry a run of
//! top-level values (e.g. consecutive peer-wire payloads). Decoding stops at the
//! first malformed value: there is no resynchronization inside the grammar.

use crate::codec::{Codec, CodecError};
use crate::source::ByteSource;
use crate::value::Value;
use std::ops::Range;

/// Result of decoding a buffer of back-to-back values.
#[derive(Debug)]
pub struct StreamDecodeResult {
    /// Values decoded before the end of input or the first error, in input order.
    pub values: Vec<DecodedValue>,
    /// Set when decoding stopped on a malformed value.
    pub error: Option<StreamError>,
}

#[derive(Debug)]
pub struct DecodedValue {
    pub value: Value,
    pub byte_range: Range<usize>,
}

#[derive(Debug)]
pub struct StreamError {
    /// Offset of the first byte of the value that failed.
    pub offset: usize,
    pub error: CodecError,
}

impl StreamDecodeResult {
    pub fn is_complete(&self) -> bool {
        self.error.is_none()
    }

    /// Number of input bytes covered by successfully decoded values.
    pub fn consumed(&self) -> usize {
        self.values.last().map(|v| v.byte_range.end).unwrap_or(0)
    }
}

/// Decode every top-level value in `bytes`, recording each value's byte range.
pub fn decode_stream(codec: &Codec, bytes: &[u8]) -> StreamDecodeResult {
    let mut values = Vec::new();
    let mut offset = 0;

    while offset < bytes.len() {
        let mut src = &bytes[offset..];
        match codec.decode_value(&mut src) {
            Ok((value, consumed)) => {
                values.push(DecodedValue {
                    value,
                    byte_range: offset..offset + consumed,
                });
                offset += consumed;
            }
            Err(error) => {
                return StreamDecodeResult {
                    values,
                    error: Some(StreamError { offset, error }),
                };
            }
        }
    }

    StreamDecodeResult { values, error: None }
}

/// Re-encode decoded values back to back in canonical form.
pub fn encode_stream<'a, I>(codec: &Codec, values: I) -> Vec<u8>
where
    I: IntoIterator<Item = &'a Value>,
{
    let mut out = Vec::new();
    for v in values {
        out.extend(codec.encode_to_vec(v));
    }
    out
}

/// Iterator over top-level values read one at a time from a [`ByteSource`].
///
/// Ends cleanly when the source is exhausted between values. After an error the
/// iterator is fused and yields `None`.
#[derive(Debug)]
pub struct ValueIter<S> {
    codec: Codec,
    src: S,
    position: usize,
    failed: bool,
}

impl<S: ByteSource> ValueIter<S> {
    pub fn new(codec: Codec, src: S) -> Self {
        ValueIter {
            codec,
            src,
            position: 0,
            failed: false,
        }
    }

    /// Bytes consumed from the source so far.
    pub fn position(&self) -> usize {
        self.position
    }

    pub fn into_inner(self) -> S {
        self.src
    }
}

impl<S: ByteSource> Iterator for ValueIter<S> {
    type Item = Result<Value, CodecError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        match self.src.peek() {
            Ok(None) => return None,
            Ok(Some(_)) => {}
            Err(e) => {
                self.failed = true;
                return Some(Err(e));
            }
        }
        match self.codec.decode_value(&mut self.src) {
            Ok((value, consumed)) => {
                self.position += consumed;
                Some(Ok(value))
            }
            Err(e) => {
                self.failed = true;
                Some(Err(e))
            }
        }
    }
}
