//! Peekable byte sources for the decoder.
//!
//! Decoding needs one byte of lookahead plus sequential reads. Any [`BufRead`]
//! already provides that through its internal buffer, so the caller picks the
//! buffering once (a byte slice, a `Cursor`, a `BufReader` over a file or
//! socket) and the decoder works against [`ByteSource`] only.

use crate::codec::CodecError;
use std::io::{self, BufRead, Read};

/// Chunk size used when reading a length-prefixed string, so an untrusted
/// length never turns into a single large allocation.
const READ_CHUNK: usize = 64 * 1024;

/// Sequential byte input with single-byte lookahead.
pub trait ByteSource {
    /// Next byte without consuming it; `None` at end of input.
    fn peek(&mut self) -> Result<Option<u8>, CodecError>;

    /// Consume and return the next byte; `None` at end of input.
    fn read_byte(&mut self) -> Result<Option<u8>, CodecError>;

    /// Consume exactly `n` bytes. Fails with `UnexpectedEnd` if fewer remain.
    fn read_exact_bytes(&mut self, n: usize) -> Result<Vec<u8>, CodecError>;
}

impl<R: BufRead> ByteSource for R {
    fn peek(&mut self) -> Result<Option<u8>, CodecError> {
        loop {
            match self.fill_buf() {
                Ok(buf) => return Ok(buf.first().copied()),
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(read_error(e)),
            }
        }
    }

    fn read_byte(&mut self) -> Result<Option<u8>, CodecError> {
        let b = ByteSource::peek(self)?;
        if b.is_some() {
            self.consume(1);
        }
        Ok(b)
    }

    fn read_exact_bytes(&mut self, n: usize) -> Result<Vec<u8>, CodecError> {
        let mut out = Vec::with_capacity(n.min(READ_CHUNK));
        while out.len() < n {
            let want = (n - out.len()).min(READ_CHUNK) as u64;
            let got = self
                .by_ref()
                .take(want)
                .read_to_end(&mut out)
                .map_err(read_error)?;
            if got == 0 {
                return Err(CodecError::UnexpectedEnd);
            }
        }
        Ok(out)
    }
}

fn read_error(e: io::Error) -> CodecError {
    match e.kind() {
        io::ErrorKind::UnexpectedEof => CodecError::UnexpectedEnd,
        _ => CodecError::SourceRead(e),
    }
}
