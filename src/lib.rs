//! # bencode — BitTorrent Bencode value model and codec
//!
//! Bencode is the length-prefixed, self-delimiting format used for `.torrent`
//! metadata, tracker responses and peer-wire extension messages. This crate
//! provides a tagged-union [`Value`] model plus a streaming decoder and a
//! canonical encoder, along with structure-only helpers built on the same
//! grammar.
//!
//! ## Wire format
//!
//! | Value | Encoding | Example |
//! |-------|----------|---------|
//! | Byte string | `<len>:<bytes>` | `4:spam` |
//! | Integer | `i<decimal>e` | `i-42e`, `i0e` |
//! | List | `l<items>e` | `l4:spami42ee` |
//! | Dictionary | `d<key><value>...e`, keys sorted byte-wise | `d3:bari1e3:fooi2ee` |
//!
//! ## Modules
//!
//! - **value**: [`Value`] and typed accessors that fail with [`CodecError::TypeMismatch`]
//! - **codec**: [`Codec`] decode (any [`ByteSource`], i.e. any `BufRead`) and encode (any `Write`)
//! - **stream**: several values back to back, with byte ranges
//! - **walk**: zero-copy extent / span / validation without building values
//! - **lint**: canonical-form findings and rewrite (also the `bencode_lint` binary)
//!
//! ## Usage
//!
//! ```
//! use bencode::{decode, encode, Value};
//!
//! let v = Value::dictionary([("num", Value::integer(123)), ("hello", Value::string("world"))]);
//! let bytes = encode(&v);
//! assert_eq!(bytes, b"d5:hello5:world3:numi123ee");
//! assert_eq!(decode(&bytes).unwrap(), v);
//! ```
//!
//! Streaming from a reader leaves it positioned right after the value:
//!
//! ```
//! use bencode::Codec;
//! use std::io::BufReader;
//!
//! let mut src = BufReader::new(&b"l5:helloi123ee4:tail"[..]);
//! let (list, consumed) = Codec::default().decode_value(&mut src).unwrap();
//! assert_eq!(consumed, 14);
//! assert_eq!(list.as_list().unwrap().len(), 2);
//! ```

pub mod codec;
pub mod lint;
pub mod source;
pub mod stream;
pub mod value;
pub mod walk;

pub use codec::{decode, encode, Codec, CodecError, CodecOptions, DuplicateKeyPolicy};
pub use source::ByteSource;
pub use stream::{decode_stream, StreamDecodeResult, ValueIter};
pub use value::{Value, ValueKind};
pub use walk::{find_dict_value, validate, value_extent, BencodeWalker};
