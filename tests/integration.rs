//! Integration tests: build values, encode, decode, round-trip, streaming sources and multi-value input.

use bencode::stream::{decode_stream, encode_stream};
use bencode::{decode, encode, Codec, CodecError, Value, ValueKind};
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, Seek, SeekFrom, Write};

fn sample_values() -> Vec<(&'static str, Value, usize)> {
    vec![
        ("empty string", Value::string(""), 2),
        ("string", Value::string("Hello, world!"), 16),
        ("zero", Value::integer(0), 3),
        ("positive", Value::integer(999), 5),
        ("negative", Value::integer(-99), 5),
        ("empty list", Value::list(vec![]), 2),
        ("list", Value::list(vec![Value::string("hello"), Value::integer(123)]), 14),
        ("empty dict", Value::dictionary(Vec::<(&str, Value)>::new()), 2),
        (
            "dict",
            Value::dictionary([("hello", Value::string("world")), ("num", Value::integer(123))]),
            26,
        ),
        (
            "nested",
            Value::dictionary([
                ("z", Value::list(vec![Value::list(vec![]), Value::dictionary([("k", Value::integer(-1))])])),
                ("a", Value::string(vec![0u8, 255, 10])),
            ]),
            26,
        ),
    ]
}

#[test]
fn test_encode_lengths() {
    let codec = Codec::default();
    for (name, value, want_len) in sample_values() {
        let mut out = Vec::new();
        let written = codec.encode(&mut out, &value).expect("encode");
        assert_eq!(written, want_len, "{}: bytes written", name);
        assert_eq!(out.len(), want_len, "{}: output length", name);
    }
}

#[test]
fn test_round_trip() {
    for (name, value, _) in sample_values() {
        let bytes = encode(&value);
        let decoded = decode(&bytes).unwrap_or_else(|e| panic!("{}: {}", name, e));
        assert_eq!(decoded, value, "{}", name);
    }
}

#[test]
fn test_canonical_dict_order() {
    let mut m = HashMap::new();
    m.insert(b"num".to_vec(), Value::integer(123));
    m.insert(b"hello".to_vec(), Value::string("world"));
    assert_eq!(encode(&Value::Dictionary(m)), b"d5:hello5:world3:numi123ee");

    // Same pairs inserted in the other order give identical bytes.
    let a = Value::dictionary([("b", Value::integer(1)), ("a", Value::integer(2)), ("ab", Value::integer(3))]);
    let b = Value::dictionary([("ab", Value::integer(3)), ("a", Value::integer(2)), ("b", Value::integer(1))]);
    assert_eq!(encode(&a), encode(&b));
    assert_eq!(encode(&a), b"d1:ai2e2:abi3e1:bi1ee");
}

#[test]
fn test_keys_sort_bytewise_not_as_text() {
    let v = Value::dictionary([(vec![0xc3u8, 0xa9], Value::integer(1)), (b"z".to_vec(), Value::integer(2))]);
    assert_eq!(encode(&v), b"d1:zi2e2:\xc3\xa9i1ee");
}

#[test]
fn test_idempotence() {
    // Non-canonical key order in the input.
    let input = b"d3:numi123e5:hello5:world4:listli1ei2eee";
    let first = encode(&decode(input).expect("decode"));
    let second = encode(&decode(&first).expect("decode"));
    assert_eq!(first, second);
    assert_eq!(first, b"d5:hello5:world4:listli1ei2ee3:numi123ee");
}

#[test]
fn test_nested_list_decode() {
    let mut src: &[u8] = b"l5:helloi123ee";
    let (v, consumed) = Codec::default().decode_value(&mut src).expect("decode");
    assert_eq!(consumed, 14);
    let items = v.as_list().expect("list");
    assert_eq!(items.len(), 2);
    assert_eq!(items[0].as_bytes().unwrap(), b"hello");
    assert_eq!(items[1].as_integer().unwrap(), 123);
}

#[test]
fn test_accessor_type_mismatch() {
    let v = decode(b"i5e").expect("decode");
    assert!(matches!(
        v.as_list(),
        Err(CodecError::TypeMismatch { expected: ValueKind::List, found: ValueKind::Integer })
    ));
    assert!(matches!(
        v.as_dictionary(),
        Err(CodecError::TypeMismatch { expected: ValueKind::Dictionary, .. })
    ));
}

#[test]
fn test_trailing_data_in_whole_buffer_decode() {
    match decode(b"i1eXYZ") {
        Err(CodecError::TrailingData { offset }) => assert_eq!(offset, 3),
        other => panic!("expected TrailingData, got {:?}", other),
    }
}

#[test]
fn test_decode_from_file_leaves_reader_after_value() {
    let mut file = tempfile::tempfile().expect("tempfile");
    file.write_all(b"d4:infod4:name4:teste5:extrai42ee3:abc").expect("write");
    file.seek(SeekFrom::Start(0)).expect("seek");

    let codec = Codec::default();
    let mut src = BufReader::with_capacity(4, file);
    let (v, consumed) = codec.decode_value(&mut src).expect("first value");
    assert_eq!(consumed, 33);
    assert_eq!(v.get(b"extra").and_then(|x| x.as_integer().ok()), Some(42));
    assert_eq!(
        v.get(b"info").and_then(|i| i.get(b"name")).and_then(|n| n.as_str().ok()),
        Some("test")
    );

    let (s, consumed) = codec.decode_string(&mut src).expect("second value");
    assert_eq!(s, b"abc");
    assert_eq!(consumed, 5);
    assert!(codec.decode_value(&mut src).is_err());
}

#[test]
fn test_iter_over_reader() {
    let codec = Codec::default();
    let mut it = codec.iter(BufReader::new(&b"i1e1:ale"[..]));
    let values: Result<Vec<Value>, _> = it.by_ref().collect();
    assert_eq!(it.position(), 8);
    assert_eq!(
        values.expect("values"),
        vec![Value::integer(1), Value::string("a"), Value::list(vec![])]
    );
}

#[test]
fn test_stream_decode_and_reencode() {
    let input = b"d1:bi1e1:ai2ee4:spam";
    let result = decode_stream(&Codec::default(), input);
    assert!(result.is_complete());
    assert_eq!(result.values.len(), 2);
    assert_eq!(result.values[1].byte_range, 14..20);

    let out = encode_stream(&Codec::default(), result.values.iter().map(|d| &d.value));
    assert_eq!(out, b"d1:ai2e1:bi1ee4:spam");
}

#[test]
fn test_stream_truncated_tail() {
    let result = decode_stream(&Codec::default(), b"i1e5:abc");
    assert_eq!(result.values.len(), 1);
    assert_eq!(result.consumed(), 3);
    let err = result.error.expect("error");
    assert_eq!(err.offset, 3);
    assert!(matches!(err.error, CodecError::UnexpectedEnd));
}
