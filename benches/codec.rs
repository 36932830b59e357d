//! Benchmark: compare walk vs decode vs decode+encode on a synthetic torrent-like
//! metainfo dictionary (announce list, nested info dictionary with a file list and
//! a large `pieces` string). Walk only computes the extent (no allocation);
//! decode builds the value tree; round-trip decodes then re-encodes canonically.

use bencode::{decode, encode, find_dict_value, value_extent, Codec, Value};
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use std::io::BufReader;

fn sample_metainfo(files: usize) -> Vec<u8> {
    let file_list: Vec<Value> = (0..files)
        .map(|i| {
            Value::dictionary([
                ("length", Value::integer(1_048_576 + i as i64)),
                (
                    "path",
                    Value::list(vec![Value::string("dir"), Value::string(format!("file-{:04}.bin", i))]),
                ),
            ])
        })
        .collect();
    let info = Value::dictionary([
        ("name", Value::string("sample")),
        ("piece length", Value::integer(262_144)),
        ("pieces", Value::string(vec![0xabu8; 20 * files])),
        ("files", Value::list(file_list)),
    ]);
    let root = Value::dictionary([
        ("announce", Value::string("http://tracker.example.com/announce")),
        (
            "announce-list",
            Value::list(vec![
                Value::list(vec![Value::string("udp://tracker.example.com:6969")]),
                Value::list(vec![Value::string("udp://backup.example.com:6969")]),
            ]),
        ),
        ("creation date", Value::integer(1_700_000_000)),
        ("info", info),
    ]);
    encode(&root)
}

fn bench_codec(c: &mut Criterion) {
    let data = sample_metainfo(500);
    let codec = Codec::default();

    let mut group = c.benchmark_group("metainfo_500_files");
    group.bench_function("walk_extent", |b| {
        b.iter(|| value_extent(black_box(&data), 0).unwrap())
    });
    group.bench_function("walk_find_info", |b| {
        b.iter(|| find_dict_value(black_box(&data), b"info").unwrap())
    });
    group.bench_function("decode_slice", |b| b.iter(|| decode(black_box(&data)).unwrap()));
    group.bench_function("decode_bufreader", |b| {
        b.iter(|| {
            let mut src = BufReader::new(black_box(&data[..]));
            codec.decode_value(&mut src).unwrap()
        })
    });
    group.bench_function("decode_encode", |b| {
        b.iter(|| encode(&decode(black_box(&data)).unwrap()))
    });
    group.finish();
}

criterion_group!(benches, bench_codec);
criterion_main!(benches);
