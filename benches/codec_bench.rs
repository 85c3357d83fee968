//! Benchmarks for the frame codec.
//!
//! Run with:
//! ```sh
//! cargo bench --bench codec_bench
//! ```

use bytes::BytesMut;
use criterion::{Criterion, Throughput, criterion_group, criterion_main};
use std::hint::black_box;
use tokio_util::codec::Decoder;
use uhppote_core::{Date, SerialNumber};
use uhppote_protocol::messages::{GetStatusRequest, PutCardRequest};
use uhppote_protocol::{FrameCodec, Message, Request};

fn put_card() -> PutCardRequest {
    PutCardRequest {
        serial_number: SerialNumber::new(423187757),
        card_number: 65538,
        from: Date::from_ymd(2024, 1, 1).unwrap(),
        to: Date::from_ymd(2024, 12, 31).unwrap(),
        door1: true,
        door2: false,
        door3: true,
        door4: false,
    }
}

fn bench_encode(c: &mut Criterion) {
    let mut group = c.benchmark_group("encode");
    group.throughput(Throughput::Elements(1));

    let status = GetStatusRequest {
        serial_number: SerialNumber::new(423187757),
    };
    let card = put_card();

    group.bench_function("get_status_request", |b| {
        b.iter(|| black_box(black_box(&status).encode().unwrap()));
    });
    group.bench_function("put_card_request", |b| {
        b.iter(|| black_box(black_box(&card).encode().unwrap()));
    });

    group.finish();
}

fn bench_decode(c: &mut Criterion) {
    let mut group = c.benchmark_group("decode");
    group.throughput(Throughput::Elements(1));

    let datagram = put_card().encode().unwrap().to_bytes();

    group.bench_function("datagram_to_request", |b| {
        b.iter(|| {
            let mut codec = FrameCodec::new();
            let mut buffer = BytesMut::from(&black_box(&datagram)[..]);
            let frame = codec.decode(&mut buffer).unwrap().unwrap();
            black_box(Request::decode(&frame).unwrap())
        });
    });

    group.finish();
}

criterion_group!(benches, bench_encode, bench_decode);
criterion_main!(benches);
