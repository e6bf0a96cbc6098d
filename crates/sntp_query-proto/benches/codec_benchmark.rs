// Benchmarks for NTP packet encoding, decoding, and timestamp conversion.

use std::hint::black_box;
use std::time::SystemTime;

use criterion::{Criterion, criterion_group, criterion_main};
use sntp_proto::ntp_time::to_ntp_time;
use sntp_proto::protocol::{
    LeapIndicator, Mode, Packet, ReferenceIdentifier, ShortFormat, Stratum, TimestampFormat,
    Version,
};

fn make_test_packet() -> Packet {
    Packet {
        leap_indicator: LeapIndicator::NoWarning,
        version: Version::V4,
        mode: Mode::Server,
        stratum: Stratum::PRIMARY,
        poll: 6,
        precision: -20,
        root_delay: ShortFormat {
            seconds: 0,
            fraction: 256,
        },
        root_dispersion: ShortFormat {
            seconds: 0,
            fraction: 512,
        },
        reference_id: ReferenceIdentifier(*b"GPS\0"),
        reference_timestamp: TimestampFormat {
            seconds: 3_913_056_000,
            fraction: 0xABCD_1234,
        },
        origin_timestamp: TimestampFormat {
            seconds: 3_913_056_001,
            fraction: 0x1111_2222,
        },
        receive_timestamp: TimestampFormat {
            seconds: 3_913_056_002,
            fraction: 0x3333_4444,
        },
        transmit_timestamp: TimestampFormat {
            seconds: 3_913_056_002,
            fraction: 0x5555_6666,
        },
    }
}

fn bench_encode(c: &mut Criterion) {
    let packet = make_test_packet();
    c.bench_function("packet_encode", |b| {
        b.iter(|| black_box(&packet).encode().unwrap())
    });
}

fn bench_decode(c: &mut Criterion) {
    let bytes = make_test_packet().encode().unwrap();
    c.bench_function("packet_decode", |b| {
        b.iter(|| Packet::decode(black_box(&bytes)).unwrap())
    });
}

fn bench_time_conversion(c: &mut Criterion) {
    let now = SystemTime::now();
    c.bench_function("to_ntp_time", |b| b.iter(|| to_ntp_time(black_box(now))));
    let ts = to_ntp_time(now);
    c.bench_function("to_system_time", |b| {
        b.iter(|| black_box(ts).to_system_time())
    });
}

criterion_group!(benches, bench_encode, bench_decode, bench_time_conversion);
criterion_main!(benches);
