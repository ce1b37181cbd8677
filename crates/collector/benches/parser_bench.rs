//! Syslog 파서 벤치마크
//!
//! RFC 5424, RFC 3164 파서와 형식 판별의 처리량을 측정합니다.

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use logharbor_collector::parser::{parse, parse_bytes, parse_rfc3164, parse_rfc5424};

/// RFC 5424 짧은 메시지 (structured data 없음)
const RFC5424_SHORT: &str = "<34>1 2024-01-15T12:00:00Z myhost sshd 1234 - - Failed password for root";

/// RFC 5424 긴 메시지 (structured data 두 개)
const RFC5424_LONG: &str = "<165>1 2024-01-15T12:00:00.123456+09:00 web-server-01 nginx 5678 ID123 [request user=\"admin\" path=\"/api/v1/users\" method=\"POST\" status=\"403\"][performance time=\"125ms\" note=\"escaped \\\"quote\\\" \\] bracket\"] Unauthorized API access attempt from 192.168.1.100";

/// RFC 3164 짧은 메시지
const RFC3164_SHORT: &str = "<34>Jan 15 12:00:00 myhost sshd: Failed password for root";

/// RFC 3164 긴 메시지
const RFC3164_LONG: &str = "<34>Dec 31 23:59:59 production-server-eu-west-1a authentication-service[12345]: Authentication failure for user admin@example.com from IP address 203.0.113.45 using password authentication method after 3 previous attempts";

fn bench_rfc5424(c: &mut Criterion) {
    let mut group = c.benchmark_group("rfc5424");
    group.throughput(Throughput::Elements(1));

    group.bench_function("short", |b| {
        b.iter(|| parse_rfc5424(black_box(RFC5424_SHORT)).unwrap())
    });

    group.bench_function("long_with_structured_data", |b| {
        b.iter(|| parse_rfc5424(black_box(RFC5424_LONG)).unwrap())
    });

    group.finish();
}

fn bench_rfc3164(c: &mut Criterion) {
    let mut group = c.benchmark_group("rfc3164");
    group.throughput(Throughput::Elements(1));

    group.bench_function("short", |b| {
        b.iter(|| parse_rfc3164(black_box(RFC3164_SHORT)).unwrap())
    });

    group.bench_function("long_with_pid", |b| {
        b.iter(|| parse_rfc3164(black_box(RFC3164_LONG)).unwrap())
    });

    group.finish();
}

fn bench_auto_detect(c: &mut Criterion) {
    let mut group = c.benchmark_group("auto_detect");

    for (name, raw) in [
        ("rfc5424", RFC5424_SHORT),
        ("rfc3164", RFC3164_SHORT),
    ] {
        group.throughput(Throughput::Bytes(raw.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(name), raw, |b, raw| {
            b.iter(|| parse(black_box(raw)).unwrap())
        });
    }

    // 1000건 반복 처리량 (바이트 입력)
    group.throughput(Throughput::Elements(1000));
    group.bench_function("bytes_throughput_1000", |b| {
        b.iter(|| {
            for _ in 0..1000 {
                parse_bytes(black_box(RFC3164_SHORT.as_bytes())).unwrap();
            }
        })
    });

    group.finish();
}

criterion_group!(benches, bench_rfc5424, bench_rfc3164, bench_auto_detect);
criterion_main!(benches);
