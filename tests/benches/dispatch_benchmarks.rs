//! # Duplex RPC Benchmarks
//!
//! | Path | What is measured |
//! |------|------------------|
//! | Envelope parse | Lenient parse + classification of one inbound message |
//! | Round trip | `request` → remote invoke → response → settled call |
//! | Fan-out | N concurrent calls settled out of order over one channel |

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use duplex_rpc::{EnvelopeValidator, MessageEvent};
use duplex_tests::integration::fixtures::{connected, math};
use duplex_types::{normalize_params, Envelope};
use futures::future::join_all;
use serde_json::json;
use std::time::Duration;

fn bench_envelope(c: &mut Criterion) {
    let mut group = c.benchmark_group("envelope");

    let message = json!({"id": 42, "method": "add", "params": [1, 2], "jsonrpc": "2.0"});
    group.bench_function("parse", |b| {
        b.iter(|| black_box(Envelope::from_message(Some(black_box(&message)))))
    });

    let validator = EnvelopeValidator::new(Some("https://app.example".into()), None);
    let event = MessageEvent::new(message.clone()).with_origin("https://app.example");
    group.bench_function("validate", |b| b.iter(|| black_box(validator.validate(black_box(&event)))));

    group.bench_function("normalize_params_single", |b| {
        b.iter(|| black_box(normalize_params(Some(json!({"k": "v"})))))
    });

    group.finish();
}

fn bench_round_trip(c: &mut Criterion) {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .expect("tokio runtime");
    let (left, _right) = runtime.block_on(async { connected(Default::default(), math()) });

    let mut group = c.benchmark_group("round_trip");
    group.measurement_time(Duration::from_secs(10));

    group.bench_function("add", |b| {
        b.iter(|| {
            runtime
                .block_on(left.request("add", vec![json!(2), json!(3)]))
                .expect("add")
        })
    });

    for calls in [10usize, 100, 500] {
        group.throughput(Throughput::Elements(calls as u64));
        group.bench_with_input(BenchmarkId::new("fan_out", calls), &calls, |b, &calls| {
            b.iter(|| {
                runtime.block_on(async {
                    let pending: Vec<_> = (0..calls)
                        .map(|i| left.request("echo", vec![json!(i)]))
                        .collect();
                    for result in join_all(pending).await {
                        black_box(result.expect("echo"));
                    }
                })
            })
        });
    }

    group.finish();
}

criterion_group!(benches, bench_envelope, bench_round_trip);
criterion_main!(benches);
