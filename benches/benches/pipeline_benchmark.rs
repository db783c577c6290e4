//! Pipeline benchmarks: wire decoding, aggregation with storage, range queries.
//!
//! Run with: `cargo bench --package candela-bench`

use candela_bench::{BENCH_CHANNEL, channel_message, synthetic_ticks, temp_store};
use candela_lib::{BucketDuration, CandleAggregator, QueryLimit, rpc};
use chrono::{DateTime, TimeZone, Utc};
use criterion::{BatchSize, BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use std::hint::black_box;

fn start() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
}

fn decode_benchmark(c: &mut Criterion) {
    let messages: Vec<String> = synthetic_ticks(1_000, start(), 100)
        .iter()
        .map(channel_message)
        .collect();

    let mut group = c.benchmark_group("decode");
    group.throughput(Throughput::Elements(messages.len() as u64));
    group.bench_function("channel_message", |b| {
        b.iter(|| {
            for message in &messages {
                black_box(rpc::decode(message, BENCH_CHANNEL).unwrap());
            }
        });
    });
    group.finish();
}

fn aggregate_benchmark(c: &mut Criterion) {
    let ticks = synthetic_ticks(2_000, start(), 250);

    let mut group = c.benchmark_group("aggregate");
    group.sample_size(10);
    group.throughput(Throughput::Elements(ticks.len() as u64));

    for duration in [BucketDuration::SECOND, BucketDuration::MINUTE, BucketDuration::HOUR] {
        group.bench_with_input(BenchmarkId::from_parameter(duration), &duration, |b, &duration| {
            b.iter_batched(
                || temp_store().unwrap(),
                |(_dir, store)| {
                    let mut aggregator = CandleAggregator::new("BTC_JPY", duration);
                    for tick in &ticks {
                        black_box(aggregator.apply(&store, tick).unwrap());
                    }
                },
                BatchSize::PerIteration,
            );
        });
    }
    group.finish();
}

fn query_benchmark(c: &mut Criterion) {
    let (_dir, store) = temp_store().unwrap();
    let mut aggregator = CandleAggregator::new("BTC_JPY", BucketDuration::SECOND);
    for tick in &synthetic_ticks(5_000, start(), 1_000) {
        aggregator.apply(&store, tick).unwrap();
    }

    let mut group = c.benchmark_group("query_range");
    for limit in [10_i64, 100, 1_000] {
        group.bench_with_input(BenchmarkId::from_parameter(limit), &limit, |b, &limit| {
            b.iter(|| {
                black_box(
                    store
                        .query_range("BTC_JPY", BucketDuration::SECOND, QueryLimit::new(limit))
                        .unwrap(),
                )
            });
        });
    }
    group.finish();
}

criterion_group!(benches, decode_benchmark, aggregate_benchmark, query_benchmark);
criterion_main!(benches);
