//! Basic benchmarks for the `reuse_pool` package.

#![allow(
    missing_docs,
    reason = "No need for API documentation in benchmark code"
)]

use std::hint::black_box;

use criterion::{Criterion, criterion_group, criterion_main};
use reuse_pool::{LocalReusePool, RawReusePool, ReusePool};

criterion_group!(benches, entrypoint);
criterion_main!(benches);

const IDENTIFIER: &str = "bench";

fn entrypoint(c: &mut Criterion) {
    let mut group = c.benchmark_group("rp_register");

    group.bench_function("one", |b| {
        b.iter(|| {
            let mut pool = RawReusePool::<u64>::new();
            pool.register(IDENTIFIER, |_| 0);
            pool
        });
    });

    group.bench_function("hundred", |b| {
        b.iter(|| {
            let mut pool = RawReusePool::<u64>::new();
            for i in 0..100_u64 {
                pool.register(format!("bench-{i}"), |_| 0);
            }
            pool
        });
    });

    group.finish();

    let mut cycle_group = c.benchmark_group("rp_cycle");

    cycle_group.bench_function("raw_constructed", |b| {
        let mut pool = RawReusePool::<u64>::new();
        pool.register(IDENTIFIER, |_| 42);

        b.iter(|| black_box(pool.dequeue(IDENTIFIER).unwrap()));
    });

    cycle_group.bench_function("raw_recycled", |b| {
        let mut pool = RawReusePool::<u64>::new();
        pool.register(IDENTIFIER, |_| 42);
        pool.enqueue(0, IDENTIFIER).unwrap();

        b.iter(|| {
            let value = pool.dequeue(IDENTIFIER).unwrap();
            pool.enqueue(black_box(value), IDENTIFIER).unwrap();
        });
    });

    cycle_group.bench_function("local_recycled", |b| {
        let pool = LocalReusePool::<u64>::new();
        pool.register(IDENTIFIER, |_| 42);
        pool.enqueue(0, IDENTIFIER).unwrap();

        b.iter(|| {
            let value = pool.dequeue(IDENTIFIER).unwrap();
            pool.enqueue(black_box(value), IDENTIFIER).unwrap();
        });
    });

    cycle_group.bench_function("sync_recycled", |b| {
        let pool = ReusePool::<u64>::new();
        pool.register(IDENTIFIER, |_| 42);
        pool.enqueue(0, IDENTIFIER).unwrap();

        b.iter(|| {
            let value = pool.dequeue(IDENTIFIER).unwrap();
            pool.enqueue(black_box(value), IDENTIFIER).unwrap();
        });
    });

    cycle_group.finish();

    let mut clear_group = c.benchmark_group("rp_clear");

    clear_group.bench_function("thousand_pooled", |b| {
        b.iter(|| {
            let mut pool = RawReusePool::<u64>::new();
            pool.register(IDENTIFIER, |_| 0);
            for i in 0..1_000 {
                pool.enqueue(i, IDENTIFIER).unwrap();
            }
            pool.clear_unused();
            pool
        });
    });

    clear_group.finish();
}
