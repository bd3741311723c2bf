use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use std::sync::Arc;
use std::time::{Duration, Instant};
use stream_dedupe::{
    key_fn, DedupeFilter, ExpirationWindow, ExpiringSet, FnKeySelector, ShardedExpiringSet,
};

fn open_filter<T, K, F>(selector: F) -> DedupeFilter<T, K, FnKeySelector<F, T, K>>
where
    K: std::hash::Hash + Eq + Clone + Send + Sync + std::fmt::Debug,
    F: Fn(&T) -> K + Send + Sync,
{
    let mut filter = DedupeFilter::new(key_fn(selector), Duration::from_secs(3600))
        .expect("non-zero expiration");
    filter.initialize().expect("first initialize");
    filter
}

/// Benchmark the admit path: every element carries a new key
fn bench_admit_fresh_keys(c: &mut Criterion) {
    let mut group = c.benchmark_group("admit");
    group.throughput(Throughput::Elements(1));

    group.bench_function("u64_key", |b| {
        let filter = open_filter(|n: &u64| *n);
        let mut next = 0u64;
        b.iter(|| {
            next += 1;
            black_box(filter.evaluate(black_box(&next)).unwrap())
        })
    });

    group.bench_function("string_key", |b| {
        let filter = open_filter(|s: &String| s.clone());
        let mut next = 0u64;
        b.iter(|| {
            next += 1;
            let element = format!("event-{next}");
            black_box(filter.evaluate(black_box(&element)).unwrap())
        })
    });

    group.finish();
}

/// Benchmark the reject path across different seen-set sizes
fn bench_reject_duplicates(c: &mut Criterion) {
    let mut group = c.benchmark_group("reject");

    for tracked in [100u64, 10_000, 1_000_000].iter() {
        let filter = open_filter(|n: &u64| *n);
        for n in 0..*tracked {
            filter.evaluate(&n).unwrap();
        }

        group.bench_with_input(BenchmarkId::new("tracked_keys", tracked), tracked, |b, &tracked| {
            let mut i = 0u64;
            b.iter(|| {
                i = (i + 7) % tracked;
                black_box(filter.evaluate(black_box(&i)).unwrap())
            })
        });
    }

    group.finish();
}

/// Benchmark multi-threaded evaluation on a shared filter
fn bench_concurrent_evaluate(c: &mut Criterion) {
    let mut group = c.benchmark_group("concurrent");

    for num_threads in [2usize, 4, 8].iter() {
        group.throughput(Throughput::Elements((*num_threads as u64) * 1000));

        group.bench_with_input(
            BenchmarkId::new("threads", num_threads),
            num_threads,
            |b, &num_threads| {
                b.iter(|| {
                    // Keys overlap across threads so half the calls contend on duplicates
                    let filter = Arc::new(open_filter(|n: &u64| *n));
                    let handles: Vec<_> = (0..num_threads)
                        .map(|t| {
                            let filter = Arc::clone(&filter);
                            std::thread::spawn(move || {
                                let offset = (t as u64 % 2) * 500;
                                for n in 0..1000u64 {
                                    black_box(filter.evaluate(&(n + offset)).unwrap());
                                }
                            })
                        })
                        .collect();
                    for handle in handles {
                        handle.join().unwrap();
                    }
                })
            },
        );
    }

    group.finish();
}

/// Benchmark a full purge of expired entries
fn bench_purge(c: &mut Criterion) {
    let mut group = c.benchmark_group("purge");

    for size in [1_000u64, 100_000].iter() {
        group.bench_with_input(BenchmarkId::new("entries", size), size, |b, &size| {
            let window = ExpirationWindow::from_millis(10).unwrap();
            b.iter_with_setup(
                || {
                    let set = ShardedExpiringSet::new(window);
                    let start = Instant::now();
                    for n in 0..size {
                        set.insert_if_absent(n, start);
                    }
                    (set, start + Duration::from_millis(10))
                },
                |(set, later)| black_box(set.purge_expired(later)),
            )
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_admit_fresh_keys,
    bench_reject_duplicates,
    bench_concurrent_evaluate,
    bench_purge
);
criterion_main!(benches);
