//! B-tree benchmarks: insert and full-scan throughput.

use std::hint::black_box;

use criterion::{criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion, Throughput};
use pagedb::{StorageConfig, Table, UserRow};
use tempfile::TempDir;

// =============================================================================
// Helpers
// =============================================================================

fn config() -> StorageConfig {
    StorageConfig::default().with_max_pages(10_000)
}

fn row(id: u32) -> UserRow {
    UserRow::new(id, &format!("user{}", id), &format!("person{}@example.com", id)).unwrap()
}

fn populate(table: &mut Table<UserRow>, keys: impl Iterator<Item = u32>) {
    for id in keys {
        table.insert_row(&row(id)).unwrap();
    }
}

/// `0..count` in a scattered but deterministic order. 7919 is prime, so
/// for the counts used here this is a permutation.
fn scattered(count: u32) -> impl Iterator<Item = u32> {
    (0..count).map(move |i| ((i as u64 * 7919) % count as u64) as u32)
}

// =============================================================================
// Inserts
// =============================================================================

fn bench_insert(c: &mut Criterion) {
    let mut group = c.benchmark_group("btree/insert");

    for count in [1_000u32, 10_000] {
        group.throughput(Throughput::Elements(count as u64));

        group.bench_with_input(BenchmarkId::new("sequential", count), &count, |b, &count| {
            b.iter_batched(
                || {
                    let dir = TempDir::new().unwrap();
                    let table = Table::<UserRow>::open(dir.path().join("bench.db"), &config()).unwrap();
                    (dir, table)
                },
                |(_dir, mut table)| populate(&mut table, 0..count),
                BatchSize::PerIteration,
            );
        });

        group.bench_with_input(BenchmarkId::new("scattered", count), &count, |b, &count| {
            b.iter_batched(
                || {
                    let dir = TempDir::new().unwrap();
                    let table = Table::<UserRow>::open(dir.path().join("bench.db"), &config()).unwrap();
                    (dir, table)
                },
                |(_dir, mut table)| populate(&mut table, scattered(count)),
                BatchSize::PerIteration,
            );
        });
    }

    group.finish();
}

// =============================================================================
// Scans
// =============================================================================

fn bench_scan(c: &mut Criterion) {
    let mut group = c.benchmark_group("btree/scan");

    for count in [1_000u32, 10_000] {
        let dir = TempDir::new().unwrap();
        let mut table = Table::<UserRow>::open(dir.path().join("bench.db"), &config()).unwrap();
        populate(&mut table, 0..count);

        group.throughput(Throughput::Elements(count as u64));
        group.bench_function(BenchmarkId::new("full", count), |b| {
            b.iter(|| {
                let rows = table.select().filter(|r| r.is_ok()).count();
                black_box(rows)
            });
        });
    }

    group.finish();
}

fn bench_point_lookup(c: &mut Criterion) {
    let dir = TempDir::new().unwrap();
    let mut table = Table::<UserRow>::open(dir.path().join("bench.db"), &config()).unwrap();
    populate(&mut table, 0..10_000);

    c.bench_function("btree/point_lookup/10000", |b| {
        let mut key = 0u32;
        b.iter(|| {
            key = (key + 7) % 10_000;
            black_box(table.get(key).unwrap())
        });
    });
}

criterion_group!(benches, bench_insert, bench_scan, bench_point_lookup);
criterion_main!(benches);
