//! Store operation benchmarks.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use maskstore_core::{MaskDraft, MaskStore};
use maskstore_testkit::fixtures::{sample_catalog, scenarios};
use tempfile::TempDir;

/// Benchmark single mask creation in memory.
fn bench_create(c: &mut Criterion) {
    let store = MaskStore::open_in_memory().unwrap();

    c.bench_function("create_in_memory", |b| {
        b.iter(|| {
            black_box(store.create(Some(MaskDraft::new().name("bench"))));
        });
    });
}

/// Benchmark creation with every write landing on disk.
fn bench_create_file(c: &mut Criterion) {
    let mut group = c.benchmark_group("create_file");

    for existing in [0u64, 100, 1000].iter() {
        group.bench_with_input(
            BenchmarkId::from_parameter(existing),
            existing,
            |b, &existing| {
                let dir = TempDir::new().unwrap();
                let store = MaskStore::open(dir.path()).unwrap();
                for i in 0..existing {
                    store.create(Some(MaskDraft::new().name(format!("mask-{i}"))));
                }

                b.iter(|| {
                    black_box(store.create(None));
                });
            },
        );
    }
    group.finish();
}

/// Benchmark sorted listing, with and without built-ins merged.
fn bench_get_all(c: &mut Criterion) {
    let mut group = c.benchmark_group("get_all");

    for count in [10u64, 100, 1000].iter() {
        group.throughput(Throughput::Elements(*count));
        let test_store = scenarios::populated_store(*count);

        group.bench_with_input(BenchmarkId::new("user", count), count, |b, _| {
            b.iter(|| black_box(test_store.get_all(false)));
        });
        group.bench_with_input(BenchmarkId::new("with_builtins", count), count, |b, _| {
            b.iter(|| black_box(test_store.get_all(true)));
        });
    }
    group.finish();
}

/// Benchmark name search.
fn bench_search(c: &mut Criterion) {
    let mut group = c.benchmark_group("search");

    for count in [100u64, 1000].iter() {
        group.throughput(Throughput::Elements(*count));
        let test_store = scenarios::populated_store(*count);

        group.bench_with_input(BenchmarkId::new("hit", count), count, |b, _| {
            b.iter(|| black_box(test_store.search(black_box("MASK-4"))));
        });
        group.bench_with_input(BenchmarkId::new("miss", count), count, |b, _| {
            b.iter(|| black_box(test_store.search(black_box("nothing"))));
        });
    }
    group.finish();
}

/// Benchmark resolving the built-in catalog against the host config.
fn bench_resolve_builtins(c: &mut Criterion) {
    let catalog = sample_catalog();
    let config = maskstore_core::ModelConfig::default();

    c.bench_function("resolve_builtins", |b| {
        b.iter(|| black_box(catalog.resolve_all(black_box(&config))));
    });
}

criterion_group!(
    benches,
    bench_create,
    bench_create_file,
    bench_get_all,
    bench_search,
    bench_resolve_builtins,
);
criterion_main!(benches);
