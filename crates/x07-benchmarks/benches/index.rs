//! Sparse index benchmarks
//!
//! Path sharding for names of every shard shape, and parsing of index files
//! with growing release histories.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use x07_benchmarks::{criterion_config, index_file, package_names};
use x07_core::utils::index_relative_path;
use x07_registry::parse_index_file;

fn bench_index_paths(c: &mut Criterion) {
    let names = package_names(16);

    c.bench_function("index_relative_path", |b| {
        b.iter(|| {
            for name in &names {
                black_box(index_relative_path(name).unwrap());
            }
        });
    });
}

fn bench_index_parsing(c: &mut Criterion) {
    let mut group = c.benchmark_group("index_file_parsing");

    for count in [10usize, 100, 1000] {
        let text = index_file(count);
        group.throughput(Throughput::Bytes(text.len() as u64));
        group.bench_with_input(BenchmarkId::new("versions", count), &text, |b, text| {
            b.iter(|| black_box(parse_index_file(text).unwrap()));
        });
    }

    group.finish();
}

criterion_group! {
    name = benches;
    config = criterion_config();
    targets = bench_index_paths, bench_index_parsing
}
criterion_main!(benches);
