//! Benchmarks for field generation and vertex packing.
//!
//! Run with: `cargo bench`

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use spiral_galaxy::galaxy;
use spiral_galaxy::GalaxyParameters;

fn bench_generate(c: &mut Criterion) {
    let mut group = c.benchmark_group("generate");

    for count in [1_000u32, 100_000, 1_000_000] {
        let params = GalaxyParameters {
            count,
            ..Default::default()
        };
        group.throughput(Throughput::Elements(count as u64));
        group.bench_with_input(BenchmarkId::from_parameter(count), &params, |b, params| {
            b.iter(|| black_box(galaxy::generate_seeded(params, 42)))
        });
    }

    group.finish();
}

fn bench_randomness_power(c: &mut Criterion) {
    let mut group = c.benchmark_group("randomness_power");

    for power in [1.0f32, 3.0, 10.0] {
        let params = GalaxyParameters {
            count: 100_000,
            randomness_power: power,
            ..Default::default()
        };
        group.bench_with_input(BenchmarkId::from_parameter(power), &params, |b, params| {
            b.iter(|| black_box(galaxy::generate_seeded(params, 42)))
        });
    }

    group.finish();
}

fn bench_vertices(c: &mut Criterion) {
    let field = galaxy::generate_seeded(&GalaxyParameters::default(), 7);
    c.bench_function("vertices_100k", |b| b.iter(|| black_box(field.vertices())));
}

criterion_group!(benches, bench_generate, bench_randomness_power, bench_vertices);
criterion_main!(benches);
