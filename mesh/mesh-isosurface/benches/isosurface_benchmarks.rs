//! Benchmarks for mesh-isosurface extraction.
//!
//! Run with: cargo bench -p mesh-isosurface
//!
//! To compare against baseline:
//! 1. First run: cargo bench -p mesh-isosurface -- --save-baseline main
//! 2. After changes: cargo bench -p mesh-isosurface -- --baseline main

#![allow(clippy::cast_precision_loss)]

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use mesh_isosurface::{
    BinaryVolume, MarchingCubesConfig, ScalarVolume, extract_isosurface_with, march_cubes_with,
};

// =============================================================================
// Test Volume Generation
// =============================================================================

/// Gyroid sheet sampled at `cells` unit cells across an `n^3` grid.
fn gyroid_field(n: usize, cells: f64) -> ScalarVolume {
    let k = std::f64::consts::TAU * cells / n as f64;
    ScalarVolume::from_fn((n, n, n), |x, y, z| {
        let (x, y, z) = (x as f64 * k, y as f64 * k, z as f64 * k);
        x.sin().mul_add(y.cos(), y.sin() * z.cos()) + z.sin() * x.cos()
    })
}

/// Porous scaffold: gyroid solid phase thresholded to an occupancy grid.
fn gyroid_scaffold(n: usize, cells: f64) -> BinaryVolume {
    let field = gyroid_field(n, cells);
    BinaryVolume::from_fn((n, n, n), |x, y, z| field.get(x, y, z) >= 0.0)
}

fn cube_count(n: usize) -> u64 {
    ((n - 1) * (n - 1) * (n - 1)) as u64
}

// =============================================================================
// Binary Extraction Benchmarks
// =============================================================================

fn bench_binary(c: &mut Criterion) {
    let mut group = c.benchmark_group("MarchCubes");

    for n in [32, 64, 128] {
        let volume = gyroid_scaffold(n, 4.0);
        group.throughput(Throughput::Elements(cube_count(n)));

        group.bench_with_input(BenchmarkId::new("sequential", n), &volume, |b, volume| {
            let config = MarchingCubesConfig::sequential();
            b.iter(|| march_cubes_with(black_box(volume), 0.05, black_box(&config)));
        });

        group.bench_with_input(BenchmarkId::new("parallel", n), &volume, |b, volume| {
            let config = MarchingCubesConfig::default().with_parallel_threshold(0);
            b.iter(|| march_cubes_with(black_box(volume), 0.05, black_box(&config)));
        });
    }

    group.finish();
}

// =============================================================================
// Scalar Extraction Benchmarks
// =============================================================================

fn bench_scalar(c: &mut Criterion) {
    let mut group = c.benchmark_group("ExtractIsosurface");

    for n in [32, 64, 128] {
        let volume = gyroid_field(n, 4.0);
        group.throughput(Throughput::Elements(cube_count(n)));

        group.bench_with_input(BenchmarkId::new("sequential", n), &volume, |b, volume| {
            let config = MarchingCubesConfig::sequential();
            b.iter(|| extract_isosurface_with(black_box(volume), 0.0, 0.05, black_box(&config)));
        });

        group.bench_with_input(BenchmarkId::new("parallel", n), &volume, |b, volume| {
            let config = MarchingCubesConfig::default().with_parallel_threshold(0);
            b.iter(|| extract_isosurface_with(black_box(volume), 0.0, 0.05, black_box(&config)));
        });

        // Skip the normal post-pass to isolate traversal cost.
        group.bench_with_input(BenchmarkId::new("no_normals", n), &volume, |b, volume| {
            let config = MarchingCubesConfig::sequential().with_normals(false);
            b.iter(|| extract_isosurface_with(black_box(volume), 0.0, 0.05, black_box(&config)));
        });

        group.bench_with_input(BenchmarkId::new("draft", n), &volume, |b, volume| {
            let config = MarchingCubesConfig::draft();
            b.iter(|| extract_isosurface_with(black_box(volume), 0.0, 0.05, black_box(&config)));
        });
    }

    group.finish();
}

// =============================================================================
// Criterion Setup
// =============================================================================

criterion_group!(benches, bench_binary, bench_scalar);
criterion_main!(benches);
