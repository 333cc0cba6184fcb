//! Criterion micro-benchmarks for channel assignment.

use std::hint::black_box;

use criterion::{criterion_group, criterion_main, Criterion};
use gridlink_bench::{line_profile, mesh_profile};

/// Benchmark: repath a 32x32 dense mesh carrying 256 devices.
fn bench_allocate_mesh(c: &mut Criterion) {
    let mut p = mesh_profile(32, 256, 42);
    let Some(grid) = p.grid() else {
        return;
    };

    c.bench_function("allocate_mesh_1k_256dev", |b| {
        b.iter(|| black_box(p.network.allocate_channels(grid)));
    });
}

/// Benchmark: repath a 512-cable line; exercises deep ancestor chains.
fn bench_allocate_line(c: &mut Criterion) {
    let mut p = line_profile(512);
    let Some(grid) = p.grid() else {
        return;
    };

    c.bench_function("allocate_line_512", |b| {
        b.iter(|| black_box(p.network.allocate_channels(grid)));
    });
}

criterion_group!(benches, bench_allocate_mesh, bench_allocate_line);
criterion_main!(benches);
