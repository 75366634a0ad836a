//! Benchmarks for topology construction and repair.
//!
//! Run with: cargo bench -p polymesh
//!
//! To compare against baseline:
//! 1. First run: cargo bench -p polymesh -- --save-baseline main
//! 2. After changes: cargo bench -p polymesh -- --baseline main

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use polymesh::{
    CellAdjacency, ConvertParams, OrientedTopologyBuilder, RawMesh, convert_mesh,
    find_multiply_connected_cells, repair_multiply_connected,
};

#[path = "../tests/common/mod.rs"]
mod common;

use common::{hex_grid, internal_faces, split_internal_face};

// =============================================================================
// Test Mesh Generation
// =============================================================================

/// Hex grid with every `stride`-th internal face split in two.
fn split_grid(n: usize, stride: usize) -> RawMesh {
    let mut raw = hex_grid(n, n, n);
    for f in internal_faces(&raw).into_iter().step_by(stride) {
        split_internal_face(&mut raw, f);
    }
    raw
}

fn test_cases() -> Vec<(&'static str, RawMesh)> {
    vec![
        ("grid_8", split_grid(8, 7)),
        ("grid_16", split_grid(16, 7)),
        ("grid_32", split_grid(32, 7)),
    ]
}

// =============================================================================
// Topology Construction
// =============================================================================

fn bench_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("Build");

    for (name, raw) in &test_cases() {
        group.throughput(Throughput::Elements(raw.face_count() as u64));

        group.bench_with_input(BenchmarkId::new("oriented_topology", name), raw, |b, raw| {
            let builder = OrientedTopologyBuilder::new();
            b.iter(|| builder.build(black_box(raw.clone())))
        });
    }

    group.finish();
}

// =============================================================================
// Adjacency and Detection
// =============================================================================

fn bench_detect(c: &mut Criterion) {
    let mut group = c.benchmark_group("Detect");

    for (name, raw) in test_cases() {
        let mesh = OrientedTopologyBuilder::new()
            .build(raw)
            .expect("grid builds")
            .mesh;
        group.throughput(Throughput::Elements(mesh.internal_face_count() as u64));

        group.bench_with_input(BenchmarkId::new("adjacency", name), &mesh, |b, mesh| {
            b.iter(|| CellAdjacency::from_mesh(black_box(mesh)))
        });

        let adjacency = CellAdjacency::from_mesh(&mesh);
        group.bench_with_input(
            BenchmarkId::new("multiply_connected", name),
            &adjacency,
            |b, adjacency| b.iter(|| find_multiply_connected_cells(black_box(adjacency))),
        );
    }

    group.finish();
}

// =============================================================================
// Repair
// =============================================================================

fn bench_repair(c: &mut Criterion) {
    let mut group = c.benchmark_group("Repair");

    for (name, raw) in test_cases() {
        let mesh = OrientedTopologyBuilder::new()
            .build(raw.clone())
            .expect("grid builds")
            .mesh;
        group.throughput(Throughput::Elements(mesh.face_count() as u64));

        group.bench_with_input(BenchmarkId::new("repair", name), &mesh, |b, mesh| {
            b.iter(|| {
                let mut m = mesh.clone();
                let _ = repair_multiply_connected(black_box(&mut m));
            })
        });

        group.bench_with_input(BenchmarkId::new("convert", name), &raw, |b, raw| {
            b.iter(|| convert_mesh(black_box(raw.clone()), &ConvertParams::default()))
        });
    }

    group.finish();
}

// =============================================================================
// Criterion Setup
// =============================================================================

criterion_group!(benches, bench_build, bench_detect, bench_repair);

criterion_main!(benches);
