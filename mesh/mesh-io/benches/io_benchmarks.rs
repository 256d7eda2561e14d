//! Benchmarks for mesh-io operations.
//!
//! Run with: cargo bench -p mesh-io
//!
//! To compare against baseline:
//! 1. First run: cargo bench -p mesh-io -- --save-baseline main
//! 2. After changes: cargo bench -p mesh-io -- --baseline main

#![allow(missing_docs, clippy::unwrap_used)]

use criterion::{Criterion, Throughput, black_box, criterion_group, criterion_main};
use mesh_io::{StlReader, load_stl, parse_stl, save_stl, write_stl_binary};
use mesh_types::{Mesh, primitives};
use tempfile::tempdir;

fn bench_io(c: &mut Criterion) {
    let mut group = c.benchmark_group("IO");

    let mesh = Mesh::from_source(&mut primitives::cylinder(10.0, 40.0, 512)).unwrap();
    let mut bytes = Vec::new();
    write_stl_binary(&mesh, &mut bytes).unwrap();

    let dir = tempdir().unwrap();
    let path = dir.path().join("bench.stl");
    save_stl(&mesh, &path).unwrap();

    group.throughput(Throughput::Elements(mesh.faces().len() as u64));

    group.bench_function("parse_stl", |b| b.iter(|| parse_stl(black_box(&bytes))));

    group.bench_function("load_weld_from_bytes", |b| {
        b.iter(|| Mesh::from_source(&mut StlReader::from_bytes(black_box(bytes.clone()))));
    });

    group.bench_function("load_stl", |b| b.iter(|| load_stl(black_box(&path))));

    group.bench_function("write_stl_binary", |b| {
        b.iter(|| {
            let mut out = Vec::with_capacity(bytes.len());
            write_stl_binary(black_box(&mesh), &mut out)
        });
    });

    group.finish();
}

criterion_group!(benches, bench_io);
criterion_main!(benches);
