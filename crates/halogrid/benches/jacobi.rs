//! Sweep-kernel throughput on the host backend.

use std::hint::black_box;

use criterion::{criterion_group, criterion_main, Criterion};
use halogrid::prelude::*;

fn bench_sweep(c: &mut Criterion) {
    for n in [64usize, 256] {
        let geom = GridGeometry::single_layer(n, n, 1.0, 1.0).unwrap();
        let mut x = Field::zeros(geom);
        x.fill_boundary(1.0);
        let b = Field::zeros(geom);
        let mut backend = CpuBackend::from_problem(&x, &b).unwrap();

        c.bench_function(&format!("jacobi_step_2d/{n}x{n}"), |bench| {
            bench.iter(|| {
                let delta = backend.step(StencilMode::TwoDim).unwrap();
                backend.swap();
                black_box(delta)
            })
        });
    }

    let geom = GridGeometry::new(48, 48, 48, 1.0, 1.0, 1.0).unwrap();
    let mut x = Field::zeros(geom);
    x.fill_boundary(1.0);
    let b = Field::zeros(geom);
    let mut backend = CpuBackend::from_problem(&x, &b).unwrap();
    c.bench_function("jacobi_step_3d/48x48x48", |bench| {
        bench.iter(|| {
            let delta = backend.step(StencilMode::ThreeDim).unwrap();
            backend.swap();
            black_box(delta)
        })
    });
}

fn bench_extraction(c: &mut Criterion) {
    let geom = GridGeometry::new(64, 64, 64, 1.0, 1.0, 1.0).unwrap();
    let mut x = Field::zeros(geom);
    x.fill_with(|ix, y, z| (ix + y + z) as f32);
    let b = Field::zeros(geom);
    let mut backend = CpuBackend::from_problem(&x, &b).unwrap();

    // West/East are the strided gathers; Top/Bottom the contiguous copies.
    c.bench_function("extract/west_east", |bench| {
        bench.iter(|| {
            backend
                .extract(Face::West | Face::East, FacePlane::Halo)
                .unwrap()
        })
    });
    c.bench_function("extract/all_faces", |bench| {
        bench.iter(|| backend.extract(FaceSet::all(), FacePlane::Halo).unwrap())
    });
}

criterion_group!(benches, bench_sweep, bench_extraction);
criterion_main!(benches);
