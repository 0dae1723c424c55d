//! Benchmarks for colour comparison and hue rotation.

use std::hint::black_box;

use criterion::Criterion;
use glowpad::Rgba;

pub fn bench_color(c: &mut Criterion) {
    let mut group = c.benchmark_group("primitives/color");
    let a = Rgba::new(0.123_45, 0.5, 0.987_65, 1.0);
    let b = Rgba::new(0.12, 0.5, 0.99, 1.0);

    // The array loop rounds then compares every child on every tick
    group.bench_function("rounded_approx_eq", |bench| {
        bench.iter(|| black_box(a).rounded(3).approx_eq(black_box(&b), 2))
    });

    group.bench_function("hue_rotated", |bench| {
        bench.iter(|| black_box(a).hue_rotated(black_box(0.25)))
    });

    group.finish();
}
