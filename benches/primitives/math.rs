//! Benchmarks for per-tick step computation.

use std::hint::black_box;

use criterion::Criterion;
use glowpad::{
    math::{clamp_toward_target, step_size, step_towards},
    Rgba,
};

pub fn bench_step_math(c: &mut Criterion) {
    let mut group = c.benchmark_group("primitives/step");

    // Fresh attack from dark
    group.bench_function("step_size_fresh", |b| {
        b.iter(|| step_size(black_box(0.0), black_box(1.0), black_box(2.0), black_box(20.0)))
    });

    // Re-entry from partway
    group.bench_function("step_size_reentry", |b| {
        b.iter(|| step_size(black_box(0.37), black_box(0.8), black_box(2.0), black_box(20.0)))
    });

    let from = Rgba::new(0.2, 0.4, 0.6, 0.8);
    let to = Rgba::new(1.0, 0.0, 0.5, 1.0);
    group.bench_function("step_towards", |b| {
        b.iter(|| step_towards(black_box(from), black_box(to), black_box(1.5), black_box(20.0)))
    });

    let step = step_towards(from, to, 1.5, 20.0);
    group.bench_function("clamp_toward_target", |b| {
        b.iter(|| clamp_toward_target(black_box(from), black_box(to), black_box(step)))
    });

    group.finish();
}
