//! Benchmarks for step-size math and colour helpers.

mod color;
mod math;

pub use color::bench_color;
pub use math::bench_step_math;
