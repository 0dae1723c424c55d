//! Engine scenario benchmarks.
//!
//! These model what a running scene does: arrays rippling in and out, and a
//! controller absorbing a burst of knob and pad events.

mod arrays;
mod events;

pub use arrays::bench_arrays;
pub use events::bench_events;
