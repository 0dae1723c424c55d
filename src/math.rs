use crate::color::Rgba;

/*
Step-Size and Convergence Math
==============================

Every convergence loop in this crate moves a colour toward a goal by adding a
fixed per-tick delta, once per update period, until the colour is "close
enough" to the goal. This module holds the arithmetic for that.

Vocabulary
----------

  tick        One invocation of a target's step function. Ticks happen every
              `1 / update_rate_hz` seconds.

  step        The per-tick delta for a single channel. Positive while rising,
              negative while falling.

  re-entry    Starting a transition from a value that is already partway
              between the endpoints, e.g. an ON pressed while an OFF is half
              done. The step is inflated so the remaining distance is covered
              at full-range speed instead of stretching it over the whole phase.

  precision   Number of decimal places two floats must agree on to be
              considered equal: 2 means |a - b| <= 0.01.


The Math: Time to Step
----------------------

    step = (stop - start) / (duration * update_rate_hz)

Example: attack of 2 s at 10 Hz, 0.0 → 1.0
  - ticks = 2 * 10 = 20
  - step  = 1.0 / 20 = 0.05

Re-entry scalar (when neither endpoint is zero):

    rising:   scalar = 1 / (1 - start / stop)
    falling:  scalar = 1 / (1 - stop / start)

Example: resume at 0.5 toward 1.0 → scalar 2 → step 0.1. The remaining half
of the distance takes half the attack time.

The scaled step never exceeds |stop - start| in magnitude, so a single tick
can at most land exactly on the goal.


Final Step
----------

`clamp_toward_target` refuses to walk past the goal: if adding the step would
reach or cross the target (or the channel is already there), the channel snaps
onto the target. Everything is then clamped into [0, 1].
*/

/// Precision used when deciding whether a step is needed at all.
pub const STEP_PRECISION: i32 = 2;

/// Negative-safe modulo for ring indexing: `wrap_index(-1, 5) == 4`.
pub fn wrap_index(a: i64, n: usize) -> usize {
    debug_assert!(n > 0, "ring must not be empty");
    let n = n as i64;
    (((a % n) + n) % n) as usize
}

pub fn next_index(index: usize, n: usize) -> usize {
    wrap_index(index as i64 + 1, n)
}

pub fn previous_index(index: usize, n: usize) -> usize {
    wrap_index(index as i64 - 1, n)
}

/// `|a - b| <= 10^-precision`
pub fn approx_eq(a: f32, b: f32, precision: i32) -> bool {
    let epsilon = 10f32.powi(-precision);
    (a - b).abs() <= epsilon
}

pub fn round_to(value: f32, decimals: i32) -> f32 {
    let scale = 10f32.powi(decimals);
    (value * scale).round() / scale
}

/// Per-tick delta that takes `start` to `stop` in `duration` seconds at
/// `update_rate_hz`, inflated for re-entry.
pub fn step_size(start: f32, stop: f32, duration: f32, update_rate_hz: f32) -> f32 {
    if duration <= 0.0 {
        return stop - start;
    }
    if approx_eq(start, stop, STEP_PRECISION) {
        return 0.0;
    }

    let distance = (stop - start).abs();
    let delta = (stop - start) / (duration * update_rate_hz);
    let scaled = delta * reentry_scalar(start, stop);

    scaled.clamp(-distance, distance)
}

fn reentry_scalar(start: f32, stop: f32) -> f32 {
    if approx_eq(start, 0.0, STEP_PRECISION) || approx_eq(stop, 0.0, STEP_PRECISION) {
        return 1.0;
    }
    if stop > start {
        1.0 / (1.0 - start / stop)
    } else {
        1.0 / (1.0 - stop / start)
    }
}

/// Step every channel of `from` toward `to`.
pub fn step_towards(from: Rgba, to: Rgba, duration: f32, update_rate_hz: f32) -> Rgba {
    from.zip_with(to, |a, b| step_size(a, b, duration, update_rate_hz))
}

/// Add `step` to `current` without walking past `target`, then clamp to [0, 1].
pub fn clamp_toward_target(current: Rgba, target: Rgba, step: Rgba) -> Rgba {
    let channel = |c: f32, t: f32, s: f32| {
        let remaining = t - c;
        let arrived = (remaining >= 0.0 && s <= 0.0) || (remaining <= 0.0 && s >= 0.0);
        if arrived || s.abs() >= remaining.abs() {
            t
        } else {
            c + s
        }
    };

    Rgba::new(
        channel(current.r, target.r, step.r),
        channel(current.g, target.g, step.g),
        channel(current.b, target.b, step.b),
        channel(current.a, target.a, step.a),
    )
    .clamped()
}
