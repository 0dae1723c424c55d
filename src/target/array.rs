use tracing::{debug, trace};

use super::{InterruptPolicy, TargetBehavior};
use crate::{
    color::Rgba,
    io::sink::PropertySink,
    math::{clamp_toward_target, next_index, previous_index, step_towards, wrap_index},
};

/*
Circular Array Sequencing
=========================

An array target animates N children with the same per-element convergence as
a single target, but walks them as a ring so updates can ripple outward from
a configurable starting child.

Vocabulary
----------

  ring position   k = 0..N, the order in which children are visited on a tick.
                  Position 0 is `circular_start`.

  start           wrap(behavior_index (if enabled) + offset, N)

  stop            The child visited last: previous(start) walking forward,
                  next(start) walking backward. The whole array is finished
                  when the stop child reaches its goal on a tick where every
                  other child has reached it too.

  iteration       Ticks since the walk began. With delayed sequencing, ring
                  position k is skipped until iteration >= k, so one more
                  child joins per tick.


Example: N = 5, offset = 2, forward
-----------------------------------

    ring position   0  1  2  3  4
    child index     2  3  4  0  1
                                ^ stop

    iteration 0:    2
    iteration 1:    2  3
    iteration 2:    2  3  4
    ...


Interrupts
----------

An ON that lands while an OFF ripple is running is seen on the next tick as
both locks held. The OFF lock is dropped on that same tick and one of two
things happens, depending on the interrupt policy:

  Redirect   every child turns around from its current colour toward the ON
             colour and the walk restarts from ring position 0.

  Drain      children the OFF ripple already reached keep fading until dark,
             for at most the ticks a full release would take. Then the ON walk
             starts from position 0 with steps computed from each child's live
             colour. Children the ripple never reached are left alone, so
             nothing visibly snaps back to a stale colour.
*/

/// Live colours are rounded to this many places before comparing.
const ARRAY_ROUNDING: i32 = 3;
/// Tolerance for "this child has arrived".
const ARRAY_PRECISION: i32 = 2;

/// Children still fading out after an interrupting ON.
#[derive(Debug, Clone, PartialEq)]
pub(super) struct Drain {
    elements: Vec<usize>,
    ticks_left: u32,
}

impl TargetBehavior {
    /// First child visited on every tick.
    pub fn starting_index(&self) -> usize {
        let n = self.renderables.len();
        if n == 0 {
            return 0;
        }
        let behavior = if self.active.use_behavior_index {
            self.index as i64
        } else {
            0
        };
        wrap_index(behavior + self.active.starting_array_index_offset as i64, n)
    }

    pub fn circular_start(&self) -> usize {
        self.circular_start
    }

    /// Child whose arrival finishes the whole array.
    pub fn circular_stop(&self) -> usize {
        self.circular_stop
    }

    /// Child visited at ring position `k`.
    pub fn ring_index(&self, k: usize) -> usize {
        let n = self.renderables.len();
        let offset = if self.reversed { -(k as i64) } else { k as i64 };
        wrap_index(self.circular_start as i64 + offset, n)
    }

    pub(super) fn reset_ring(&mut self) {
        self.iteration = 0;
        self.drain = None;
        let n = self.renderables.len();
        if !self.is_array || n == 0 {
            return;
        }
        self.reversed = self.active.sequencing.is_reversed();
        self.circular_start = self.starting_index();
        self.circular_stop = if self.reversed {
            next_index(self.circular_start, n)
        } else {
            previous_index(self.circular_start, n)
        };
    }

    /// One tick of the array loop. Returns `true` once the stop child arrives.
    pub(super) fn step_array(&mut self, sink: &mut impl PropertySink) -> bool {
        if self.renderables.is_empty() {
            return true;
        }

        if self.on_lock && self.off_lock {
            match self.limits.interrupt_policy {
                InterruptPolicy::Redirect => {
                    trace!(target_index = self.index, "redirecting array release into attack");
                    self.redirect_on(sink);
                }
                InterruptPolicy::Drain => self.begin_drain(sink),
            }
        }

        if self.drain.is_some() {
            self.step_drain(sink);
            return false;
        }

        self.walk_ring(sink)
    }

    fn walk_ring(&mut self, sink: &mut impl PropertySink) -> bool {
        let n = self.renderables.len();
        let delay = self.active.delay_sequential_indexes();
        let mut all_arrived = true;

        for k in 0..n {
            if delay && k as u32 > self.iteration {
                break;
            }

            let element = self.ring_index(k);
            let current = sink.color(self.renderables[element]).rounded(ARRAY_ROUNDING);

            if current.approx_eq(&self.goal, ARRAY_PRECISION) {
                self.write(sink, element, self.goal);
                // the stop child is always visited last
                if element == self.circular_stop && all_arrived {
                    return true;
                }
            } else {
                let next = clamp_toward_target(current, self.goal, self.steps[element]);
                self.write(sink, element, next);
                all_arrived = false;
            }
        }

        self.iteration += 1;
        false
    }

    fn begin_drain(&mut self, sink: &impl PropertySink) {
        self.off_lock = false;
        self.start_clock(self.active.release);

        let n = self.renderables.len();
        let reached = if self.active.delay_sequential_indexes() {
            (self.iteration as usize).min(n)
        } else if self.iteration > 0 {
            n
        } else {
            0
        };

        let elements: Vec<usize> = (0..reached)
            .map(|k| self.ring_index(k))
            .filter(|&element| {
                let current = sink.color(self.renderables[element]).rounded(ARRAY_ROUNDING);
                !current.approx_eq(&Rgba::TRANSPARENT, ARRAY_PRECISION)
            })
            .collect();

        debug!(
            target_index = self.index,
            in_motion = elements.len(),
            "draining array release before attack"
        );
        self.drain = Some(Drain {
            elements,
            ticks_left: self.active.release_ticks(),
        });
    }

    fn step_drain(&mut self, sink: &mut impl PropertySink) {
        let Some(mut drain) = self.drain.take() else {
            return;
        };

        let mut fading = Vec::with_capacity(drain.elements.len());
        for &element in &drain.elements {
            let current = sink.color(self.renderables[element]).rounded(ARRAY_ROUNDING);
            if current.approx_eq(&Rgba::TRANSPARENT, ARRAY_PRECISION) || drain.ticks_left == 0 {
                self.write(sink, element, Rgba::TRANSPARENT);
                continue;
            }
            let next = clamp_toward_target(current, Rgba::TRANSPARENT, self.steps[element]);
            self.write(sink, element, next);
            fading.push(element);
        }

        drain.elements = fading;
        drain.ticks_left = drain.ticks_left.saturating_sub(1);

        if drain.elements.is_empty() {
            trace!(target_index = self.index, "drain finished; starting attack walk");
            self.start_attack_walk(sink);
        } else {
            self.drain = Some(drain);
        }
    }

    fn start_attack_walk(&mut self, sink: &impl PropertySink) {
        self.active = self.latest;
        self.goal = self.active.color.clamped();
        let rate = self.active.rate_hz();
        for (step, id) in self.steps.iter_mut().zip(&self.renderables) {
            *step = step_towards(sink.color(*id), self.goal, self.active.attack, rate);
        }
        self.reset_ring();
        self.start_clock(self.active.attack);
    }
}
