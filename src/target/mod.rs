// Purpose: per-target convergence loops driven by ON/OFF entry points
//
// A target owns the interpolation state for one renderable or a fixed array of
// them. Nothing here keeps time: every call to `step` is one tick, and the
// caller decides when the next tick happens based on the returned outcome.

mod array;
mod single;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use tracing::{debug, trace, warn};

use crate::{
    color::Rgba,
    envelope::EnvelopeParameters,
    io::sink::{PropertySink, RenderableId},
    math::step_towards,
};

use self::array::Drain;

/// What the caller should do after a step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    /// Run another step one update period from now.
    Reschedule,
    /// Nothing left to do until the next entry point call.
    Settled,
}

/// Observable state of a target, derived from its locks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetPhase {
    Idle,
    ConvergingOn,
    ConvergingOff,
    /// An array finishing its in-motion fades before an interrupting ON.
    Draining,
}

/// How an array reacts to ON arriving while an OFF ripple is in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum InterruptPolicy {
    /// Turn every element around from wherever it is.
    Redirect,
    /// Let elements already fading finish going dark, then start ON afresh.
    #[default]
    Drain,
}

/// Safety bounds on running loops.
///
/// Both limits are slack on top of the ticks the envelope itself asks for
/// (`duration * rate`, plus one tick per array child for the ripple), so long
/// envelopes are never cut short.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TargetLimits {
    /// Ticks past the attack's own length a deferred OFF may wait for the ON
    /// lock before it is dropped.
    pub release_retry_limit: u32,
    /// Ticks past its own length a convergence may take before it is forced
    /// onto its goal.
    pub convergence_tick_limit: u32,
    pub interrupt_policy: InterruptPolicy,
}

impl Default for TargetLimits {
    fn default() -> Self {
        // a forced attack settles before a parked OFF runs out of retries
        Self {
            release_retry_limit: 256,
            convergence_tick_limit: 128,
            interrupt_policy: InterruptPolicy::Drain,
        }
    }
}

/// Renderables driven by one target.
#[derive(Debug, Clone, PartialEq)]
pub enum TargetLayout {
    Single {
        renderable: RenderableId,
        secondary: Option<RenderableId>,
    },
    /// Children in sibling order. Secondaries pair up with children by position.
    Array {
        renderables: Vec<RenderableId>,
        secondaries: Vec<RenderableId>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct PendingRelease {
    retries: u32,
}

pub struct TargetBehavior {
    index: usize, // position in the controller's target list
    renderables: Vec<RenderableId>,
    secondaries: Vec<Option<RenderableId>>, // parallel to renderables
    is_array: bool,
    limits: TargetLimits,

    // Parameters: latest broadcast, and the snapshot the running loop uses
    latest: EnvelopeParameters,
    active: EnvelopeParameters,

    // Lock state
    on_lock: bool,
    off_lock: bool,
    running: bool, // a tick is outstanding

    // Convergence bookkeeping
    goal: Rgba,
    steps: Vec<Rgba>, // per renderable
    iteration: u32,
    ticks: u32,  // ticks since the current convergence began
    budget: u32, // ticks the current convergence is expected to take
    pending_release: Option<PendingRelease>,

    // Ring bookkeeping (arrays only)
    circular_start: usize,
    circular_stop: usize,
    reversed: bool,
    drain: Option<Drain>,
}

impl TargetBehavior {
    /// Build a target and write the transparent baseline to everything it drives.
    pub fn new(
        index: usize,
        layout: TargetLayout,
        limits: TargetLimits,
        params: EnvelopeParameters,
        sink: &mut impl PropertySink,
    ) -> Self {
        let (renderables, secondaries, is_array) = match layout {
            TargetLayout::Single {
                renderable,
                secondary,
            } => (vec![renderable], vec![secondary], false),
            TargetLayout::Array {
                renderables,
                secondaries,
            } => {
                if !secondaries.is_empty() && secondaries.len() != renderables.len() {
                    warn!(
                        target_index = index,
                        children = renderables.len(),
                        secondaries = secondaries.len(),
                        "secondary outputs do not match array length; unmatched entries are ignored"
                    );
                }
                if renderables.is_empty() {
                    warn!(target_index = index, "array target has no children");
                }
                let paired = (0..renderables.len())
                    .map(|i| secondaries.get(i).copied())
                    .collect();
                (renderables, paired, true)
            }
        };

        let mut target = Self {
            index,
            steps: vec![Rgba::TRANSPARENT; renderables.len()],
            renderables,
            secondaries,
            is_array,
            limits,
            latest: params,
            active: params,
            on_lock: false,
            off_lock: false,
            running: false,
            goal: Rgba::TRANSPARENT,
            iteration: 0,
            ticks: 0,
            budget: 0,
            pending_release: None,
            circular_start: 0,
            circular_stop: 0,
            reversed: false,
            drain: None,
        };

        for element in 0..target.renderables.len() {
            target.write(sink, element, Rgba::TRANSPARENT);
        }
        target
    }

    /// Replace the local copy of the shared parameters.
    ///
    /// A running convergence keeps the snapshot it started with.
    pub fn apply_parameters(&mut self, params: EnvelopeParameters) {
        self.latest = params;
    }

    /// ON entry point. Returns `true` when no loop is running and the caller
    /// must run the first step now.
    pub fn activate(&mut self, sink: &impl PropertySink) -> bool {
        if let Some(pending) = self.pending_release.take() {
            debug!(
                target_index = self.index,
                retries = pending.retries,
                "activation supersedes deferred release"
            );
        }

        self.on_lock = true;

        if self.off_lock {
            // consumed by the next step
            trace!(target_index = self.index, "activation interrupts release");
        } else if self.drain.is_none() {
            self.begin_on(sink);
        }

        !self.running
    }

    /// OFF entry point. While ON is converging the request is parked and
    /// re-checked on every tick of the running loop.
    pub fn deactivate(&mut self, sink: &impl PropertySink) -> bool {
        if self.on_lock {
            if self.pending_release.is_none() {
                debug!(target_index = self.index, "deferring release until attack settles");
                self.pending_release = Some(PendingRelease { retries: 0 });
            }
            return false;
        }

        self.begin_off(sink);
        !self.running
    }

    /// Advance one tick.
    pub fn step(&mut self, sink: &mut impl PropertySink) -> StepOutcome {
        if !self.on_lock && !self.off_lock {
            self.running = false;
            return StepOutcome::Settled;
        }

        self.ticks = self.ticks.saturating_add(1);
        // an ON waiting to interrupt restarts the clock instead
        let overdue = self.ticks > self.budget.saturating_add(self.limits.convergence_tick_limit)
            && !(self.on_lock && self.off_lock);
        let settled = if overdue {
            warn!(
                target_index = self.index,
                ticks = self.ticks,
                expected = self.budget,
                "convergence did not settle; forcing goal"
            );
            self.force_goal(sink);
            true
        } else if self.is_array {
            self.step_array(sink)
        } else {
            self.step_single(sink)
        };

        let outcome = if settled {
            self.finalize(sink)
        } else {
            self.poll_pending_release();
            StepOutcome::Reschedule
        };

        self.running = outcome == StepOutcome::Reschedule;
        outcome
    }

    fn begin_on(&mut self, sink: &impl PropertySink) {
        self.active = self.latest;
        self.goal = self.active.color.clamped();
        self.recompute_steps(sink, self.active.attack);
        self.reset_ring();
        self.start_clock(self.active.attack);
    }

    fn begin_off(&mut self, sink: &impl PropertySink) {
        self.off_lock = true;
        self.active = self.latest;
        self.goal = Rgba::TRANSPARENT;
        self.recompute_steps(sink, self.active.release);
        self.reset_ring();
        self.start_clock(self.active.release);
    }

    /// ON arrived during OFF: drop the OFF lock and head for the ON colour
    /// from wherever each renderable is now.
    fn redirect_on(&mut self, sink: &impl PropertySink) {
        self.off_lock = false;
        self.active = self.latest;
        self.goal = self.active.color.clamped();
        self.recompute_steps(sink, self.active.attack);
        self.reset_ring();
        self.start_clock(self.active.attack);
    }

    /// Restart the tick count for a convergence lasting `seconds`. A parked
    /// OFF starts waiting afresh on the new loop.
    pub(super) fn start_clock(&mut self, seconds: f32) {
        self.ticks = 0;
        self.budget = self
            .active
            .ticks_for(seconds)
            .saturating_add(self.renderables.len() as u32);
        if let Some(pending) = self.pending_release.as_mut() {
            pending.retries = 0;
        }
    }

    fn recompute_steps(&mut self, sink: &impl PropertySink, duration: f32) {
        let rate = self.active.rate_hz();
        for (step, id) in self.steps.iter_mut().zip(&self.renderables) {
            *step = step_towards(sink.color(*id), self.goal, duration, rate);
        }
    }

    fn finalize(&mut self, sink: &impl PropertySink) -> StepOutcome {
        self.on_lock = false;
        self.off_lock = false;
        self.drain = None;
        self.iteration = 0;
        self.ticks = 0;

        match self.pending_release.take() {
            Some(pending) => {
                debug!(
                    target_index = self.index,
                    retries = pending.retries,
                    "starting deferred release"
                );
                self.begin_off(sink);
                StepOutcome::Reschedule
            }
            None => StepOutcome::Settled,
        }
    }

    fn poll_pending_release(&mut self) {
        let Some(pending) = self.pending_release.as_mut() else {
            return;
        };
        pending.retries += 1;
        if pending.retries > self.budget.saturating_add(self.limits.release_retry_limit) {
            warn!(
                target_index = self.index,
                retries = pending.retries,
                "dropping deferred release; attack never settled"
            );
            self.pending_release = None;
        }
    }

    fn force_goal(&mut self, sink: &mut impl PropertySink) {
        let goal = self.goal;
        for element in 0..self.renderables.len() {
            self.write(sink, element, goal);
        }
    }

    /// Write a colour to one renderable and its secondary output.
    fn write(&self, sink: &mut impl PropertySink, element: usize, color: Rgba) {
        let color = color.clamped();
        sink.set_color_properties(self.renderables[element], color, color);
        if let Some(secondary) = self.secondaries[element] {
            sink.set_secondary(secondary, color * self.active.intensity_scale());
        }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn is_array(&self) -> bool {
        self.is_array
    }

    pub fn renderables(&self) -> &[RenderableId] {
        &self.renderables
    }

    pub fn on_lock(&self) -> bool {
        self.on_lock
    }

    pub fn off_lock(&self) -> bool {
        self.off_lock
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn iteration(&self) -> u32 {
        self.iteration
    }

    /// Ticks the parked OFF has waited so far, if one is parked.
    pub fn pending_release_retries(&self) -> Option<u32> {
        self.pending_release.map(|p| p.retries)
    }

    pub fn goal(&self) -> Rgba {
        self.goal
    }

    pub fn parameters(&self) -> &EnvelopeParameters {
        &self.latest
    }

    /// Parameters of the convergence in flight (or the last one).
    pub fn active_parameters(&self) -> &EnvelopeParameters {
        &self.active
    }

    pub fn phase(&self) -> TargetPhase {
        if self.drain.is_some() {
            TargetPhase::Draining
        } else if self.on_lock {
            TargetPhase::ConvergingOn
        } else if self.off_lock {
            TargetPhase::ConvergingOff
        } else {
            TargetPhase::Idle
        }
    }
}
