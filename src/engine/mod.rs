//! Engine - single-threaded driver for the controller and its targets
//!
//! Events go in through [`Engine::handle_event`] (or a ring buffer drained with
//! [`Engine::drain_events`]); time goes in through [`Engine::advance`]. Every
//! convergence step runs from here, one wake-up at a time, in deadline order.

pub mod scheduler;

use tracing::trace;

use crate::{
    controller::{Controller, Routed},
    io::{
        midi::{EventReceiver, MidiEvent},
        sink::PropertySink,
    },
    target::StepOutcome,
};

use self::scheduler::Scheduler;

/// A pending step for one target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Wakeup {
    pub target: usize,
}

pub struct Engine<S: PropertySink> {
    controller: Controller,
    sink: S,
    scheduler: Scheduler<Wakeup>,
    steps: u64,
}

impl<S: PropertySink> Engine<S> {
    pub fn new(controller: Controller, sink: S) -> Self {
        Self {
            controller,
            sink,
            scheduler: Scheduler::new(),
            steps: 0,
        }
    }

    /// Route one event. A target that has no loop running gets its first step
    /// immediately.
    pub fn handle_event(&mut self, event: MidiEvent) -> Routed {
        let routed = self.controller.handle_event(event, &self.sink);
        if let Routed::Start(target) = routed {
            self.run_step(target);
        }
        routed
    }

    /// Handle every event waiting in `receiver`. Returns how many were popped.
    pub fn drain_events(&mut self, receiver: &mut impl EventReceiver) -> usize {
        let mut count = 0;
        while let Some(event) = receiver.pop() {
            self.handle_event(event);
            count += 1;
        }
        count
    }

    /// Move time forward by `seconds`, running every step that falls due on
    /// the way. Returns the number of steps run.
    pub fn advance(&mut self, seconds: f64) -> usize {
        let until = self.scheduler.now() + seconds.max(0.0);
        let mut ran = 0;
        while let Some(wakeup) = self.scheduler.pop_due(until) {
            self.run_step(wakeup.target);
            ran += 1;
        }
        self.scheduler.set_now(until);
        ran
    }

    /// Jump to the next deadline and run everything due then. Returns the
    /// number of steps run; zero when nothing is scheduled.
    pub fn tick(&mut self) -> usize {
        let Some(due) = self.scheduler.next_due() else {
            return 0;
        };
        let mut ran = 0;
        while let Some(wakeup) = self.scheduler.pop_due(due) {
            self.run_step(wakeup.target);
            ran += 1;
        }
        ran
    }

    /// Run one step of `target` and schedule the next if it asks for one.
    pub fn run_step(&mut self, target: usize) {
        let Some(behavior) = self.controller.target_mut(target) else {
            trace!(target, "wake-up for unknown target");
            return;
        };

        self.steps += 1;
        if behavior.step(&mut self.sink) == StepOutcome::Reschedule {
            let period = behavior.active_parameters().update_period() as f64;
            self.scheduler.schedule_after(Wakeup { target }, period);
        }
    }

    /// Virtual time in seconds.
    pub fn now(&self) -> f64 {
        self.scheduler.now()
    }

    /// Outstanding wake-ups. At most one per target.
    pub fn pending(&self) -> usize {
        self.scheduler.len()
    }

    /// Steps run since construction.
    pub fn steps_run(&self) -> u64 {
        self.steps
    }

    pub fn is_idle(&self) -> bool {
        self.scheduler.is_empty()
    }

    pub fn controller(&self) -> &Controller {
        &self.controller
    }

    pub fn controller_mut(&mut self) -> &mut Controller {
        &mut self.controller
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    /// Split borrow for registering targets after construction.
    pub fn parts_mut(&mut self) -> (&mut Controller, &mut S) {
        (&mut self.controller, &mut self.sink)
    }
}
