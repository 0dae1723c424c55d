//! Driver - runs the engine against the wall clock
//!
//! The driver owns the engine on its own thread. Each turn of the loop it
//! handles queued events, advances engine time by the real time that passed,
//! and now and then publishes a snapshot for the UI.

use std::{
    thread,
    time::{Duration, Instant},
};

use glowpad::{
    io::{midi::MidiEvent, sink::{PropertySink, SceneBuffer}},
    Engine,
};
use rtrb::{Consumer, Producer};
use tracing::{debug, info};

use crate::ui::state::{ControlMessage, SceneSnapshot, MAX_CHILDREN, MAX_TARGETS};

/// How often the UI gets a fresh snapshot
const PUBLISH_INTERVAL: Duration = Duration::from_millis(33);
/// Sleep between loop turns; well under any update period
const TURN_SLEEP: Duration = Duration::from_millis(2);

pub struct Driver {
    engine: Engine<SceneBuffer>,
    events: Consumer<MidiEvent>,
    snapshots: Producer<SceneSnapshot>,
    control: Consumer<ControlMessage>,
}

impl Driver {
    pub fn new(
        engine: Engine<SceneBuffer>,
        events: Consumer<MidiEvent>,
        snapshots: Producer<SceneSnapshot>,
        control: Consumer<ControlMessage>,
    ) -> Self {
        Self {
            engine,
            events,
            snapshots,
            control,
        }
    }

    /// Loop until the UI asks to quit
    pub fn run(mut self) {
        let mut last = Instant::now();
        let mut last_publish = last;

        loop {
            while let Ok(message) = self.control.pop() {
                match message {
                    ControlMessage::Quit => {
                        info!(steps = self.engine.steps_run(), "engine stopping");
                        return;
                    }
                }
            }

            let handled = self.engine.drain_events(&mut self.events);
            if handled > 0 {
                debug!(handled, "events handled");
            }

            let now = Instant::now();
            self.engine.advance(now.duration_since(last).as_secs_f64());
            last = now;

            if now.duration_since(last_publish) >= PUBLISH_INTERVAL {
                // a full queue drops the snapshot; the next one supersedes it
                let _ = self.snapshots.push(capture(&self.engine));
                last_publish = now;
            }

            thread::sleep(TURN_SLEEP);
        }
    }
}

/// Copy what the UI needs out of the engine
pub fn capture(engine: &Engine<SceneBuffer>) -> SceneSnapshot {
    let mut snapshot = SceneSnapshot::new();
    snapshot.time = engine.now();
    snapshot.steps = engine.steps_run();

    let scene = engine.sink();
    let targets = engine.controller().targets();
    for (view, target) in snapshot.targets.iter_mut().zip(targets.iter().take(MAX_TARGETS)) {
        view.phase = target.phase();
        view.pending_release = target.pending_release_retries().is_some();
        view.iteration = target.iteration();
        let children = target.renderables().iter().take(MAX_CHILDREN);
        for (color, id) in view.colors.iter_mut().zip(children) {
            *color = scene.color(*id);
        }
        view.num_children = target.renderables().len().min(MAX_CHILDREN) as u8;
    }
    snapshot.num_targets = targets.len().min(MAX_TARGETS) as u8;
    snapshot
}
