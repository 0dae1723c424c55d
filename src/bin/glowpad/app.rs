//! Glowpad - scene builder and runner

use std::thread;

use color_eyre::eyre::{eyre, Result as EyreResult, WrapErr};
use glowpad::{
    io::{midi::MidiEvent, observer::VisualizerMessage, sink::SceneBuffer},
    Controller, ControllerConfig, Engine, TargetLayout,
};
use rtrb::{Producer, RingBuffer};
use tracing::info;

use super::driver::{capture, Driver};
use super::ui::{
    state::{ControlMessage, SceneSnapshot, TargetStaticInfo, UiStateInit, MAX_CHILDREN, MAX_TARGETS},
    UiApp,
};

const EVENT_QUEUE: usize = 256;
const VISUALIZER_QUEUE: usize = 256;
const SNAPSHOT_QUEUE: usize = 8;

/// Main application builder
pub struct Glowpad {
    config: ControllerConfig,
    arrays: usize,
    children: usize,
}

impl Glowpad {
    pub fn new(config: ControllerConfig) -> Self {
        Self {
            config,
            arrays: 0,
            children: 0,
        }
    }

    /// Make the last `count` targets arrays of `children` renderables each
    pub fn arrays(mut self, count: usize, children: usize) -> Self {
        self.arrays = count;
        self.children = children.clamp(1, MAX_CHILDREN);
        self
    }

    /// Pads that fire targets (the rest, if any, nudge parameters)
    fn target_count(&self) -> usize {
        let pads = self.config.pad_count();
        let firing = match self.config.pad_cc_threshold {
            Some(threshold) => (threshold as usize).min(pads),
            None => pads,
        };
        firing.min(MAX_TARGETS)
    }

    /// Build the scene: singles first, arrays at the end of the grid
    fn build(
        &self,
        observer: Producer<VisualizerMessage>,
    ) -> (Engine<SceneBuffer>, Vec<TargetStaticInfo>) {
        let controller = Controller::new(self.config.clone()).with_observer(observer);
        let mut engine = Engine::new(controller, SceneBuffer::new());
        let (controller, scene) = engine.parts_mut();

        let count = self.target_count();
        let first_array = count.saturating_sub(self.arrays);
        let mut infos = Vec::with_capacity(count);

        for index in 0..count {
            let note = self.config.min_note as usize + index;
            if index >= first_array {
                let renderables = scene.add_renderables(self.children);
                let secondaries = scene.add_renderables(self.children);
                controller.add_target(
                    TargetLayout::Array {
                        renderables,
                        secondaries,
                    },
                    scene,
                );
                infos.push(TargetStaticInfo {
                    name: format!("{note} arr"),
                    is_array: true,
                });
            } else {
                let renderable = scene.add_renderable();
                let secondary = Some(scene.add_renderable());
                controller.add_target(
                    TargetLayout::Single {
                        renderable,
                        secondary,
                    },
                    scene,
                );
                infos.push(TargetStaticInfo {
                    name: format!("{note} pad"),
                    is_array: false,
                });
            }
        }

        info!(targets = count, arrays = count - first_array, "scene built");
        (engine, infos)
    }

    /// Run the application (takes over the terminal)
    pub fn run(self) -> EyreResult<()> {
        self.config.validate()?;

        let (visualizer_tx, visualizer_rx) = RingBuffer::<VisualizerMessage>::new(VISUALIZER_QUEUE);
        let (event_tx, event_rx) = RingBuffer::<MidiEvent>::new(EVENT_QUEUE);
        let (snapshot_tx, snapshot_rx) = RingBuffer::<SceneSnapshot>::new(SNAPSHOT_QUEUE);
        let (control_tx, control_rx) = RingBuffer::<ControlMessage>::new(4);

        let (engine, targets) = self.build(visualizer_tx);
        let init = UiStateInit {
            min_note: self.config.min_note,
            pad_count: self.config.pad_count(),
            pad_cc_threshold: self.config.pad_cc_threshold,
            max_time: self.config.max_time,
            max_intensity: self.config.max_intensity,
            controls: self.config.controls,
            params: *engine.controller().parameters(),
            targets,
        };
        let first_snapshot = capture(&engine);

        let driver = Driver::new(engine, event_rx, snapshot_tx, control_rx);
        let handle = thread::Builder::new()
            .name("glowpad-engine".into())
            .spawn(move || driver.run())
            .wrap_err("failed to spawn engine thread")?;

        let mut terminal = ratatui::init();
        let mut ui = UiApp::new(init, first_snapshot, event_tx, snapshot_rx, visualizer_rx, control_tx);
        let result = ui.run(&mut terminal);
        ratatui::restore();

        handle
            .join()
            .map_err(|_| eyre!("engine thread panicked"))?;
        result
    }
}
