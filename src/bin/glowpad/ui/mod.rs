//! TUI module for glowpad
//!
//! Keyboard pads on top, live target colours below. Pad keys toggle notes,
//! arrow keys turn the selected knob.

mod params;
pub mod state;
mod targets;

use std::time::Duration;

use color_eyre::eyre::Result as EyreResult;
use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use glowpad::{
    controller::control_map::Parameter,
    io::{midi::MidiEvent, observer::VisualizerMessage},
    EnvelopeParameters,
};
use ratatui::{
    layout::{Constraint, Direction, Layout},
    style::{Color, Style},
    widgets::{Block, Borders, Paragraph},
    DefaultTerminal, Frame,
};
use rtrb::{Consumer, Producer};
use tracing::debug;

use params::{initial_knobs, render_params, KnobState};
use state::{ControlMessage, SceneSnapshot, UiStateInit};
use targets::render_targets;

/// Keys for pads 0, 1, 2, ... in order
const PAD_KEYS: &[char] = &[
    '1', '2', '3', '4', '5', '6', '7', '8', '9', '0', 'a', 's', 'd', 'f', 'g', 'h', 'j', 'k', 'l',
];

/// Knob travel per arrow press
const KNOB_STEP: u8 = 4;
const KNOB_STEP_LARGE: u8 = 16;

/// UI application state
pub struct UiApp {
    init: UiStateInit,
    /// Events for the engine thread
    events: Producer<MidiEvent>,
    /// Snapshots from the engine thread
    snapshots: Consumer<SceneSnapshot>,
    /// Parameter changes and pad presses reported by the controller
    visualizer: Consumer<VisualizerMessage>,
    control: Producer<ControlMessage>,
    /// Latest snapshot received
    snapshot: SceneSnapshot,
    /// Latest parameters reported by the controller
    params: EnvelopeParameters,
    knobs: KnobState,
    /// Pads currently held down (toggled)
    held: Vec<bool>,
    last_pad: Option<usize>,
    should_quit: bool,
}

impl UiApp {
    pub fn new(
        init: UiStateInit,
        snapshot: SceneSnapshot,
        events: Producer<MidiEvent>,
        snapshots: Consumer<SceneSnapshot>,
        visualizer: Consumer<VisualizerMessage>,
        control: Producer<ControlMessage>,
    ) -> Self {
        Self {
            params: init.params,
            knobs: initial_knobs(&init),
            held: vec![false; init.pad_count],
            init,
            events,
            snapshots,
            visualizer,
            control,
            snapshot,
            last_pad: None,
            should_quit: false,
        }
    }

    /// Run the UI event loop. The engine thread is told to stop on the way
    /// out, whether or not the loop failed.
    pub fn run(&mut self, terminal: &mut DefaultTerminal) -> EyreResult<()> {
        let result = self.event_loop(terminal);
        let _ = self.control.push(ControlMessage::Quit);
        result
    }

    fn event_loop(&mut self, terminal: &mut DefaultTerminal) -> EyreResult<()> {
        while !self.should_quit {
            self.poll_engine();

            terminal.draw(|frame| self.render(frame))?;

            // Handle keyboard input (non-blocking, ~60fps)
            if event::poll(Duration::from_millis(16))? {
                if let Event::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press {
                        self.handle_key(key.code);
                    }
                }
            }
        }

        Ok(())
    }

    /// Keep only the latest snapshot; apply every visualizer message
    fn poll_engine(&mut self) {
        while let Ok(snapshot) = self.snapshots.pop() {
            self.snapshot = snapshot;
        }
        while let Ok(message) = self.visualizer.pop() {
            match message {
                VisualizerMessage::Parameters(params) => self.params = params,
                VisualizerMessage::PadToggled(pad) => self.last_pad = Some(pad),
            }
        }
    }

    fn handle_key(&mut self, key: KeyCode) {
        match key {
            KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => {
                self.should_quit = true;
            }
            KeyCode::Char(' ') => self.release_all(),
            KeyCode::Right | KeyCode::Tab => self.knobs.select_next(),
            KeyCode::Left | KeyCode::BackTab => self.knobs.select_previous(),
            KeyCode::Up => self.turn(KNOB_STEP as i16),
            KeyCode::Down => self.turn(-(KNOB_STEP as i16)),
            KeyCode::PageUp => self.turn(KNOB_STEP_LARGE as i16),
            KeyCode::PageDown => self.turn(-(KNOB_STEP_LARGE as i16)),
            KeyCode::Char(c) => {
                if let Some(pad) = PAD_KEYS.iter().position(|&k| k == c) {
                    self.toggle_pad(pad);
                }
            }
            _ => {}
        }
    }

    fn is_nudge_pad(&self, pad: usize) -> bool {
        self.init
            .pad_cc_threshold
            .is_some_and(|threshold| pad >= threshold as usize)
    }

    fn toggle_pad(&mut self, pad: usize) {
        if pad >= self.held.len() {
            return;
        }
        let key = self.init.min_note + pad as u8;

        // nudge pads are momentary
        if self.is_nudge_pad(pad) {
            self.send(MidiEvent::NoteOn { channel: 0, key, velocity: 100 });
            self.send(MidiEvent::NoteOff { channel: 0, key, velocity: 0 });
            return;
        }

        self.held[pad] = !self.held[pad];
        if self.held[pad] {
            self.send(MidiEvent::NoteOn { channel: 0, key, velocity: 100 });
        } else {
            self.send(MidiEvent::NoteOff { channel: 0, key, velocity: 0 });
        }
    }

    fn release_all(&mut self) {
        for pad in 0..self.held.len() {
            if self.held[pad] {
                self.held[pad] = false;
                let key = self.init.min_note + pad as u8;
                self.send(MidiEvent::NoteOff { channel: 0, key, velocity: 0 });
            }
        }
    }

    fn turn(&mut self, delta: i16) {
        let parameter: Parameter = self.knobs.selected();
        let value = self.knobs.turn(delta);
        let controller = self.init.controls.controller_for(parameter);
        self.send(MidiEvent::ControlChange {
            channel: 0,
            controller,
            value,
        });
    }

    fn send(&mut self, event: MidiEvent) {
        if self.events.push(event).is_err() {
            debug!(?event, "event queue full; dropped");
        }
    }

    fn render(&self, frame: &mut Frame) {
        let area = frame.area();

        // Main layout: parameters, targets, help
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(6), // Parameters
                Constraint::Min(6),    // Targets
                Constraint::Length(1), // Help bar
            ])
            .split(area);

        render_params(
            frame,
            chunks[0],
            &self.params,
            &self.knobs,
            &self.snapshot,
            self.last_pad,
        );

        let targets_block = Block::default().title(" Targets ").borders(Borders::ALL);
        let targets_inner = targets_block.inner(chunks[1]);
        frame.render_widget(targets_block, chunks[1]);
        render_targets(frame, targets_inner, &self.init, &self.snapshot, &self.held);

        let help = Paragraph::new(
            " [1-0,a-l] Pads  [←/→] Knob  [↑/↓ PgUp/PgDn] Turn  [Space] Release all  [Q] Quit",
        )
        .style(Style::default().fg(Color::DarkGray));
        frame.render_widget(help, chunks[2]);
    }
}
