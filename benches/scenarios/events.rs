//! Benchmarks for event routing with a full pad grid.

use std::hint::black_box;

use criterion::Criterion;
use glowpad::{
    io::{midi::MidiEvent, sink::SceneBuffer},
    Controller, ControllerConfig, Engine, TargetLayout,
};

const PADS: usize = 16;

fn pad_engine() -> Engine<SceneBuffer> {
    let config = ControllerConfig::new().note_range(36, 36 + PADS as u8);
    let mut engine = Engine::new(Controller::new(config), SceneBuffer::new());
    let (controller, scene) = engine.parts_mut();
    for _ in 0..PADS {
        let renderable = scene.add_renderable();
        let secondary = Some(scene.add_renderable());
        controller.add_target(
            TargetLayout::Single {
                renderable,
                secondary,
            },
            scene,
        );
    }
    engine
}

pub fn bench_events(c: &mut Criterion) {
    let mut group = c.benchmark_group("scenarios/events");

    // A knob sweep: every change is broadcast to every target
    let mut engine = pad_engine();
    let sweep: Vec<MidiEvent> = (0..128u8)
        .map(|value| MidiEvent::ControlChange {
            channel: 0,
            controller: 74,
            value,
        })
        .collect();
    group.bench_function("knob_sweep", |b| {
        b.iter(|| {
            for &event in &sweep {
                engine.handle_event(black_box(event));
            }
        })
    });

    // Every pad pressed and released, run until the scene is dark again
    let mut engine = pad_engine();
    group.bench_function("pad_grid_cycle", |b| {
        b.iter(|| {
            for pad in 0..PADS as u8 {
                engine.handle_event(MidiEvent::NoteOn {
                    channel: 0,
                    key: 36 + pad,
                    velocity: 100,
                });
            }
            engine.advance(black_box(0.5));
            for pad in 0..PADS as u8 {
                engine.handle_event(MidiEvent::NoteOff {
                    channel: 0,
                    key: 36 + pad,
                    velocity: 0,
                });
            }
            while !engine.is_idle() {
                engine.tick();
            }
        })
    });

    group.finish();
}
