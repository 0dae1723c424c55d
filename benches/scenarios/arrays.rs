//! Benchmarks for array targets stepped through the engine.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use glowpad::{
    io::{midi::MidiEvent, sink::SceneBuffer},
    Controller, ControllerConfig, Engine, EnvelopeParameters, Rgba, SequencingMode, TargetLayout,
};

use crate::ARRAY_SIZES;

fn array_engine(size: usize, sequencing: SequencingMode) -> Engine<SceneBuffer> {
    let config = ControllerConfig::new().envelope(EnvelopeParameters {
        color: Rgba::new(0.2, 0.6, 1.0, 1.0),
        attack: 0.5,
        release: 0.5,
        sequencing,
        ..Default::default()
    });
    let mut engine = Engine::new(Controller::new(config), SceneBuffer::new());
    let (controller, scene) = engine.parts_mut();
    let renderables = scene.add_renderables(size);
    let secondaries = scene.add_renderables(size);
    controller.add_target(
        TargetLayout::Array {
            renderables,
            secondaries,
        },
        scene,
    );
    engine
}

fn run_to_idle(engine: &mut Engine<SceneBuffer>) {
    while !engine.is_idle() {
        engine.tick();
    }
}

pub fn bench_arrays(c: &mut Criterion) {
    let mut group = c.benchmark_group("scenarios/arrays");
    let on = MidiEvent::NoteOn {
        channel: 0,
        key: 36,
        velocity: 100,
    };
    let off = MidiEvent::NoteOff {
        channel: 0,
        key: 36,
        velocity: 0,
    };

    for &size in ARRAY_SIZES {
        // Attack and release, every child stepping every tick
        let mut engine = array_engine(size, SequencingMode::Simultaneous);
        group.bench_with_input(BenchmarkId::new("simultaneous_cycle", size), &size, |b, _| {
            b.iter(|| {
                engine.handle_event(black_box(on));
                run_to_idle(&mut engine);
                engine.handle_event(black_box(off));
                run_to_idle(&mut engine);
            })
        });

        // Same cycle with the staggered ripple
        let mut engine = array_engine(size, SequencingMode::Ripple);
        group.bench_with_input(BenchmarkId::new("ripple_cycle", size), &size, |b, _| {
            b.iter(|| {
                engine.handle_event(black_box(on));
                run_to_idle(&mut engine);
                engine.handle_event(black_box(off));
                run_to_idle(&mut engine);
            })
        });
    }

    group.finish();
}
