use glowpad::{
    io::{
        midi::MidiEvent,
        sink::{PropertySink, RenderableId, SceneBuffer},
    },
    Controller, ControllerConfig, Engine, EnvelopeParameters, InterruptPolicy, Rgba, Routed,
    SequencingMode, TargetLayout, TargetPhase,
};

const RED: Rgba = Rgba::new(1.0, 0.0, 0.0, 1.0);

fn note_on(key: u8) -> MidiEvent {
    MidiEvent::NoteOn {
        channel: 0,
        key,
        velocity: 100,
    }
}

fn note_off(key: u8) -> MidiEvent {
    MidiEvent::NoteOff {
        channel: 0,
        key,
        velocity: 0,
    }
}

fn cc(controller: u8, value: u8) -> MidiEvent {
    MidiEvent::ControlChange {
        channel: 0,
        controller,
        value,
    }
}

fn envelope(color: Rgba, attack: f32, release: f32) -> EnvelopeParameters {
    EnvelopeParameters {
        color,
        attack,
        release,
        update_rate_hz: 10.0,
        ..Default::default()
    }
}

fn single_engine(config: ControllerConfig, n: usize) -> (Engine<SceneBuffer>, Vec<RenderableId>) {
    let mut engine = Engine::new(Controller::new(config), SceneBuffer::new());
    let (controller, scene) = engine.parts_mut();
    let mut ids = Vec::new();
    for _ in 0..n {
        let renderable = scene.add_renderable();
        controller.add_target(
            TargetLayout::Single {
                renderable,
                secondary: None,
            },
            scene,
        );
        ids.push(renderable);
    }
    (engine, ids)
}

fn array_engine(config: ControllerConfig, n: usize) -> (Engine<SceneBuffer>, Vec<RenderableId>) {
    let mut engine = Engine::new(Controller::new(config), SceneBuffer::new());
    let (controller, scene) = engine.parts_mut();
    let renderables = scene.add_renderables(n);
    controller.add_target(
        TargetLayout::Array {
            renderables: renderables.clone(),
            secondaries: Vec::new(),
        },
        scene,
    );
    (engine, renderables)
}

fn run_until_idle(engine: &mut Engine<SceneBuffer>, max_ticks: usize) {
    for _ in 0..max_ticks {
        if engine.is_idle() {
            return;
        }
        engine.tick();
    }
    assert!(engine.is_idle(), "engine still busy after {max_ticks} ticks");
}

#[test]
fn attack_with_release_held_behind_it() {
    let config = ControllerConfig::new().envelope(envelope(RED, 2.0, 1.0));
    let (mut engine, ids) = single_engine(config, 1);
    let id = ids[0];

    assert_eq!(engine.handle_event(note_on(36)), Routed::Start(0));
    for _ in 0..4 {
        engine.tick();
    }
    assert_eq!(engine.steps_run(), 5);

    // OFF during the attack waits for it
    assert_eq!(engine.handle_event(note_off(36)), Routed::Absorbed);
    let target = engine.controller().target(0).unwrap();
    assert!(target.on_lock());
    assert!(!target.off_lock());

    for _ in 0..14 {
        engine.tick();
        assert!(engine.controller().target(0).unwrap().on_lock());
    }
    assert_eq!(engine.steps_run(), 19);

    // step 20 converges and hands over to the release
    engine.tick();
    let target = engine.controller().target(0).unwrap();
    assert!(!target.on_lock());
    assert!(target.off_lock());
    assert_eq!(engine.sink().color(id), RED);

    let before = engine.steps_run();
    run_until_idle(&mut engine, 100);
    assert_eq!(engine.steps_run() - before, 10);
    assert_eq!(engine.sink().color(id), Rgba::TRANSPARENT);
    assert_eq!(engine.controller().target(0).unwrap().phase(), TargetPhase::Idle);
}

#[test]
fn wall_clock_advance_matches_tick_count() {
    let config = ControllerConfig::new().envelope(envelope(RED, 2.0, 1.0));
    let (mut engine, ids) = single_engine(config, 1);

    engine.handle_event(note_on(36));
    engine.advance(1.8);
    assert_eq!(engine.steps_run(), 19);
    assert!(engine.sink().color(ids[0]).r < 1.0);

    engine.advance(0.1);
    assert_eq!(engine.steps_run(), 20);
    assert_eq!(engine.sink().color(ids[0]), RED);
    assert!(engine.is_idle());
}

#[test]
fn pressing_again_during_release_rises_from_where_it_is() {
    let config = ControllerConfig::new().envelope(envelope(RED, 1.0, 1.0));
    let (mut engine, ids) = single_engine(config, 1);
    let id = ids[0];

    engine.handle_event(note_on(36));
    run_until_idle(&mut engine, 100);
    engine.handle_event(note_off(36));
    for _ in 0..4 {
        engine.tick();
    }
    let partway = engine.sink().color(id);
    assert!(partway.r > 0.3 && partway.r < 0.8, "got {partway:?}");

    // loop is still running, so no immediate step
    assert_eq!(engine.handle_event(note_on(36)), Routed::Absorbed);
    engine.tick();
    assert!(engine.sink().color(id).r > partway.r);

    run_until_idle(&mut engine, 100);
    assert_eq!(engine.sink().color(id), RED);
}

#[test]
fn knobs_shape_the_array_ripple() {
    let config = ControllerConfig::new().envelope(envelope(Rgba::WHITE, 0.5, 0.5));
    let (mut engine, ids) = array_engine(config, 5);

    // offset 2, ripple
    engine.handle_event(cc(20, 2));
    engine.handle_event(cc(21, 64));
    let params = engine.controller().parameters();
    assert_eq!(params.starting_array_index_offset, 2);
    assert_eq!(params.sequencing, SequencingMode::Ripple);

    engine.handle_event(note_on(36));
    let touched = |engine: &Engine<SceneBuffer>| -> Vec<bool> {
        ids.iter()
            .map(|id| engine.sink().props(*id).map(|p| p.writes).unwrap_or(0) > 1)
            .collect()
    };
    assert_eq!(touched(&engine), vec![false, false, true, false, false]);
    engine.tick();
    assert_eq!(touched(&engine), vec![false, false, true, true, false]);

    run_until_idle(&mut engine, 200);
    for id in &ids {
        assert_eq!(engine.sink().color(*id), Rgba::WHITE);
    }

    let target = engine.controller().target(0).unwrap();
    assert_eq!(target.circular_start(), 2);
    assert_eq!(target.circular_stop(), 1);
}

#[test]
fn drained_array_comes_back_without_snapping() {
    let config = ControllerConfig::new()
        .envelope(EnvelopeParameters {
            sequencing: SequencingMode::Ripple,
            ..envelope(Rgba::WHITE, 1.0, 1.0)
        })
        .interrupt_policy(InterruptPolicy::Drain);
    let (mut engine, ids) = array_engine(config, 6);

    engine.handle_event(note_on(36));
    run_until_idle(&mut engine, 200);
    engine.handle_event(note_off(36));
    for _ in 0..3 {
        engine.tick();
    }
    engine.handle_event(note_on(36));

    // no child moves more than one step per tick while draining or rising
    let mut last: Vec<Rgba> = ids.iter().map(|id| engine.sink().color(*id)).collect();
    for _ in 0..200 {
        if engine.is_idle() {
            break;
        }
        engine.tick();
        for (i, id) in ids.iter().enumerate() {
            let now = engine.sink().color(*id);
            assert!((now.r - last[i].r).abs() <= 0.1 + 1e-4, "child {i} jumped");
            last[i] = now;
        }
    }
    assert!(engine.is_idle());
    for id in &ids {
        assert_eq!(engine.sink().color(*id), Rgba::WHITE);
    }
}

#[test]
fn parameter_changes_do_not_tear_running_targets() {
    let config = ControllerConfig::new().envelope(envelope(RED, 1.0, 1.0));
    let (mut engine, ids) = single_engine(config, 2);

    engine.handle_event(note_on(36));
    engine.tick();
    // red to zero, green to full
    engine.handle_event(cc(10, 0));
    engine.handle_event(cc(74, 127));
    engine.handle_event(note_on(37));

    run_until_idle(&mut engine, 100);
    assert_eq!(engine.sink().color(ids[0]), RED);
    assert_eq!(engine.sink().color(ids[1]), Rgba::new(0.0, 1.0, 0.0, 1.0));
}

#[test]
fn nudge_pads_tune_without_firing_targets() {
    let config = ControllerConfig::new()
        .note_range(36, 52)
        .pads_as_cc(8, 0.1)
        .envelope(envelope(RED, 1.0, 1.0));
    let (mut engine, ids) = single_engine(config, 8);

    // nudge pad 7 lowers alpha
    assert_eq!(engine.handle_event(note_on(36 + 8 + 7)), Routed::Absorbed);
    assert!((engine.controller().parameters().color.a - 0.9).abs() < 1e-5);
    assert!(engine.is_idle());

    engine.handle_event(note_on(36));
    run_until_idle(&mut engine, 100);
    assert!((engine.sink().color(ids[0]).a - 0.9).abs() < 1e-5);
}

#[test]
fn out_of_range_and_unmapped_events_change_nothing() {
    let (mut engine, ids) = single_engine(ControllerConfig::default(), 1);
    let before = *engine.controller().parameters();

    assert_eq!(engine.handle_event(note_on(12)), Routed::Ignored);
    assert_eq!(engine.handle_event(cc(3, 64)), Routed::Ignored);
    assert_eq!(
        engine.handle_event(MidiEvent::ProgramChange {
            channel: 0,
            program: 4
        }),
        Routed::Ignored
    );
    assert_eq!(*engine.controller().parameters(), before);
    assert_eq!(engine.sink().color(ids[0]), Rgba::TRANSPARENT);
    assert!(engine.is_idle());
}

#[cfg(feature = "serde")]
#[test]
fn toml_config_drives_the_engine() {
    let config = ControllerConfig::from_toml_str(
        r#"
        min_note = 60
        max_note = 64

        [envelope]
        attack = 0.3
        release = 0.3
        update_rate_hz = 10.0

        [envelope.color]
        r = 0.0
        g = 0.0
        b = 1.0
        a = 1.0
        "#,
    )
    .unwrap();
    let (mut engine, ids) = single_engine(config, 4);

    assert_eq!(engine.handle_event(note_on(36)), Routed::Ignored);
    assert_eq!(engine.handle_event(note_on(63)), Routed::Start(3));
    run_until_idle(&mut engine, 20);
    assert_eq!(engine.sink().color(ids[3]), Rgba::new(0.0, 0.0, 1.0, 1.0));
    assert_eq!(engine.steps_run(), 3);
}
