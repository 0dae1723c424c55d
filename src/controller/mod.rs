// Purpose: route note and control events to targets and shared parameters
//
// The controller is the only writer of the shared envelope parameters. Every
// change is pushed to every target before any target acts on a note, so a
// target never starts a convergence with a stale colour or timing.

pub mod control_map;
mod pads;

use tracing::{debug, trace};

use crate::{
    color::Rgba,
    config::ControllerConfig,
    envelope::{EnvelopeParameters, SequencingMode},
    io::{
        authority::{Authority, LocalAuthority},
        midi::{normalize, MidiEvent},
        observer::ParameterObserver,
        sink::PropertySink,
    },
    target::{TargetBehavior, TargetLayout},
};

use self::control_map::Parameter;

pub use self::pads::NUDGE_ORDER;

/// What became of an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Routed {
    /// The target at this index has no loop running; run its first step now.
    Start(usize),
    /// Handled. Either a parameter changed or a running loop will pick it up.
    Absorbed,
    /// Dropped: wrong channel, out of range, unmapped, or no authority.
    Ignored,
}

pub struct Controller {
    config: ControllerConfig,
    targets: Vec<TargetBehavior>,

    // Knob state; `params.color` is `base_color` rotated by `hue_shift`
    base_color: Rgba,
    hue_shift: f32,
    params: EnvelopeParameters,

    authority: Box<dyn Authority + Send>,
    observer: Option<Box<dyn ParameterObserver + Send>>,
}

impl Controller {
    /// Controller with local authority and no observer.
    pub fn new(config: ControllerConfig) -> Self {
        let params = config.envelope;
        Self {
            base_color: params.color,
            hue_shift: 0.0,
            params,
            config,
            targets: Vec::new(),
            authority: Box::new(LocalAuthority),
            observer: None,
        }
    }

    pub fn with_authority(mut self, authority: impl Authority + Send + 'static) -> Self {
        self.authority = Box::new(authority);
        self
    }

    pub fn with_observer(mut self, observer: impl ParameterObserver + Send + 'static) -> Self {
        self.observer = Some(Box::new(observer));
        self
    }

    /// Register a target. Its index is its note offset from `min_note`.
    pub fn add_target(&mut self, layout: TargetLayout, sink: &mut impl PropertySink) -> usize {
        let index = self.targets.len();
        let target = TargetBehavior::new(index, layout, self.config.target_limits(), self.params, sink);
        self.targets.push(target);
        index
    }

    pub fn handle_event(&mut self, event: MidiEvent, sink: &impl PropertySink) -> Routed {
        if let Some(channel) = self.config.channel {
            if event.channel() != channel {
                trace!(?event, "event on filtered channel");
                return Routed::Ignored;
            }
        }

        match event {
            MidiEvent::NoteOn { key, .. } => self.handle_note(key, true, sink),
            MidiEvent::NoteOff { key, .. } => self.handle_note(key, false, sink),
            MidiEvent::ControlChange {
                controller, value, ..
            } => self.handle_control(controller, value),
            _ => {
                trace!(?event, "unhandled event");
                Routed::Ignored
            }
        }
    }

    fn handle_note(&mut self, key: u8, on: bool, sink: &impl PropertySink) -> Routed {
        if key < self.config.min_note || key >= self.config.max_note {
            trace!(key, "note outside pad range");
            return Routed::Ignored;
        }
        if !self.acquire_authority() {
            return Routed::Ignored;
        }

        let pad = (key - self.config.min_note) as usize;
        if let Some(observer) = self.observer.as_mut() {
            observer.pad_toggled(pad);
        }

        if let Some(threshold) = self.config.pad_cc_threshold {
            if pad >= threshold as usize {
                if on {
                    return self.nudge(pad - threshold as usize);
                }
                return Routed::Absorbed;
            }
        }

        let Some(target) = self.targets.get_mut(pad) else {
            debug!(pad, "no target for pad");
            return Routed::Ignored;
        };

        let start = if on {
            target.activate(sink)
        } else {
            target.deactivate(sink)
        };

        if start {
            Routed::Start(pad)
        } else {
            Routed::Absorbed
        }
    }

    fn handle_control(&mut self, controller: u8, value: u8) -> Routed {
        let Some(parameter) = self.config.controls.lookup(controller) else {
            debug!(controller, value, "unmapped controller");
            return Routed::Ignored;
        };
        if !self.acquire_authority() {
            return Routed::Ignored;
        }

        if parameter.is_continuous() {
            let (min, max) = self.range(parameter);
            self.set_value(parameter, min + normalize(value) * (max - min));
        } else {
            self.set_discrete(parameter, value);
        }

        trace!(parameter = parameter.name(), value, "parameter changed");
        self.commit();
        Routed::Absorbed
    }

    fn acquire_authority(&mut self) -> bool {
        if self.authority.is_owner() || self.authority.request_ownership() {
            return true;
        }
        debug!("authority not granted; dropping event");
        false
    }

    /// Range a continuous parameter spans at full knob travel.
    pub fn range(&self, parameter: Parameter) -> (f32, f32) {
        if parameter.is_time() {
            (0.0, self.config.max_time)
        } else if parameter == Parameter::Intensity {
            (0.0, self.config.max_intensity)
        } else {
            (0.0, 1.0)
        }
    }

    /// Current value of a continuous parameter in its own units.
    pub fn value(&self, parameter: Parameter) -> f32 {
        match parameter {
            Parameter::Red => self.base_color.r,
            Parameter::Green => self.base_color.g,
            Parameter::Blue => self.base_color.b,
            Parameter::Alpha => self.base_color.a,
            Parameter::HueShift => self.hue_shift,
            Parameter::Attack => self.params.attack,
            Parameter::Decay => self.params.decay,
            Parameter::Sustain => self.params.sustain,
            Parameter::Release => self.params.release,
            Parameter::Intensity => self.params.intensity_multiplier,
            Parameter::ArrayOffset => self.params.starting_array_index_offset as f32,
            Parameter::Sequencing => match self.params.sequencing {
                SequencingMode::Simultaneous => 0.0,
                SequencingMode::Ripple => 1.0,
                SequencingMode::ReverseRipple => 2.0,
            },
            Parameter::BehaviorIndex => {
                if self.params.use_behavior_index {
                    1.0
                } else {
                    0.0
                }
            }
        }
    }

    fn set_value(&mut self, parameter: Parameter, value: f32) {
        match parameter {
            Parameter::Red => self.base_color.r = value,
            Parameter::Green => self.base_color.g = value,
            Parameter::Blue => self.base_color.b = value,
            Parameter::Alpha => self.base_color.a = value,
            Parameter::HueShift => self.hue_shift = value,
            Parameter::Attack => self.params.attack = value,
            Parameter::Decay => self.params.decay = value,
            Parameter::Sustain => self.params.sustain = value,
            Parameter::Release => self.params.release = value,
            Parameter::Intensity => self.params.intensity_multiplier = value,
            Parameter::ArrayOffset | Parameter::Sequencing | Parameter::BehaviorIndex => {}
        }
    }

    fn set_discrete(&mut self, parameter: Parameter, value: u8) {
        match parameter {
            Parameter::ArrayOffset => self.params.starting_array_index_offset = value as i32,
            Parameter::Sequencing => {
                self.params.sequencing = SequencingMode::from_normalized(normalize(value))
            }
            Parameter::BehaviorIndex => self.params.use_behavior_index = value >= 64,
            _ => {}
        }
    }

    /// Rebuild the effective colour, push to every target, then tell the
    /// observer and the authority.
    fn commit(&mut self) {
        self.params.color = self.base_color.hue_rotated(self.hue_shift);
        self.broadcast();
        if let Some(observer) = self.observer.as_mut() {
            observer.parameters_changed(&self.params);
        }
        self.authority.request_serialization(&self.params);
    }

    /// Push the current parameters to every target.
    pub fn broadcast(&mut self) {
        for target in &mut self.targets {
            target.apply_parameters(self.params);
        }
    }

    /// Adopt parameters received from the owning peer. Ignored while this
    /// controller is the owner. Returns whether they were applied.
    pub fn receive_remote(&mut self, params: EnvelopeParameters) -> bool {
        if self.authority.is_owner() {
            debug!("owner ignores remote parameters");
            return false;
        }
        self.params = params;
        self.base_color = params.color;
        self.hue_shift = 0.0;
        self.broadcast();
        if let Some(observer) = self.observer.as_mut() {
            observer.parameters_changed(&self.params);
        }
        true
    }

    pub fn parameters(&self) -> &EnvelopeParameters {
        &self.params
    }

    pub fn config(&self) -> &ControllerConfig {
        &self.config
    }

    pub fn targets(&self) -> &[TargetBehavior] {
        &self.targets
    }

    pub fn target(&self, index: usize) -> Option<&TargetBehavior> {
        self.targets.get(index)
    }

    pub fn target_mut(&mut self, index: usize) -> Option<&mut TargetBehavior> {
        self.targets.get_mut(index)
    }
}
