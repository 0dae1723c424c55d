use tracing::{debug, trace};

use super::{control_map::Parameter, Controller, Routed};

/// Parameters reachable from nudge pads, two pads each: even raises, odd lowers.
pub const NUDGE_ORDER: [Parameter; 10] = [
    Parameter::Red,
    Parameter::Green,
    Parameter::Blue,
    Parameter::Alpha,
    Parameter::HueShift,
    Parameter::Attack,
    Parameter::Decay,
    Parameter::Sustain,
    Parameter::Release,
    Parameter::Intensity,
];

impl Controller {
    /// Apply the nudge for pad `offset` above the threshold.
    pub(super) fn nudge(&mut self, offset: usize) -> Routed {
        let Some(&parameter) = NUDGE_ORDER.get(offset / 2) else {
            debug!(offset, "no parameter for nudge pad");
            return Routed::Ignored;
        };

        let (min, max) = self.range(parameter);
        let delta = self.config.nudge_step * (max - min);
        let delta = if offset % 2 == 0 { delta } else { -delta };
        let value = (self.value(parameter) + delta).clamp(min, max);

        trace!(parameter = parameter.name(), value, "nudged");
        self.set_value(parameter, value);
        self.commit();
        Routed::Absorbed
    }
}
