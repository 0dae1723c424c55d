//! CC number → parameter routing.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Everything a knob can change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Parameter {
    Red,
    Green,
    Blue,
    Alpha,
    /// Turns of hue rotation applied on top of the base colour.
    HueShift,
    Attack,
    Decay,
    Sustain,
    Release,
    Intensity,
    ArrayOffset,
    Sequencing,
    BehaviorIndex,
}

impl Parameter {
    pub const ALL: [Parameter; 13] = [
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
        Parameter::ArrayOffset,
        Parameter::Sequencing,
        Parameter::BehaviorIndex,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Parameter::Red => "red",
            Parameter::Green => "green",
            Parameter::Blue => "blue",
            Parameter::Alpha => "alpha",
            Parameter::HueShift => "hue",
            Parameter::Attack => "attack",
            Parameter::Decay => "decay",
            Parameter::Sustain => "sustain",
            Parameter::Release => "release",
            Parameter::Intensity => "intensity",
            Parameter::ArrayOffset => "offset",
            Parameter::Sequencing => "sequencing",
            Parameter::BehaviorIndex => "behavior index",
        }
    }

    /// Seconds-valued parameters, scaled by `max_time`.
    pub fn is_time(self) -> bool {
        matches!(
            self,
            Parameter::Attack | Parameter::Decay | Parameter::Sustain | Parameter::Release
        )
    }

    /// Parameters with a continuous range that pads can nudge.
    pub fn is_continuous(self) -> bool {
        !matches!(
            self,
            Parameter::ArrayOffset | Parameter::Sequencing | Parameter::BehaviorIndex
        )
    }
}

/// Which controller number drives which parameter.
///
/// Defaults match the knob layout of a common 16-pad controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ControlMap {
    pub red: u8,
    pub green: u8,
    pub blue: u8,
    pub alpha: u8,
    pub hue_shift: u8,
    pub attack: u8,
    pub decay: u8,
    pub sustain: u8,
    pub release: u8,
    pub intensity: u8,
    pub array_offset: u8,
    pub sequencing: u8,
    pub behavior_index: u8,
}

impl Default for ControlMap {
    fn default() -> Self {
        Self {
            red: 10,
            green: 74,
            blue: 71,
            alpha: 76,
            hue_shift: 77,
            attack: 114,
            decay: 18,
            sustain: 19,
            release: 16,
            intensity: 75,
            array_offset: 20,
            sequencing: 21,
            behavior_index: 22,
        }
    }
}

impl ControlMap {
    pub fn controller_for(&self, parameter: Parameter) -> u8 {
        match parameter {
            Parameter::Red => self.red,
            Parameter::Green => self.green,
            Parameter::Blue => self.blue,
            Parameter::Alpha => self.alpha,
            Parameter::HueShift => self.hue_shift,
            Parameter::Attack => self.attack,
            Parameter::Decay => self.decay,
            Parameter::Sustain => self.sustain,
            Parameter::Release => self.release,
            Parameter::Intensity => self.intensity,
            Parameter::ArrayOffset => self.array_offset,
            Parameter::Sequencing => self.sequencing,
            Parameter::BehaviorIndex => self.behavior_index,
        }
    }

    /// First parameter mapped to `controller`, if any.
    pub fn lookup(&self, controller: u8) -> Option<Parameter> {
        Parameter::ALL
            .into_iter()
            .find(|&p| self.controller_for(p) == controller)
    }

    /// A controller number claimed by more than one parameter.
    pub fn first_duplicate(&self) -> Option<u8> {
        let mut seen = [false; 128];
        for parameter in Parameter::ALL {
            let cc = (self.controller_for(parameter) & 0x7F) as usize;
            if seen[cc] {
                return Some(cc as u8);
            }
            seen[cc] = true;
        }
        None
    }

    /// A controller number outside the 7-bit range.
    pub fn first_out_of_range(&self) -> Option<(Parameter, u8)> {
        Parameter::ALL
            .into_iter()
            .map(|p| (p, self.controller_for(p)))
            .find(|&(_, cc)| cc > 127)
    }
}
