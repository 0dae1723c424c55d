//! Shared envelope parameters.
//!
//! The controller owns one [`EnvelopeParameters`] and copies it into every
//! target whenever a knob moves. Targets take their own snapshot when a
//! convergence starts, so a change arriving mid-flight never tears it.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{color::Rgba, MIN_UPDATE_RATE_HZ};

/// How an array target walks its children.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum SequencingMode {
    /// Every element steps on every tick.
    #[default]
    Simultaneous,
    /// Element `k` positions after the start joins on tick `k`, walking forward.
    Ripple,
    /// Like `Ripple`, walking the ring backward.
    ReverseRipple,
}

impl SequencingMode {
    pub fn delays_sequential_indexes(self) -> bool {
        !matches!(self, SequencingMode::Simultaneous)
    }

    pub fn is_reversed(self) -> bool {
        matches!(self, SequencingMode::ReverseRipple)
    }

    /// Split the normalised knob range into thirds.
    pub fn from_normalized(value: f32) -> Self {
        if value < 1.0 / 3.0 {
            SequencingMode::Simultaneous
        } else if value < 2.0 / 3.0 {
            SequencingMode::Ripple
        } else {
            SequencingMode::ReverseRipple
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct EnvelopeParameters {
    pub color: Rgba, // ON target colour
    pub attack: f32,  // seconds, 0 → color
    pub decay: f32,   // seconds, stored only
    pub sustain: f32, // seconds, stored only
    pub release: f32, // seconds, color → transparent
    pub update_rate_hz: f32,
    pub intensity_multiplier: f32, // secondary channel gain is 2^this

    // Array policy
    pub starting_array_index_offset: i32,
    pub use_behavior_index: bool,
    pub sequencing: SequencingMode,
}

impl Default for EnvelopeParameters {
    fn default() -> Self {
        Self {
            color: Rgba::WHITE,
            attack: 1.0,
            decay: 1.0,
            sustain: 1.0,
            release: 1.0,
            update_rate_hz: 20.0,
            intensity_multiplier: 4.0,
            starting_array_index_offset: 0,
            use_behavior_index: false,
            sequencing: SequencingMode::Simultaneous,
        }
    }
}

impl EnvelopeParameters {
    /// Seconds between two ticks of a convergence loop.
    pub fn update_period(&self) -> f32 {
        1.0 / self.rate_hz()
    }

    pub(crate) fn rate_hz(&self) -> f32 {
        self.update_rate_hz.max(MIN_UPDATE_RATE_HZ)
    }

    /// Gain applied to the secondary (area light) output.
    pub fn intensity_scale(&self) -> f32 {
        2f32.powf(self.intensity_multiplier)
    }

    pub fn delay_sequential_indexes(&self) -> bool {
        self.sequencing.delays_sequential_indexes()
    }

    /// Upper bound on ticks a convergence lasting `seconds` needs, plus one
    /// for the snap.
    pub(crate) fn ticks_for(&self, seconds: f32) -> u32 {
        ((seconds.max(0.0) * self.rate_hz()).ceil() as u32).saturating_add(1)
    }

    pub(crate) fn release_ticks(&self) -> u32 {
        self.ticks_for(self.release)
    }
}
