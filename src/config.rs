//! Controller configuration.
//!
//! Built in code with the builder setters, or (with the `serde` feature)
//! loaded from TOML. Missing keys fall back to the defaults below.

#[cfg(feature = "serde")]
use std::{fs, path::Path};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{
    controller::control_map::ControlMap,
    envelope::EnvelopeParameters,
    error::{Error, Result},
    target::{InterruptPolicy, TargetLimits},
    MIN_UPDATE_RATE_HZ,
};

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ControllerConfig {
    /// Lowest note that maps to a target (pad 0).
    pub min_note: u8,
    /// One past the highest accepted note.
    pub max_note: u8,
    /// Only listen on this channel; `None` accepts all.
    pub channel: Option<u8>,
    /// Seconds a time knob at full travel maps to.
    pub max_time: f32,
    /// Intensity exponent a knob at full travel maps to.
    pub max_intensity: f32,
    /// Pads at or above this index nudge parameters instead of firing targets.
    pub pad_cc_threshold: Option<u8>,
    /// Fraction of a parameter's range one nudge moves it.
    pub nudge_step: f32,

    /// Ticks past the attack's length a deferred OFF may wait.
    pub release_retry_limit: u32,
    /// Ticks past its envelope's length a loop may run before it is forced.
    pub convergence_tick_limit: u32,
    pub interrupt_policy: InterruptPolicy,

    pub envelope: EnvelopeParameters,
    pub controls: ControlMap,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        let limits = TargetLimits::default();
        Self {
            min_note: 36,
            max_note: 53,
            channel: None,
            max_time: 5.0,
            max_intensity: 8.0,
            pad_cc_threshold: None,
            nudge_step: 0.05,
            release_retry_limit: limits.release_retry_limit,
            convergence_tick_limit: limits.convergence_tick_limit,
            interrupt_policy: limits.interrupt_policy,
            envelope: EnvelopeParameters::default(),
            controls: ControlMap::default(),
        }
    }
}

impl ControllerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Accept notes in `min..max`.
    pub fn note_range(mut self, min: u8, max: u8) -> Self {
        self.min_note = min;
        self.max_note = max;
        self
    }

    pub fn channel(mut self, channel: u8) -> Self {
        self.channel = Some(channel);
        self
    }

    pub fn max_time(mut self, seconds: f32) -> Self {
        self.max_time = seconds;
        self
    }

    pub fn max_intensity(mut self, exponent: f32) -> Self {
        self.max_intensity = exponent;
        self
    }

    /// Turn pads from `threshold` upward into parameter nudges.
    pub fn pads_as_cc(mut self, threshold: u8, step: f32) -> Self {
        self.pad_cc_threshold = Some(threshold);
        self.nudge_step = step;
        self
    }

    pub fn interrupt_policy(mut self, policy: InterruptPolicy) -> Self {
        self.interrupt_policy = policy;
        self
    }

    pub fn limits(mut self, release_retries: u32, convergence_ticks: u32) -> Self {
        self.release_retry_limit = release_retries;
        self.convergence_tick_limit = convergence_ticks;
        self
    }

    pub fn envelope(mut self, envelope: EnvelopeParameters) -> Self {
        self.envelope = envelope;
        self
    }

    pub fn controls(mut self, controls: ControlMap) -> Self {
        self.controls = controls;
        self
    }

    /// Number of notes that address targets (or nudge pads).
    pub fn pad_count(&self) -> usize {
        self.max_note.saturating_sub(self.min_note) as usize
    }

    pub fn target_limits(&self) -> TargetLimits {
        TargetLimits {
            release_retry_limit: self.release_retry_limit,
            convergence_tick_limit: self.convergence_tick_limit,
            interrupt_policy: self.interrupt_policy,
        }
    }

    pub fn validate(&self) -> Result<()> {
        let invalid = |msg: String| Err(Error::InvalidConfig(msg));

        if self.min_note >= self.max_note {
            return invalid(format!(
                "note range {}..{} is empty",
                self.min_note, self.max_note
            ));
        }
        if self.max_note > 128 {
            return invalid(format!("max_note {} exceeds 128", self.max_note));
        }
        if let Some(channel) = self.channel {
            if channel > 15 {
                return invalid(format!("channel {channel} is not in 0..16"));
            }
        }
        if !(self.max_time.is_finite() && self.max_time > 0.0) {
            return invalid(format!("max_time must be positive, got {}", self.max_time));
        }
        if !(self.max_intensity.is_finite() && self.max_intensity >= 0.0) {
            return invalid(format!(
                "max_intensity must be non-negative, got {}",
                self.max_intensity
            ));
        }
        if let Some(threshold) = self.pad_cc_threshold {
            if threshold as usize >= self.pad_count() {
                return invalid(format!(
                    "pad_cc_threshold {threshold} leaves no nudge pads in a range of {}",
                    self.pad_count()
                ));
            }
            if !(self.nudge_step > 0.0 && self.nudge_step <= 1.0) {
                return invalid(format!("nudge_step must be in (0, 1], got {}", self.nudge_step));
            }
        }
        if !(self.envelope.update_rate_hz.is_finite()
            && self.envelope.update_rate_hz >= MIN_UPDATE_RATE_HZ)
        {
            return invalid(format!(
                "update_rate_hz must be at least {MIN_UPDATE_RATE_HZ}, got {}",
                self.envelope.update_rate_hz
            ));
        }
        for (name, seconds) in [
            ("attack", self.envelope.attack),
            ("decay", self.envelope.decay),
            ("sustain", self.envelope.sustain),
            ("release", self.envelope.release),
        ] {
            if !(seconds.is_finite() && seconds >= 0.0) {
                return invalid(format!("{name} must be non-negative, got {seconds}"));
            }
        }
        if let Some((parameter, cc)) = self.controls.first_out_of_range() {
            return invalid(format!("{} mapped to controller {cc}", parameter.name()));
        }
        if let Some(cc) = self.controls.first_duplicate() {
            return invalid(format!("controller {cc} is mapped twice"));
        }
        if self.convergence_tick_limit == 0 {
            return invalid("convergence_tick_limit must be at least 1".to_string());
        }
        Ok(())
    }

    /// Parse and validate a TOML document.
    #[cfg(feature = "serde")]
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    #[cfg(feature = "serde")]
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = ControllerConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.pad_count(), 17);
    }

    #[test]
    fn builder_sets_fields() {
        let config = ControllerConfig::new()
            .note_range(60, 68)
            .channel(9)
            .max_time(2.0)
            .pads_as_cc(4, 0.1)
            .interrupt_policy(InterruptPolicy::Redirect)
            .limits(16, 256);

        assert_eq!(config.pad_count(), 8);
        assert_eq!(config.channel, Some(9));
        assert_eq!(config.pad_cc_threshold, Some(4));
        let limits = config.target_limits();
        assert_eq!(limits.release_retry_limit, 16);
        assert_eq!(limits.convergence_tick_limit, 256);
        assert_eq!(limits.interrupt_policy, InterruptPolicy::Redirect);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn rejects_bad_ranges() {
        assert!(ControllerConfig::new().note_range(40, 40).validate().is_err());
        assert!(ControllerConfig::new().channel(16).validate().is_err());
        assert!(ControllerConfig::new().max_time(0.0).validate().is_err());
        assert!(ControllerConfig::new().pads_as_cc(17, 0.1).validate().is_err());
        assert!(ControllerConfig::new().pads_as_cc(8, 0.0).validate().is_err());
    }

    #[test]
    fn rejects_duplicate_controls() {
        let controls = ControlMap {
            release: 10,
            ..Default::default()
        };
        let err = ControllerConfig::new().controls(controls).validate();
        assert!(matches!(err, Err(Error::InvalidConfig(_))));
    }

    #[cfg(feature = "serde")]
    #[test]
    fn parses_partial_toml() {
        let config = ControllerConfig::from_toml_str(
            r#"
            min_note = 48
            max_note = 64
            interrupt_policy = "redirect"

            [envelope]
            attack = 0.5
            sequencing = "reverse_ripple"

            [envelope.color]
            r = 1.0
            g = 0.5
            b = 0.0
            a = 1.0

            [controls]
            red = 1
            "#,
        )
        .unwrap();

        assert_eq!(config.min_note, 48);
        assert_eq!(config.interrupt_policy, InterruptPolicy::Redirect);
        assert_eq!(config.envelope.attack, 0.5);
        assert_eq!(config.envelope.release, 1.0);
        assert_eq!(config.envelope.color.g, 0.5);
        assert_eq!(config.controls.red, 1);
        assert_eq!(config.controls.green, 74);
        assert_eq!(config.max_time, 5.0);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn parse_errors_surface() {
        let err = ControllerConfig::from_toml_str("min_note = \"low\"");
        assert!(matches!(err, Err(Error::Toml(_))));

        let err = ControllerConfig::from_toml_str("min_note = 60\nmax_note = 50");
        assert!(matches!(err, Err(Error::InvalidConfig(_))));
    }
}
