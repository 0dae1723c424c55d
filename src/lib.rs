pub mod color;
pub mod config;
pub mod controller; // Event routing and shared parameters
pub mod engine; // Timer-driven step dispatch
pub mod envelope;
pub mod error;
pub mod io;
pub mod math;
pub mod target; // Per-target convergence loops

pub use color::Rgba;
pub use config::ControllerConfig;
pub use controller::{Controller, Routed};
pub use engine::Engine;
pub use envelope::{EnvelopeParameters, SequencingMode};
pub use error::{Error, Result};
pub use target::{InterruptPolicy, StepOutcome, TargetBehavior, TargetLayout, TargetLimits, TargetPhase};

/// Slowest loop rate accepted, so an update period is always finite.
pub const MIN_UPDATE_RATE_HZ: f32 = 1.0;
