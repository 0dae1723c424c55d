//! Shared state types for UI communication
//!
//! Static data is sent once at init; snapshots from the engine thread are
//! allocation-free.

use glowpad::{
    controller::control_map::ControlMap, EnvelopeParameters, Rgba, TargetPhase,
};

/// Targets shown in a snapshot.
pub const MAX_TARGETS: usize = 16;
/// Children shown per array target.
pub const MAX_CHILDREN: usize = 16;

/// Commands sent from the UI thread to the engine thread
#[derive(Clone, Copy, Debug)]
pub enum ControlMessage {
    /// Stop the engine loop
    Quit,
}

/// Static state sent once at initialization (can allocate)
#[derive(Clone)]
pub struct UiStateInit {
    /// Note of pad 0
    pub min_note: u8,
    /// Total pads, including nudge pads
    pub pad_count: usize,
    /// First nudge pad, if pads-as-CC is on
    pub pad_cc_threshold: Option<u8>,
    pub max_time: f32,
    pub max_intensity: f32,
    pub controls: ControlMap,
    /// Parameters before any knob moves
    pub params: EnvelopeParameters,
    pub targets: Vec<TargetStaticInfo>,
}

/// Static information about a target
#[derive(Clone)]
pub struct TargetStaticInfo {
    pub name: String,
    pub is_array: bool,
}

/// Engine state captured on the engine thread (Copy, no allocations)
#[derive(Clone, Copy, Debug)]
pub struct SceneSnapshot {
    /// Engine time in seconds
    pub time: f64,
    /// Steps run since start
    pub steps: u64,
    pub targets: [TargetView; MAX_TARGETS],
    pub num_targets: u8,
}

/// One target as the UI sees it
#[derive(Clone, Copy, Debug)]
pub struct TargetView {
    pub phase: TargetPhase,
    /// An OFF is parked behind the attack
    pub pending_release: bool,
    pub iteration: u32,
    pub colors: [Rgba; MAX_CHILDREN],
    pub num_children: u8,
}

impl Default for TargetView {
    fn default() -> Self {
        Self {
            phase: TargetPhase::Idle,
            pending_release: false,
            iteration: 0,
            colors: [Rgba::TRANSPARENT; MAX_CHILDREN],
            num_children: 0,
        }
    }
}

impl SceneSnapshot {
    pub fn new() -> Self {
        Self {
            time: 0.0,
            steps: 0,
            targets: [TargetView::default(); MAX_TARGETS],
            num_targets: 0,
        }
    }

    pub fn targets(&self) -> &[TargetView] {
        &self.targets[..self.num_targets as usize]
    }
}
