//! Network authority over the shared parameters.
//!
//! The controller never mutates shared parameters or routes notes without
//! holding authority. Transport and serialisation live behind this trait.

use crate::envelope::EnvelopeParameters;

pub trait Authority {
    fn is_owner(&self) -> bool;

    /// Ask to become the owner. Returns whether authority is now held.
    fn request_ownership(&mut self) -> bool;

    /// Called after every local parameter change, once every target already
    /// holds `params`.
    fn request_serialization(&mut self, _params: &EnvelopeParameters) {}
}

/// Single-instance authority: always the owner, nothing to transmit.
#[derive(Debug, Default, Clone, Copy)]
pub struct LocalAuthority;

impl Authority for LocalAuthority {
    fn is_owner(&self) -> bool {
        true
    }

    fn request_ownership(&mut self) -> bool {
        true
    }
}
