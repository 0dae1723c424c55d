// Purpose - external collaborators: MIDI events in, colour properties out

pub mod authority;
pub mod midi;
pub mod observer;
pub mod sink;
