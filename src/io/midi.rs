#[cfg(feature = "rtrb")]
use rtrb::Consumer;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Largest value a 7-bit MIDI data byte can carry.
pub const CC_MAX: f32 = 127.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum MidiEvent {
    NoteOn { channel: u8, key: u8, velocity: u8 },
    NoteOff { channel: u8, key: u8, velocity: u8 },
    ControlChange { channel: u8, controller: u8, value: u8 },
    PitchBend { channel: u8, value: i16 },
    ProgramChange { channel: u8, program: u8 },
}

impl MidiEvent {
    /// Decode a raw channel message. Note-on with velocity 0 is a note-off.
    /// Anything else (system messages, sysex, short buffers) yields `None`.
    pub fn from_bytes(message: &[u8]) -> Option<Self> {
        let status = *message.first()?;
        let channel = status & 0x0F;
        let data = |i: usize| message.get(i).map(|b| b & 0x7F);

        match status & 0xF0 {
            0x80 => Some(MidiEvent::NoteOff {
                channel,
                key: data(1)?,
                velocity: data(2)?,
            }),
            0x90 => {
                let key = data(1)?;
                let velocity = data(2)?;
                if velocity == 0 {
                    Some(MidiEvent::NoteOff {
                        channel,
                        key,
                        velocity,
                    })
                } else {
                    Some(MidiEvent::NoteOn {
                        channel,
                        key,
                        velocity,
                    })
                }
            }
            0xB0 => Some(MidiEvent::ControlChange {
                channel,
                controller: data(1)?,
                value: data(2)?,
            }),
            0xC0 => Some(MidiEvent::ProgramChange {
                channel,
                program: data(1)?,
            }),
            0xE0 => {
                let lsb = data(1)? as i16;
                let msb = data(2)? as i16;
                Some(MidiEvent::PitchBend {
                    channel,
                    value: ((msb << 7) | lsb) - 8192,
                })
            }
            _ => None,
        }
    }

    pub fn channel(&self) -> u8 {
        match *self {
            MidiEvent::NoteOn { channel, .. }
            | MidiEvent::NoteOff { channel, .. }
            | MidiEvent::ControlChange { channel, .. }
            | MidiEvent::PitchBend { channel, .. }
            | MidiEvent::ProgramChange { channel, .. } => channel,
        }
    }
}

/// Map a 0-127 data byte onto [0, 1].
pub fn normalize(value: u8) -> f32 {
    value.min(127) as f32 / CC_MAX
}

/// Source of events for the engine thread.
pub trait EventReceiver {
    fn pop(&mut self) -> Option<MidiEvent>;
}

#[cfg(feature = "rtrb")]
impl EventReceiver for Consumer<MidiEvent> {
    fn pop(&mut self) -> Option<MidiEvent> {
        Consumer::pop(self).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_endpoints() {
        assert!((normalize(127) - 1.0).abs() < 1e-6);
        assert_eq!(normalize(0), 0.0);
    }

    #[test]
    fn decodes_channel_messages() {
        assert_eq!(
            MidiEvent::from_bytes(&[0x93, 36, 100]),
            Some(MidiEvent::NoteOn {
                channel: 3,
                key: 36,
                velocity: 100
            })
        );
        assert_eq!(
            MidiEvent::from_bytes(&[0x90, 36, 0]),
            Some(MidiEvent::NoteOff {
                channel: 0,
                key: 36,
                velocity: 0
            })
        );
        assert_eq!(
            MidiEvent::from_bytes(&[0xB1, 74, 64]),
            Some(MidiEvent::ControlChange {
                channel: 1,
                controller: 74,
                value: 64
            })
        );
        assert_eq!(
            MidiEvent::from_bytes(&[0xE0, 0, 64]),
            Some(MidiEvent::PitchBend {
                channel: 0,
                value: 0
            })
        );
    }

    #[test]
    fn rejects_short_and_system_messages() {
        assert_eq!(MidiEvent::from_bytes(&[]), None);
        assert_eq!(MidiEvent::from_bytes(&[0x90, 36]), None);
        assert_eq!(MidiEvent::from_bytes(&[0xF8]), None);
    }
}
