#[cfg(feature = "rtrb")]
use rtrb::Producer;

use crate::envelope::EnvelopeParameters;

/// Messages for a debug visualizer. Purely observational.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum VisualizerMessage {
    Parameters(EnvelopeParameters),
    PadToggled(usize),
}

/// Receives a copy of every parameter change and pad press.
pub trait ParameterObserver {
    fn parameters_changed(&mut self, params: &EnvelopeParameters);
    fn pad_toggled(&mut self, pad: usize);
}

#[cfg(feature = "rtrb")]
impl ParameterObserver for Producer<VisualizerMessage> {
    fn parameters_changed(&mut self, params: &EnvelopeParameters) {
        // a full queue drops the update; the next change supersedes it
        let _ = self.push(VisualizerMessage::Parameters(*params));
    }

    fn pad_toggled(&mut self, pad: usize) {
        let _ = self.push(VisualizerMessage::PadToggled(pad));
    }
}
