use crate::core::KeySignal;

/// Message types for communication between input sources and the piano
#[derive(Debug, Clone, PartialEq)]
pub enum PianoMessage {
    Key(KeySignal),
    SetVolume(f32),
}

impl From<KeySignal> for PianoMessage {
    fn from(signal: KeySignal) -> Self {
        PianoMessage::Key(signal)
    }
}
