//! Audio output boundary used by the renderer

use std::fmt;
use crate::core::oscillator::Waveform;

/// Parameters for one gain stage + tone source pair
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VoiceSpec {
    pub frequency: f32,
    pub gain: f32,
    pub waveform: Waveform,
}

#[derive(Debug, Clone, PartialEq)]
pub enum AudioError {
    /// The backend refused to build a voice
    VoiceCreation(String),
    /// No output device or stream could be opened
    StreamUnavailable(String),
}

impl fmt::Display for AudioError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AudioError::VoiceCreation(reason) => write!(f, "failed to create voice: {}", reason),
            AudioError::StreamUnavailable(reason) => write!(f, "audio stream unavailable: {}", reason),
        }
    }
}

impl std::error::Error for AudioError {}

/// Minimal audio-graph capability the renderer needs.
///
/// A voice is created disconnected and silent. `start` routes its gain stage to
/// the shared output destination and begins producing sound. `stop` silences it
/// and `disconnect` consumes the handle and frees the backend resources.
///
/// Backends may defer `start`, `stop` and `disconnect` until `commit`, which the
/// renderer calls once at the end of every cycle so listeners only ever hear the
/// state before or after a whole rebuild.
pub trait AudioGraph {
    type Voice;

    fn create_voice(&mut self, spec: VoiceSpec) -> Result<Self::Voice, AudioError>;
    fn start(&mut self, voice: &mut Self::Voice);
    fn stop(&mut self, voice: &mut Self::Voice);
    fn disconnect(&mut self, voice: Self::Voice);

    /// Apply everything queued since the last commit
    fn commit(&mut self) {}
}
