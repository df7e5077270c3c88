use serde::{Serialize, Deserialize};
use std::f32::consts::PI;

/// Shape of the tone source attached to each voice
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Waveform {
    #[default]
    Sine,
    Square,
    Saw,
    Triangle,
}

impl Waveform {
    /// Sample the waveform at `phase` in [0, 1)
    pub fn sample(&self, phase: f32) -> f32 {
        match self {
            Waveform::Sine => (2.0 * PI * phase).sin(),
            Waveform::Square => if phase < 0.5 { 1.0 } else { -1.0 },
            Waveform::Saw => 2.0 * phase - 1.0,
            Waveform::Triangle => {
                if phase < 0.25 {
                    4.0 * phase
                } else if phase < 0.75 {
                    2.0 - 4.0 * phase
                } else {
                    -4.0 + 4.0 * phase
                }
            },
        }
    }
    
    pub fn all() -> [Waveform; 4] {
        [Waveform::Sine, Waveform::Square, Waveform::Saw, Waveform::Triangle]
    }
}
