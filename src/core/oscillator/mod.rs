mod waveform;

pub use self::waveform::Waveform;

/// Phase-accumulating tone generator for a single voice
#[derive(Debug, Clone)]
pub struct Oscillator {
    pub waveform: Waveform,
    pub frequency: f32,
    pub phase: f32,
    pub phase_increment: f32,
}

impl Oscillator {
    pub fn new(waveform: Waveform, frequency: f32, sample_rate: f32) -> Self {
        Self {
            waveform,
            frequency,
            phase: 0.0,
            phase_increment: frequency / sample_rate,
        }
    }
    
    /// Produce the next sample and advance the phase
    pub fn next_sample(&mut self) -> f32 {
        let value = self.waveform.sample(self.phase);
        self.phase = (self.phase + self.phase_increment) % 1.0;
        value
    }
}
