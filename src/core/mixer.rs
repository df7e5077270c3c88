use std::collections::VecDeque;
use std::sync::{Arc, RwLock};
use log::warn;
use slotmap::{new_key_type, SlotMap};
use crate::core::graph::{AudioError, AudioGraph, VoiceSpec};
use crate::core::oscillator::Oscillator;

pub const SAMPLE_BUFFER_SIZE: usize = 1024;
pub const WAVEFORM_DISPLAY_POINTS: usize = 200;

new_key_type! {
    pub struct SourceKey;
}

/// Gain stage + oscillator living inside the mixer
#[derive(Debug, Clone)]
pub struct ToneSource {
    pub oscillator: Oscillator,
    pub gain: f32,
    pub running: bool,
    pub connected: bool,
}

impl ToneSource {
    pub fn is_audible(&self) -> bool {
        self.running && self.connected
    }
}

/// Shared output destination, pulled from by the audio callback
pub struct Mixer {
    pub sample_rate: f32,
    master_volume: f32,
    sources: SlotMap<SourceKey, ToneSource>,
    recent_samples: VecDeque<f32>,
}

impl Mixer {
    pub fn new(sample_rate: f32) -> Self {
        Self {
            sample_rate,
            master_volume: 0.5,
            sources: SlotMap::with_key(),
            recent_samples: VecDeque::with_capacity(SAMPLE_BUFFER_SIZE),
        }
    }

    pub fn master_volume(&self) -> f32 {
        self.master_volume
    }

    pub fn set_master_volume(&mut self, volume: f32) {
        self.master_volume = volume.clamp(0.0, 1.0);
    }

    /// Add a silent, disconnected source
    pub fn add_source(&mut self, spec: VoiceSpec) -> SourceKey {
        let oscillator = Oscillator::new(spec.waveform, spec.frequency, self.sample_rate);
        self.sources.insert(ToneSource {
            oscillator,
            gain: spec.gain,
            running: false,
            connected: false,
        })
    }

    pub fn connect(&mut self, key: SourceKey) {
        if let Some(source) = self.sources.get_mut(key) {
            source.connected = true;
        }
    }

    pub fn start(&mut self, key: SourceKey) {
        if let Some(source) = self.sources.get_mut(key) {
            source.running = true;
        }
    }

    pub fn stop(&mut self, key: SourceKey) {
        if let Some(source) = self.sources.get_mut(key) {
            source.running = false;
        }
    }

    /// Disconnect and drop the source
    pub fn remove(&mut self, key: SourceKey) -> Option<ToneSource> {
        self.sources.remove(key)
    }

    pub fn source(&self, key: SourceKey) -> Option<&ToneSource> {
        self.sources.get(key)
    }

    pub fn source_count(&self) -> usize {
        self.sources.len()
    }

    pub fn audible_count(&self) -> usize {
        self.sources.values().filter(|s| s.is_audible()).count()
    }

    /// Mix one sample from every audible source
    pub fn next_sample(&mut self) -> f32 {
        let mut sample = 0.0;
        for source in self.sources.values_mut() {
            if source.is_audible() {
                sample += source.oscillator.next_sample() * source.gain;
            }
        }

        let output = sample * self.master_volume;

        if self.recent_samples.len() >= SAMPLE_BUFFER_SIZE {
            self.recent_samples.pop_front();
        }
        self.recent_samples.push_back(output);

        output
    }

    /// Points for the output scope, x in [0, 1)
    pub fn generate_waveform_display(&self) -> Vec<[f32; 2]> {
        let samples = &self.recent_samples;

        if samples.is_empty() {
            return (0..WAVEFORM_DISPLAY_POINTS)
                .map(|i| [i as f32 / WAVEFORM_DISPLAY_POINTS as f32, 0.0])
                .collect();
        }

        let step = samples.len() as f32 / WAVEFORM_DISPLAY_POINTS as f32;
        (0..WAVEFORM_DISPLAY_POINTS)
            .filter_map(|i| {
                let pos = (i as f32 * step) as usize;
                samples
                    .get(pos)
                    .map(|s| [i as f32 / WAVEFORM_DISPLAY_POINTS as f32, *s])
            })
            .collect()
    }
}

/// Handle to a source inside the shared mixer
#[derive(Debug)]
pub struct MixerVoice {
    key: SourceKey,
}

impl MixerVoice {
    pub fn key(&self) -> SourceKey {
        self.key
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PendingOp {
    Start(SourceKey),
    Stop(SourceKey),
    Remove(SourceKey),
}

/// `AudioGraph` over a mixer shared with the audio thread.
///
/// New sources are inserted silent straight away. Starts, stops and removals are
/// queued and applied under one write lock in `commit`, so the audio callback never
/// renders a buffer from a half-rebuilt set of sources.
pub struct MixerGraph {
    mixer: Arc<RwLock<Mixer>>,
    pending: Vec<PendingOp>,
}

impl MixerGraph {
    pub fn new(mixer: Arc<RwLock<Mixer>>) -> Self {
        Self {
            mixer,
            pending: Vec::new(),
        }
    }

    pub fn mixer(&self) -> &Arc<RwLock<Mixer>> {
        &self.mixer
    }

    /// Queued changes not yet visible to the audio thread
    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }
}

impl AudioGraph for MixerGraph {
    type Voice = MixerVoice;

    fn create_voice(&mut self, spec: VoiceSpec) -> Result<MixerVoice, AudioError> {
        let mut mixer = self.mixer
            .write()
            .map_err(|_| AudioError::VoiceCreation("mixer lock poisoned".to_string()))?;
        Ok(MixerVoice { key: mixer.add_source(spec) })
    }

    fn start(&mut self, voice: &mut MixerVoice) {
        self.pending.push(PendingOp::Start(voice.key));
    }

    fn stop(&mut self, voice: &mut MixerVoice) {
        self.pending.push(PendingOp::Stop(voice.key));
    }

    fn disconnect(&mut self, voice: MixerVoice) {
        self.pending.push(PendingOp::Remove(voice.key));
    }

    fn commit(&mut self) {
        if self.pending.is_empty() {
            return;
        }

        // A panicked audio callback must not leave stale sources behind
        let mut mixer = self.mixer.write().unwrap_or_else(|poisoned| {
            warn!("Mixer lock poisoned, applying {} queued changes anyway", self.pending.len());
            poisoned.into_inner()
        });

        for op in self.pending.drain(..) {
            match op {
                PendingOp::Start(key) => {
                    mixer.connect(key);
                    mixer.start(key);
                },
                PendingOp::Stop(key) => mixer.stop(key),
                PendingOp::Remove(key) => {
                    mixer.remove(key);
                }
            }
        }
    }
}
