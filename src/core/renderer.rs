use log::{debug, warn};
use crate::core::graph::{AudioError, AudioGraph, VoiceSpec};
use crate::core::oscillator::Waveform;
use crate::core::registry::NoteRegistry;
use crate::core::visual::VisualSurface;

/// Equal division of the output between the active notes
pub fn shared_gain(active_count: usize) -> Option<f32> {
    if active_count == 0 {
        None
    } else {
        Some(1.0 / active_count as f32)
    }
}

/// What happened during one rebuild cycle
#[derive(Debug, Default, Clone, PartialEq)]
pub struct RenderReport {
    pub stopped: usize,
    pub started: Vec<String>,
    pub gain: Option<f32>,
    pub missing_elements: Vec<String>,
    pub failed: Vec<(String, AudioError)>,
}

impl RenderReport {
    pub fn is_silent(&self) -> bool {
        self.started.is_empty()
    }
}

/// Rebuilds the sounding graph from the registry's activation state
pub struct AudioRenderer<G: AudioGraph> {
    graph: G,
    waveform: Waveform,
}

impl<G: AudioGraph> AudioRenderer<G> {
    pub fn new(graph: G) -> Self {
        Self {
            graph,
            waveform: Waveform::Sine,
        }
    }

    pub fn with_waveform(mut self, waveform: Waveform) -> Self {
        self.waveform = waveform;
        self
    }

    pub fn waveform(&self) -> Waveform {
        self.waveform
    }

    /// Takes effect on the next rebuild
    pub fn set_waveform(&mut self, waveform: Waveform) {
        self.waveform = waveform;
    }

    pub fn graph(&self) -> &G {
        &self.graph
    }

    pub fn graph_mut(&mut self) -> &mut G {
        &mut self.graph
    }

    /// Stop and disconnect every voice owned by the registry. Returns how many were torn down.
    pub fn teardown(&mut self, registry: &mut NoteRegistry<G::Voice>) -> usize {
        let stopped = self.release_voices(registry);
        self.graph.commit();
        stopped
    }

    fn release_voices(&mut self, registry: &mut NoteRegistry<G::Voice>) -> usize {
        let mut stopped = 0;
        for entry in registry.entries_mut() {
            if let Some(mut voice) = entry.voice.take() {
                self.graph.stop(&mut voice);
                self.graph.disconnect(voice);
                stopped += 1;
            }
        }
        stopped
    }

    /// Run a full rebuild cycle: teardown, visual sync, gain, voice start.
    /// The graph sees a single commit at the end.
    pub fn rebuild<S: VisualSurface>(
        &mut self,
        registry: &mut NoteRegistry<G::Voice>,
        surface: &mut S,
    ) -> RenderReport {
        let report = self.rebuild_voices(registry, surface);
        self.graph.commit();
        report
    }

    fn rebuild_voices<S: VisualSurface>(
        &mut self,
        registry: &mut NoteRegistry<G::Voice>,
        surface: &mut S,
    ) -> RenderReport {
        let mut report = RenderReport {
            stopped: self.release_voices(registry),
            ..Default::default()
        };

        for entry in registry.entries() {
            match surface.resolve_visual_element(&entry.note_name) {
                Some(element) => surface.set_highlighted(&element, entry.active),
                None => {
                    debug!("No visual element for note {}, skipping highlight", entry.note_name);
                    report.missing_elements.push(entry.note_name.clone());
                }
            }
        }

        report.gain = shared_gain(registry.active_count());
        let Some(gain) = report.gain else {
            debug!("Rebuild: {} voices stopped, nothing active", report.stopped);
            return report;
        };

        for entry in registry.entries_mut().iter_mut().filter(|e| e.active) {
            let spec = VoiceSpec {
                frequency: entry.frequency,
                gain,
                waveform: self.waveform,
            };

            match self.graph.create_voice(spec) {
                Ok(mut voice) => {
                    self.graph.start(&mut voice);
                    entry.voice = Some(voice);
                    report.started.push(entry.note_name.clone());
                },
                Err(err) => {
                    warn!("Could not start note {}: {}", entry.note_name, err);
                    report.failed.push((entry.note_name.clone(), err));
                }
            }
        }

        debug!(
            "Rebuild: {} stopped, {:?} started at gain {:.3}",
            report.stopped, report.started, gain
        );
        report
    }
}
