//! Recording fakes for the audio and visual boundaries

use std::collections::HashMap;
use crate::core::graph::{AudioError, AudioGraph, VoiceSpec};
use crate::core::registry::NoteRegistry;
use crate::core::visual::VisualSurface;

#[derive(Debug, Clone, PartialEq)]
pub enum GraphEvent {
    Created(u64, VoiceSpec),
    Started(u64),
    Stopped(u64),
    Disconnected(u64),
    Committed,
}

#[derive(Debug)]
pub struct FakeVoice {
    pub id: u64,
    pub spec: VoiceSpec,
}

#[derive(Debug, Default)]
pub struct RecordingGraph {
    pub events: Vec<GraphEvent>,
    pub fail_frequency: Option<f32>,
    next_id: u64,
    live: HashMap<u64, VoiceSpec>,
}

impl RecordingGraph {
    /// Specs of voices that were started and not yet disconnected, oldest first
    pub fn live_specs(&self) -> Vec<VoiceSpec> {
        let mut ids: Vec<_> = self.live.keys().copied().collect();
        ids.sort();
        ids.iter().map(|id| self.live[id]).collect()
    }
}

impl AudioGraph for RecordingGraph {
    type Voice = FakeVoice;

    fn create_voice(&mut self, spec: VoiceSpec) -> Result<FakeVoice, AudioError> {
        if self.fail_frequency == Some(spec.frequency) {
            return Err(AudioError::VoiceCreation("rejected by test".to_string()));
        }
        self.next_id += 1;
        self.events.push(GraphEvent::Created(self.next_id, spec));
        Ok(FakeVoice { id: self.next_id, spec })
    }

    fn start(&mut self, voice: &mut FakeVoice) {
        self.events.push(GraphEvent::Started(voice.id));
        self.live.insert(voice.id, voice.spec);
    }

    fn stop(&mut self, voice: &mut FakeVoice) {
        self.events.push(GraphEvent::Stopped(voice.id));
    }

    fn disconnect(&mut self, voice: FakeVoice) {
        self.events.push(GraphEvent::Disconnected(voice.id));
        self.live.remove(&voice.id);
    }

    fn commit(&mut self) {
        self.events.push(GraphEvent::Committed);
    }
}

/// Keeps a highlighted flag per note it knows about
#[derive(Debug, Default)]
pub struct RecordingSurface {
    keys: Vec<(String, bool)>,
}

impl RecordingSurface {
    pub fn with_notes(notes: &[&str]) -> Self {
        Self {
            keys: notes.iter().map(|n| (n.to_string(), false)).collect(),
        }
    }

    pub fn for_registry<V>(registry: &NoteRegistry<V>) -> Self {
        Self {
            keys: registry
                .entries()
                .iter()
                .map(|e| (e.note_name.clone(), false))
                .collect(),
        }
    }

    pub fn highlighted(&self) -> Vec<String> {
        self.keys
            .iter()
            .filter(|(_, lit)| *lit)
            .map(|(note, _)| note.clone())
            .collect()
    }
}

impl VisualSurface for RecordingSurface {
    type Element = usize;

    fn resolve_visual_element(&mut self, note_name: &str) -> Option<usize> {
        self.keys.iter().position(|(note, _)| note == note_name)
    }

    fn set_highlighted(&mut self, element: &usize, highlighted: bool) {
        self.keys[*element].1 = highlighted;
    }
}
