use log::debug;
use crate::core::graph::AudioGraph;
use crate::core::registry::NoteRegistry;
use crate::core::renderer::{AudioRenderer, RenderReport};
use crate::core::visual::VisualSurface;

/// Raw key signal from whatever transport delivers keyboard input
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeySignal {
    Pressed { key: String, repeat: bool },
    Released { key: String },
    /// Every held key is considered released (e.g. the window lost focus)
    ReleaseAll,
}

impl KeySignal {
    pub fn pressed(key: impl Into<String>) -> Self {
        KeySignal::Pressed { key: key.into(), repeat: false }
    }

    pub fn repeated(key: impl Into<String>) -> Self {
        KeySignal::Pressed { key: key.into(), repeat: true }
    }

    pub fn released(key: impl Into<String>) -> Self {
        KeySignal::Released { key: key.into() }
    }
}

/// Outcome of handling one signal
#[derive(Debug, Clone, PartialEq)]
pub enum Dispatch {
    /// Auto-repeat, dropped before lookup
    Repeat,
    /// Key isn't part of the instrument
    Unmapped,
    /// Nothing was held, so there was nothing to release
    Unchanged,
    Rebuilt(RenderReport),
}

impl Dispatch {
    pub fn rebuilt(&self) -> bool {
        matches!(self, Dispatch::Rebuilt(_))
    }
}

/// Turns key signals into registry changes and triggers a rebuild after each one
pub struct InputDispatcher<G: AudioGraph> {
    registry: NoteRegistry<G::Voice>,
    renderer: AudioRenderer<G>,
}

impl<G: AudioGraph> InputDispatcher<G> {
    pub fn new(registry: NoteRegistry<G::Voice>, renderer: AudioRenderer<G>) -> Self {
        Self { registry, renderer }
    }

    pub fn registry(&self) -> &NoteRegistry<G::Voice> {
        &self.registry
    }

    pub fn renderer(&self) -> &AudioRenderer<G> {
        &self.renderer
    }

    pub fn renderer_mut(&mut self) -> &mut AudioRenderer<G> {
        &mut self.renderer
    }

    pub fn handle<S: VisualSurface>(&mut self, signal: &KeySignal, surface: &mut S) -> Dispatch {
        match signal {
            KeySignal::Pressed { key, repeat } => self.key_down(key, *repeat, surface),
            KeySignal::Released { key } => self.key_up(key, surface),
            KeySignal::ReleaseAll => self.release_all(surface),
        }
    }

    pub fn key_down<S: VisualSurface>(&mut self, key: &str, repeat: bool, surface: &mut S) -> Dispatch {
        if repeat {
            return Dispatch::Repeat;
        }

        let Some(entry) = self.registry.lookup_mut(key) else {
            return Dispatch::Unmapped;
        };
        debug!("Key down {} -> {}", key, entry.note_name);
        NoteRegistry::set_active(entry, true);

        Dispatch::Rebuilt(self.renderer.rebuild(&mut self.registry, surface))
    }

    pub fn key_up<S: VisualSurface>(&mut self, key: &str, surface: &mut S) -> Dispatch {
        let Some(entry) = self.registry.lookup_mut(key) else {
            return Dispatch::Unmapped;
        };
        debug!("Key up {} -> {}", key, entry.note_name);
        NoteRegistry::set_active(entry, false);

        Dispatch::Rebuilt(self.renderer.rebuild(&mut self.registry, surface))
    }

    /// Release every held note with a single rebuild
    pub fn release_all<S: VisualSurface>(&mut self, surface: &mut S) -> Dispatch {
        if self.registry.active_count() == 0 {
            return Dispatch::Unchanged;
        }

        for entry in self.registry.entries_mut() {
            NoteRegistry::set_active(entry, false);
        }
        debug!("Released all held keys");

        Dispatch::Rebuilt(self.renderer.rebuild(&mut self.registry, surface))
    }

    /// Swap in a new note table. Held notes of the old table are released first
    /// so no highlight or voice outlives it.
    pub fn replace_registry<S: VisualSurface>(
        &mut self,
        registry: NoteRegistry<G::Voice>,
        surface: &mut S,
    ) -> NoteRegistry<G::Voice> {
        self.release_all(surface);
        self.renderer.teardown(&mut self.registry);
        std::mem::replace(&mut self.registry, registry)
    }

    /// Stop all sound without touching activation state
    pub fn silence(&mut self) -> usize {
        self.renderer.teardown(&mut self.registry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::registry::NoteDetail;
    use crate::core::testing::{RecordingGraph, RecordingSurface};

    fn dispatcher() -> (InputDispatcher<RecordingGraph>, RecordingSurface) {
        let registry = NoteRegistry::default();
        let surface = RecordingSurface::for_registry(&registry);
        let renderer = AudioRenderer::new(RecordingGraph::default());
        (InputDispatcher::new(registry, renderer), surface)
    }

    fn active_notes(dispatcher: &InputDispatcher<RecordingGraph>) -> Vec<String> {
        dispatcher
            .registry()
            .active_entries()
            .map(|e| e.note_name.clone())
            .collect()
    }

    #[test]
    fn press_and_release_toggle_activation() {
        let (mut d, mut surface) = dispatcher();

        assert!(d.key_down("KeyZ", false, &mut surface).rebuilt());
        assert_eq!(active_notes(&d), vec!["C"]);

        assert!(d.key_up("KeyZ", &mut surface).rebuilt());
        assert!(active_notes(&d).is_empty());
        assert!(d.renderer().graph().live_specs().is_empty());
    }

    #[test]
    fn repeat_is_dropped_without_rebuild() {
        let (mut d, mut surface) = dispatcher();
        d.key_down("KeyZ", false, &mut surface);
        let events_before = d.renderer().graph().events.len();

        assert_eq!(d.key_down("KeyZ", true, &mut surface), Dispatch::Repeat);
        assert_eq!(d.renderer().graph().events.len(), events_before);
        assert_eq!(active_notes(&d), vec!["C"]);
    }

    #[test]
    fn repeat_for_unheld_key_is_still_dropped() {
        let (mut d, mut surface) = dispatcher();
        assert_eq!(d.key_down("KeyX", true, &mut surface), Dispatch::Repeat);
        assert!(active_notes(&d).is_empty());
    }

    #[test]
    fn unmapped_keys_do_nothing() {
        let (mut d, mut surface) = dispatcher();
        assert_eq!(d.key_down("ShiftLeft", false, &mut surface), Dispatch::Unmapped);
        assert_eq!(d.key_up("KeyQ", &mut surface), Dispatch::Unmapped);
        assert!(d.renderer().graph().events.is_empty());
        assert!(surface.highlighted().is_empty());
    }

    #[test]
    fn release_all_clears_everything_once() {
        let (mut d, mut surface) = dispatcher();
        assert_eq!(d.release_all(&mut surface), Dispatch::Unchanged);

        d.handle(&KeySignal::pressed("KeyZ"), &mut surface);
        d.handle(&KeySignal::pressed("KeyM"), &mut surface);
        let Dispatch::Rebuilt(report) = d.handle(&KeySignal::ReleaseAll, &mut surface) else {
            panic!("expected a rebuild");
        };

        assert_eq!(report.stopped, 2);
        assert!(report.is_silent());
        assert!(active_notes(&d).is_empty());
        assert!(surface.highlighted().is_empty());
    }

    #[test]
    fn replacing_the_table_releases_old_notes() {
        let (mut d, mut surface) = dispatcher();
        d.key_down("KeyZ", false, &mut surface);

        let details = vec![NoteDetail::new("A", "A", 440.0)];
        let old = d.replace_registry(NoteRegistry::from_details(&details).unwrap(), &mut surface);

        assert!(old.entries().iter().all(|e| !e.active && e.voice.is_none()));
        assert!(surface.highlighted().is_empty());
        assert!(d.renderer().graph().live_specs().is_empty());
        assert_eq!(d.key_down("KeyZ", false, &mut surface), Dispatch::Unmapped);
        assert!(d.key_down("KeyA", false, &mut surface).rebuilt());
        assert_eq!(active_notes(&d), vec!["A"]);
    }

    #[test]
    fn silence_keeps_activation() {
        let (mut d, mut surface) = dispatcher();
        d.key_down("KeyN", false, &mut surface);
        assert_eq!(d.silence(), 1);
        assert_eq!(active_notes(&d), vec!["A"]);
        assert!(d.renderer().graph().live_specs().is_empty());
    }
}
