pub mod oscillator;
pub mod graph;
pub mod visual;
pub mod registry;
pub mod renderer;
pub mod dispatcher;
pub mod mixer;

#[cfg(test)]
pub(crate) mod testing;

pub use dispatcher::{Dispatch, InputDispatcher, KeySignal};
pub use graph::{AudioError, AudioGraph, VoiceSpec};
pub use mixer::{Mixer, MixerGraph};
pub use registry::{NoteDetail, NoteEntry, NoteRegistry, RegistryError};
pub use renderer::{AudioRenderer, RenderReport};
pub use visual::VisualSurface;
