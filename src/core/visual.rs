/// Visual boundary: something that can light up the key for a note.
///
/// The core never draws; it only resolves an element by note name and flips
/// its highlighted state.
pub trait VisualSurface {
    type Element;

    fn resolve_visual_element(&mut self, note_name: &str) -> Option<Self::Element>;
    fn set_highlighted(&mut self, element: &Self::Element, highlighted: bool);
}
