use log::warn;
use egui::{Align2, Color32, FontId, Pos2, Rect, Response, Sense, Stroke, StrokeKind, Ui, Vec2};
use crate::core::registry::NoteRegistry;
use crate::core::visual::VisualSurface;

const WHITE_NOTES: [&str; 7] = ["C", "D", "E", "F", "G", "A", "B"];
// (note, index of the white key it sits after)
const BLACK_NOTES: [(&str, usize); 5] = [("Db", 0), ("Eb", 1), ("Gb", 3), ("Ab", 4), ("Bb", 5)];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyColor {
    White,
    Black,
}

#[derive(Debug, Clone)]
pub struct PianoKey {
    pub note: String,
    pub label: String,
    pub color: KeyColor,
    /// White keys: index in the row. Black keys: index of the white key to their left.
    pub slot: usize,
    pub highlighted: bool,
}

const KEYBOARD_HEIGHT: f32 = 220.0;

/// On-screen one-octave keyboard
pub struct KeyboardView {
    keys: Vec<PianoKey>,
}

impl KeyboardView {
    pub fn one_octave() -> Self {
        let whites = WHITE_NOTES.iter().enumerate().map(|(slot, note)| PianoKey {
            note: note.to_string(),
            label: String::new(),
            color: KeyColor::White,
            slot,
            highlighted: false,
        });
        let blacks = BLACK_NOTES.iter().map(|(note, slot)| PianoKey {
            note: note.to_string(),
            label: String::new(),
            color: KeyColor::Black,
            slot: *slot,
            highlighted: false,
        });

        Self {
            keys: whites.chain(blacks).collect(),
        }
    }

    /// Print the triggering computer key on each piano key.
    /// Returns the registry notes that have no key on screen.
    pub fn label_from_registry<V>(&mut self, registry: &NoteRegistry<V>) -> Vec<String> {
        for key in &mut self.keys {
            key.label = registry
                .find_by_note(&key.note)
                .map(|e| key_label(&e.key_identifier))
                .unwrap_or_default();
        }

        let offscreen: Vec<String> = registry
            .entries()
            .iter()
            .filter(|e| !self.keys.iter().any(|k| k.note == e.note_name))
            .map(|e| e.note_name.clone())
            .collect();
        if !offscreen.is_empty() {
            warn!("Notes without an on-screen key will play unhighlighted: {}", offscreen.join(", "));
        }
        offscreen
    }

    pub fn keys(&self) -> &[PianoKey] {
        &self.keys
    }

    pub fn highlighted_notes(&self) -> Vec<&str> {
        self.keys
            .iter()
            .filter(|k| k.highlighted)
            .map(|k| k.note.as_str())
            .collect()
    }

    pub fn show(&self, ui: &mut Ui) -> Response {
        let width = ui.available_width().min(700.0);
        let (rect, response) = ui.allocate_exact_size(Vec2::new(width, KEYBOARD_HEIGHT), Sense::hover());

        if !ui.is_rect_visible(rect) {
            return response;
        }

        let painter = ui.painter();
        let white_width = rect.width() / WHITE_NOTES.len() as f32;
        let black_width = white_width * 0.6;
        let black_height = rect.height() * 0.62;

        // White keys first so black keys paint over them
        for key in self.keys.iter().filter(|k| k.color == KeyColor::White) {
            let min = Pos2::new(rect.left() + key.slot as f32 * white_width, rect.top());
            let key_rect = Rect::from_min_size(min, Vec2::new(white_width, rect.height()));
            let fill = if key.highlighted { Color32::from_gray(204) } else { Color32::WHITE };

            painter.rect_filled(key_rect, 3.0, fill);
            painter.rect_stroke(key_rect, 3.0, Stroke::new(1.0, Color32::from_gray(40)), StrokeKind::Inside);
            painter.text(
                key_rect.center_bottom() - Vec2::new(0.0, 10.0),
                Align2::CENTER_BOTTOM,
                &key.label,
                FontId::proportional(16.0),
                Color32::from_gray(60),
            );
        }

        for key in self.keys.iter().filter(|k| k.color == KeyColor::Black) {
            let x = rect.left() + (key.slot + 1) as f32 * white_width - black_width / 2.0;
            let key_rect = Rect::from_min_size(Pos2::new(x, rect.top()), Vec2::new(black_width, black_height));
            let fill = if key.highlighted { Color32::from_gray(51) } else { Color32::BLACK };

            painter.rect_filled(key_rect, 3.0, fill);
            painter.text(
                key_rect.center_bottom() - Vec2::new(0.0, 8.0),
                Align2::CENTER_BOTTOM,
                &key.label,
                FontId::proportional(13.0),
                Color32::from_gray(200),
            );
        }

        response
    }
}

impl Default for KeyboardView {
    fn default() -> Self {
        Self::one_octave()
    }
}

impl VisualSurface for KeyboardView {
    type Element = usize;

    fn resolve_visual_element(&mut self, note_name: &str) -> Option<usize> {
        self.keys.iter().position(|k| k.note == note_name)
    }

    fn set_highlighted(&mut self, element: &usize, highlighted: bool) {
        if let Some(key) = self.keys.get_mut(*element) {
            key.highlighted = highlighted;
        }
    }
}

/// "KeyZ" -> "Z", "Digit1" -> "1"
fn key_label(key_identifier: &str) -> String {
    key_identifier
        .strip_prefix("Key")
        .or_else(|| key_identifier.strip_prefix("Digit"))
        .unwrap_or(key_identifier)
        .to_string()
}
