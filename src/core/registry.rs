use serde::{Serialize, Deserialize};
use std::collections::HashMap;
use std::fmt;

/// One row of the static key-to-note table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NoteDetail {
    pub note: String,
    pub key: String,
    pub frequency: f32,
}

impl NoteDetail {
    pub fn new(note: impl Into<String>, key: impl Into<String>, frequency: f32) -> Self {
        Self {
            note: note.into(),
            key: key.into(),
            frequency,
        }
    }

    pub fn key_identifier(&self) -> String {
        key_code(&self.key)
    }
}

/// Physical key code for a key name ("Z" -> "KeyZ", "1" -> "Digit1", others unchanged)
pub fn key_code(name: &str) -> String {
    let mut chars = name.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) if c.is_ascii_alphabetic() => format!("Key{}", c.to_ascii_uppercase()),
        (Some(c), None) if c.is_ascii_digit() => format!("Digit{}", c),
        _ => name.to_string(),
    }
}

/// One octave starting at middle C, laid out on the bottom two letter rows
pub fn default_note_details() -> Vec<NoteDetail> {
    vec![
        NoteDetail::new("C", "Z", 261.626),
        NoteDetail::new("Db", "S", 277.183),
        NoteDetail::new("D", "X", 293.665),
        NoteDetail::new("Eb", "D", 311.127),
        NoteDetail::new("E", "C", 329.628),
        NoteDetail::new("F", "V", 349.228),
        NoteDetail::new("Gb", "G", 369.994),
        NoteDetail::new("G", "B", 391.995),
        NoteDetail::new("Ab", "H", 415.305),
        NoteDetail::new("A", "N", 440.0),
        NoteDetail::new("Bb", "J", 466.164),
        NoteDetail::new("B", "M", 493.883),
    ]
}

#[derive(Debug, Clone, PartialEq)]
pub enum RegistryError {
    Empty,
    DuplicateNote(String),
    DuplicateKey(String),
    InvalidFrequency { note: String, frequency: f32 },
}

impl fmt::Display for RegistryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegistryError::Empty => write!(f, "note table is empty"),
            RegistryError::DuplicateNote(note) => write!(f, "note {} is mapped more than once", note),
            RegistryError::DuplicateKey(key) => write!(f, "key {} is mapped more than once", key),
            RegistryError::InvalidFrequency { note, frequency } => {
                write!(f, "note {} has invalid frequency {}", note, frequency)
            }
        }
    }
}

impl std::error::Error for RegistryError {}

/// Static note data plus the transient playback state for one key
#[derive(Debug)]
pub struct NoteEntry<V> {
    pub note_name: String,
    pub key_identifier: String,
    pub frequency: f32,
    pub active: bool,
    pub voice: Option<V>,
}

impl<V> NoteEntry<V> {
    fn from_detail(detail: &NoteDetail) -> Self {
        Self {
            note_name: detail.note.clone(),
            key_identifier: detail.key_identifier(),
            frequency: detail.frequency,
            active: false,
            voice: None,
        }
    }
}

/// Fixed set of notes keyed by physical key identifier
#[derive(Debug)]
pub struct NoteRegistry<V> {
    entries: Vec<NoteEntry<V>>,
    by_key: HashMap<String, usize>,
}

impl<V> NoteRegistry<V> {
    pub fn from_details(details: &[NoteDetail]) -> Result<Self, RegistryError> {
        if details.is_empty() {
            return Err(RegistryError::Empty);
        }

        let mut entries = Vec::with_capacity(details.len());
        let mut by_key = HashMap::with_capacity(details.len());

        for detail in details {
            if !detail.frequency.is_finite() || detail.frequency <= 0.0 {
                return Err(RegistryError::InvalidFrequency {
                    note: detail.note.clone(),
                    frequency: detail.frequency,
                });
            }
            if entries.iter().any(|e: &NoteEntry<V>| e.note_name == detail.note) {
                return Err(RegistryError::DuplicateNote(detail.note.clone()));
            }

            let entry = NoteEntry::from_detail(detail);
            if by_key.insert(entry.key_identifier.clone(), entries.len()).is_some() {
                return Err(RegistryError::DuplicateKey(entry.key_identifier));
            }
            entries.push(entry);
        }

        Ok(Self { entries, by_key })
    }

    /// Find the note for a key; `None` just means the key isn't part of the instrument
    pub fn lookup(&self, key_identifier: &str) -> Option<&NoteEntry<V>> {
        self.by_key.get(key_identifier).map(|&i| &self.entries[i])
    }

    pub fn lookup_mut(&mut self, key_identifier: &str) -> Option<&mut NoteEntry<V>> {
        match self.by_key.get(key_identifier) {
            Some(&i) => Some(&mut self.entries[i]),
            None => None,
        }
    }

    pub fn set_active(entry: &mut NoteEntry<V>, value: bool) {
        entry.active = value;
    }

    pub fn find_by_note(&self, note_name: &str) -> Option<&NoteEntry<V>> {
        self.entries.iter().find(|e| e.note_name == note_name)
    }

    pub fn entries(&self) -> &[NoteEntry<V>] {
        &self.entries
    }

    pub fn entries_mut(&mut self) -> &mut [NoteEntry<V>] {
        &mut self.entries
    }

    pub fn active_entries(&self) -> impl Iterator<Item = &NoteEntry<V>> {
        self.entries.iter().filter(|e| e.active)
    }

    pub fn active_count(&self) -> usize {
        self.active_entries().count()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<V> Default for NoteRegistry<V> {
    fn default() -> Self {
        let details = default_note_details();
        let entries: Vec<NoteEntry<V>> = details.iter().map(NoteEntry::from_detail).collect();
        let by_key = entries
            .iter()
            .enumerate()
            .map(|(i, e)| (e.key_identifier.clone(), i))
            .collect();
        Self { entries, by_key }
    }
}
