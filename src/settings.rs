use std::fs::{self, File};
use std::path::{Path, PathBuf};
use anyhow::{Context, Result};
use log::{info, warn};
use serde::{Serialize, Deserialize};
use crate::core::oscillator::Waveform;
use crate::core::registry::{default_note_details, NoteDetail};

const APP_DIR: &str = "pianotheorem";
const SETTINGS_FILE: &str = "settings.json";

// App settings structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub master_volume: f32,
    pub waveform: Waveform,
    pub output_device: Option<String>,
    /// JSON file holding a list of note details; the built-in octave is used when unset
    pub keymap: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            master_volume: 0.5,
            waveform: Waveform::Sine,
            output_device: None,
            keymap: None,
        }
    }
}

impl Settings {
    pub fn settings_dir() -> Result<PathBuf> {
        let mut path = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?;
        path.push(APP_DIR);
        Ok(path)
    }

    pub fn default_path() -> Result<PathBuf> {
        Ok(Self::settings_dir()?.join(SETTINGS_FILE))
    }

    /// Missing file means defaults
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let file = File::open(path)
            .with_context(|| format!("Failed to open settings file {}", path.display()))?;
        serde_json::from_reader(file)
            .with_context(|| format!("Failed to parse settings file {}", path.display()))
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir).context("Failed to create settings directory")?;
        }
        let file = File::create(path)
            .with_context(|| format!("Failed to create settings file {}", path.display()))?;
        serde_json::to_writer_pretty(file, self).context("Failed to write settings")?;
        Ok(())
    }

    /// Load from the user config directory, falling back to defaults on any error
    pub fn load_or_default() -> Self {
        match Self::default_path().and_then(|path| Self::load_from(&path)) {
            Ok(settings) => {
                info!("Loaded settings: {:?}", settings);
                settings
            },
            Err(e) => {
                warn!("Using default settings: {:#}", e);
                Self::default()
            }
        }
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::default_path()?)
    }

    /// Note table to build the registry from
    pub fn note_details(&self) -> Result<Vec<NoteDetail>> {
        match &self.keymap {
            Some(path) => load_keymap(path),
            None => Ok(default_note_details()),
        }
    }
}

pub fn load_keymap(path: &Path) -> Result<Vec<NoteDetail>> {
    let file = File::open(path)
        .with_context(|| format!("Failed to open keymap {}", path.display()))?;
    let details: Vec<NoteDetail> = serde_json::from_reader(file)
        .with_context(|| format!("Failed to parse keymap {}", path.display()))?;
    Ok(details)
}
