use anyhow::{Context, Result};
use eframe::egui;
use log::{debug, error, info, warn};
use std::path::PathBuf;
use std::sync::{Arc, RwLock};
use crate::audio::{self, AudioOutput};
use crate::core::mixer::{Mixer, MixerGraph, MixerVoice};
use crate::core::oscillator::Waveform;
use crate::core::registry::{key_code, NoteRegistry};
use crate::core::{AudioRenderer, Dispatch, InputDispatcher, KeySignal};
use crate::messaging::{MessageBus, PianoMessage};
use crate::settings::{self, Settings};
use crate::ui::components::ScopePlot;
use crate::ui::KeyboardView;

const MAX_MESSAGES_PER_FRAME: usize = 256;

// Main app state
pub struct PianoApp {
    dispatcher: InputDispatcher<MixerGraph>,
    keyboard: KeyboardView,
    message_bus: MessageBus,
    mixer: Arc<RwLock<Mixer>>,
    output: Option<AudioOutput>,
    output_devices: Vec<String>,
    settings: Settings,
    last_error: Option<String>,
}

impl eframe::App for PianoApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // Keyboard input goes through the bus like any other producer
        let signals: Vec<KeySignal> = ctx.input(|i| i.events.iter().filter_map(translate_event).collect());
        for signal in signals {
            self.message_bus.send(PianoMessage::Key(signal)).ok();
        }
        self.process_messages();

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.heading("PianoTheorem");
                ui.label("🎹");
            });
            ui.add_space(8.0);

            self.render_controls(ui);
            ui.separator();

            self.keyboard.show(ui);
            ui.add_space(8.0);

            let held: Vec<&str> = self.dispatcher
                .registry()
                .active_entries()
                .map(|e| e.note_name.as_str())
                .collect();
            if held.is_empty() {
                ui.label("Play with the Z-M row (S, D, G, H, J for the black keys)");
            } else {
                ui.label(format!("Playing: {}", held.join(" ")));
            }

            if let Ok(mixer) = self.mixer.read() {
                ScopePlot::new(mixer.generate_waveform_display())
                    .height(120.0)
                    .show(ui, "output_scope");
            }

            if let Some(err) = &self.last_error {
                ui.colored_label(egui::Color32::from_rgb(220, 80, 80), err);
            }
        });

        // Keep the scope moving
        ctx.request_repaint();
    }
}

impl PianoApp {
    pub fn new(settings: Settings) -> Result<Self> {
        let (output, mixer) = match AudioOutput::open(settings.output_device.as_deref()) {
            Ok(output) => {
                let mixer = output.mixer();
                (Some(output), mixer)
            },
            Err(e) => {
                // Keep the UI usable without sound
                error!("Audio output unavailable, running silent: {:#}", e);
                (None, Arc::new(RwLock::new(Mixer::new(44_100.0))))
            }
        };

        if let Ok(mut m) = mixer.write() {
            m.set_master_volume(settings.master_volume);
        }

        let registry: NoteRegistry<MixerVoice> = match settings.note_details()
            .and_then(|details| NoteRegistry::from_details(&details).context("Invalid keymap"))
        {
            Ok(registry) => registry,
            Err(e) => {
                warn!("Falling back to the built-in keymap: {:#}", e);
                NoteRegistry::default()
            }
        };
        info!("Loaded {} notes", registry.len());

        let mut keyboard = KeyboardView::one_octave();
        keyboard.label_from_registry(&registry);

        let renderer = AudioRenderer::new(MixerGraph::new(Arc::clone(&mixer)))
            .with_waveform(settings.waveform);

        Ok(Self {
            dispatcher: InputDispatcher::new(registry, renderer),
            keyboard,
            message_bus: MessageBus::new(),
            mixer,
            output,
            output_devices: audio::output_device_names(),
            settings,
            last_error: None,
        })
    }

    fn process_messages(&mut self) {
        let mut volume = None;
        let dispatcher = &mut self.dispatcher;
        let keyboard = &mut self.keyboard;

        self.message_bus.process_messages(MAX_MESSAGES_PER_FRAME, |msg| match msg {
            PianoMessage::Key(signal) => {
                let outcome = dispatcher.handle(&signal, &mut *keyboard);
                if let Dispatch::Rebuilt(report) = &outcome {
                    debug!("{:?} -> {} started at {:?}", signal, report.started.len(), report.gain);
                }
            },
            PianoMessage::SetVolume(v) => volume = Some(v),
        });

        if let Some(v) = volume {
            self.set_volume(v);
        }
    }

    fn set_volume(&mut self, volume: f32) {
        if let Ok(mut mixer) = self.mixer.write() {
            mixer.set_master_volume(volume);
        }
        self.settings.master_volume = volume.clamp(0.0, 1.0);
        self.save_settings();
    }

    fn save_settings(&mut self) {
        if let Err(e) = self.settings.save() {
            warn!("Could not save settings: {:#}", e);
        }
    }

    fn render_controls(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            ui.label("Master Volume:");
            let mut volume = self.settings.master_volume;
            if ui.add(egui::Slider::new(&mut volume, 0.0..=1.0)).changed() {
                self.message_bus.send(PianoMessage::SetVolume(volume)).ok();
            }

            ui.label("Waveform:");
            let mut waveform = self.dispatcher.renderer().waveform();
            egui::ComboBox::new("waveform_selector", "")
                .selected_text(format!("{:?}", waveform))
                .show_ui(ui, |ui| {
                    for option in Waveform::all() {
                        ui.selectable_value(&mut waveform, option, format!("{:?}", option));
                    }
                });
            if waveform != self.dispatcher.renderer().waveform() {
                self.dispatcher.renderer_mut().set_waveform(waveform);
                self.settings.waveform = waveform;
                self.save_settings();
            }
        });

        ui.horizontal(|ui| {
            let device = self.output
                .as_ref()
                .map(|o| o.device_name().to_string())
                .unwrap_or_else(|| "none (silent)".to_string());
            ui.label(format!("Output: {}", device));

            let mut chosen = None;
            egui::ComboBox::new("output_device", "")
                .selected_text("Change output (restart to apply)")
                .show_ui(ui, |ui| {
                    for name in &self.output_devices {
                        let selected = self.settings.output_device.as_deref() == Some(name.as_str());
                        if ui.selectable_label(selected, name).clicked() {
                            chosen = Some(name.clone());
                        }
                    }
                });
            if let Some(name) = chosen {
                info!("Output device set to {} for next start", name);
                self.settings.output_device = Some(name);
                self.save_settings();
            }

            if ui.button("Load Keymap...").clicked() {
                if let Some(path) = rfd::FileDialog::new().add_filter("JSON", &["json"]).pick_file() {
                    match self.load_keymap(path) {
                        Ok(()) => self.last_error = None,
                        Err(e) => {
                            warn!("{:#}", e);
                            self.last_error = Some(format!("{:#}", e));
                        }
                    }
                }
            }
        });

    }

    fn load_keymap(&mut self, path: PathBuf) -> Result<()> {
        let details = settings::load_keymap(&path)?;
        let registry = NoteRegistry::from_details(&details)
            .with_context(|| format!("Invalid keymap {}", path.display()))?;

        self.dispatcher.replace_registry(registry, &mut self.keyboard);
        self.keyboard.label_from_registry(self.dispatcher.registry());
        info!("Loaded keymap {} ({} notes)", path.display(), self.dispatcher.registry().len());

        self.settings.keymap = Some(path);
        self.save_settings();
        Ok(())
    }
}

impl Drop for PianoApp {
    fn drop(&mut self) {
        let stopped = self.dispatcher.silence();
        debug!("Stopped {} voices on shutdown", stopped);
    }
}

/// egui key event -> key signal using browser-style key codes
pub fn translate_event(event: &egui::Event) -> Option<KeySignal> {
    match event {
        egui::Event::Key { key, physical_key, pressed, repeat, .. } => {
            let code = key_code(physical_key.unwrap_or(*key).name());
            Some(if *pressed {
                KeySignal::Pressed { key: code, repeat: *repeat }
            } else {
                KeySignal::Released { key: code }
            })
        },
        egui::Event::WindowFocused(false) => Some(KeySignal::ReleaseAll),
        _ => None,
    }
}
