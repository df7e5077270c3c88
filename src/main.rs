use eframe::egui;
use anyhow::Result;
use log::{error, info};
use piano_theorem::app::PianoApp;
use piano_theorem::settings::Settings;

fn main() -> Result<()> {
    // RUST_LOG=debug shows every rebuild
    env_logger::init();
    info!("Starting PianoTheorem");
    
    let settings = Settings::load_or_default();
    
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([760.0, 560.0]),
        ..Default::default()
    };
    
    eframe::run_native(
        "PianoTheorem",
        options,
        Box::new(|_cc| {
            let app = match PianoApp::new(settings) {
                Ok(app) => app,
                Err(e) => {
                    error!("Failed to create app: {:#}", e);
                    return Err(e.into());
                }
            };
            Ok(Box::new(app))
        }),
    ).map_err(|e| anyhow::anyhow!("Application error: {}", e))
}
