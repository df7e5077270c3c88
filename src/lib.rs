//! Computer-keyboard piano: key signals drive per-note voices in a shared mixer
//! and light up an on-screen keyboard.

pub mod app;
pub mod audio;
pub mod core;
pub mod messaging;
pub mod settings;
pub mod ui;
