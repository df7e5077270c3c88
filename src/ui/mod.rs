pub mod components;
pub mod keyboard;

pub use keyboard::KeyboardView;
