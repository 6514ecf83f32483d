pub mod dots;
pub mod hotkey;
pub mod logging;
pub mod settings;
