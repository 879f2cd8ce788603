// Platform-specific code module

pub mod clipboard;

// Re-exports para imports limpios
pub use clipboard::{Clipboard, SystemClipboard};
