// UI module: console messages and the full-screen terminal views

pub mod preview;
pub mod prompts;
pub mod render;
pub mod terminal;
pub mod tui;

// Re-export commonly used items for cleaner imports
pub use preview::PreviewImage;
pub use prompts::{dimmed, error, info, print_watch_summary, success, warn};
pub use terminal::{LogWriter, Screen};
pub use tui::TerminalUi;
