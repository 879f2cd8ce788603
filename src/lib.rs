// PaxSS Library - Public API

// Re-export error types
pub mod error;
pub use error::{PaxError, Result};

// Module declarations
pub mod core;
pub mod platform;
pub mod ui;

// Re-export commonly used types
pub use core::config::Config;
pub use core::decision::Decision;

// Initialize logging (held back while a full-screen view is open)
pub fn init_logging() {
    env_logger::Builder::new()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .target(env_logger::Target::Pipe(Box::new(ui::LogWriter)))
        .init();
}
