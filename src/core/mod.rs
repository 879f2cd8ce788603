// Core business logic module

pub mod archiver;
pub mod config;
pub mod decision;
pub mod orchestrator;
pub mod scanner;
pub mod uploader;

// Re-export commonly used items
pub use archiver::{archive_target, Archiver};
pub use config::Config;
pub use decision::{Decision, DecisionPrompt, PromptInput, PromptSession};
pub use orchestrator::{Dispatcher, Frontend, Notifier, Orchestrator, Outcome, ProcessingState};
pub use scanner::scan;
pub use uploader::{ImageHost, ImgurClient, Uploader};
