use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Custom error type for PaxSS
#[derive(Error, Debug)]
pub enum PaxError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    /// The file disappeared between the directory scan and the moment it was opened.
    #[error("File vanished before it could be opened: {}", path.display())]
    TransientFile { path: PathBuf },

    #[error("Upload error: {0}")]
    Upload(String),

    #[error("Filesystem error on {}: {message}", path.display())]
    Filesystem { path: PathBuf, message: String },

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("Clipboard error: {0}")]
    Clipboard(String),

    #[error("TUI error: {0}")]
    Tui(String),

    #[error("Interrupted by user")]
    Interrupted,
}

/// Result type alias for PaxSS
pub type Result<T> = std::result::Result<T, PaxError>;

impl PaxError {
    /// Create a config error
    pub fn config<S: Into<String>>(msg: S) -> Self {
        PaxError::Config(msg.into())
    }

    /// Create a transient file error
    pub fn transient_file<P: AsRef<Path>>(path: P) -> Self {
        PaxError::TransientFile {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Create an upload error
    pub fn upload<S: Into<String>>(msg: S) -> Self {
        PaxError::Upload(msg.into())
    }

    /// Create a filesystem error tied to a path
    pub fn filesystem<P: AsRef<Path>, S: Into<String>>(path: P, msg: S) -> Self {
        PaxError::Filesystem {
            path: path.as_ref().to_path_buf(),
            message: msg.into(),
        }
    }

    pub fn clipboard<S: Into<String>>(msg: S) -> Self {
        PaxError::Clipboard(msg.into())
    }

    pub fn tui<S: Into<String>>(msg: S) -> Self {
        PaxError::Tui(msg.into())
    }

    /// True when the error only means "skip this file for now".
    pub fn is_transient(&self) -> bool {
        matches!(self, PaxError::TransientFile { .. })
    }
}

impl From<reqwest::Error> for PaxError {
    fn from(err: reqwest::Error) -> Self {
        PaxError::Upload(err.to_string())
    }
}
