//! Watched-directory scanner
//!
//! Lists the direct children of the watched folder and returns the regular
//! files that are candidates for a decision. Nothing is remembered between
//! scans: a file is offered again for as long as it stays in the folder.
//!
//! # Examples
//!
//! ```no_run
//! use paxss::core::scanner::scan;
//! use std::path::Path;
//!
//! for path in scan(Path::new("/home/me/Screenshots"))? {
//!     println!("new file: {}", path.display());
//! }
//! # Ok::<(), paxss::PaxError>(())
//! ```

use crate::error::Result;
use std::fs;
use std::path::{Path, PathBuf};

/// Name prefix of the metadata sentinels macOS Finder drops into folders.
pub const METADATA_SENTINEL_PREFIX: &str = ".DS";

/// Whether a file name belongs to a filesystem metadata sentinel.
pub fn is_metadata_sentinel(file_name: &str) -> bool {
    file_name.starts_with(METADATA_SENTINEL_PREFIX)
}

/// Scan the watched directory and return candidate files
///
/// Directories, symlinks to directories and metadata sentinels are skipped.
/// Entries that vanish while being inspected are silently dropped; they
/// either reappear on the next scan or are gone for good.
pub fn scan(source_dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    for entry in fs::read_dir(source_dir)?.flatten() {
        let file_name = entry.file_name().to_string_lossy().to_string();

        if is_metadata_sentinel(&file_name) {
            continue;
        }

        // fs::metadata follows symlinks, matching "is a regular file" for links too
        let path = entry.path();
        match fs::metadata(&path) {
            Ok(metadata) if metadata.is_file() => files.push(path),
            Ok(_) => {}
            Err(e) => log::debug!("Skipping {:?}: {}", path, e),
        }
    }

    files.sort();
    Ok(files)
}
