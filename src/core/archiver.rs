//! Dated archive filing
//!
//! Files are moved into `root/<YYYY>/<MonthName>/<basename>`, where the date
//! is the local date at the time of the move (not the file's creation time).

use crate::error::{PaxError, Result};
use chrono::{Local, NaiveDate};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Directory a file lands in for a given root and date.
///
/// Pure: the same root and date always produce the same path.
pub fn archive_target(root: &Path, date: NaiveDate) -> PathBuf {
    root.join(date.format("%Y").to_string())
        .join(date.format("%B").to_string())
}

/// Create the archive directory (and any missing parents) if needed.
pub fn ensure_archive_dir(dir: &Path) -> Result<()> {
    fs::create_dir_all(dir).map_err(|e| {
        PaxError::filesystem(dir, format!("failed to create archive directory: {}", e))
    })
}

/// Moves files into one archive root
#[derive(Debug, Clone)]
pub struct Archiver {
    root: PathBuf,
}

impl Archiver {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Archive `file` under today's target directory.
    pub fn archive(&self, file: &Path) -> Result<PathBuf> {
        self.archive_on(file, Local::now().date_naive())
    }

    /// Destination `file` would get today, failing if that name is taken.
    pub fn vacant_destination(&self, file: &Path) -> Result<PathBuf> {
        self.vacant_destination_on(file, Local::now().date_naive())
    }

    /// Destination `file` would get on `date`, failing if that name is taken.
    pub fn vacant_destination_on(&self, file: &Path, date: NaiveDate) -> Result<PathBuf> {
        let file_name = file
            .file_name()
            .ok_or_else(|| PaxError::filesystem(file, "path has no file name"))?;

        let destination = archive_target(&self.root, date).join(file_name);
        if destination.exists() {
            return Err(PaxError::filesystem(
                &destination,
                "destination already exists, refusing to overwrite",
            ));
        }
        Ok(destination)
    }

    /// Archive `file` under the target directory for `date`.
    ///
    /// An existing file at the destination is never overwritten: the move is
    /// refused and the source is left where it was.
    pub fn archive_on(&self, file: &Path, date: NaiveDate) -> Result<PathBuf> {
        let destination = self.vacant_destination_on(file, date)?;

        if !file.is_file() {
            return Err(PaxError::filesystem(file, "source file no longer exists"));
        }

        if let Some(target_dir) = destination.parent() {
            ensure_archive_dir(target_dir)?;
        }

        move_file(file, &destination)?;
        log::debug!("Archived {:?} -> {:?}", file, destination);

        Ok(destination)
    }
}

/// Rename, falling back to copy + remove when the rename crosses filesystems.
fn move_file(from: &Path, to: &Path) -> Result<()> {
    match fs::rename(from, to) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Err(PaxError::filesystem(
            from,
            format!("source vanished during move: {}", e),
        )),
        Err(rename_err) => {
            log::debug!(
                "rename {:?} -> {:?} failed ({}), trying copy",
                from,
                to,
                rename_err
            );
            fs::copy(from, to).map_err(|e| {
                PaxError::filesystem(to, format!("failed to move file: {} ({})", rename_err, e))
            })?;
            fs::remove_file(from).map_err(|e| {
                PaxError::filesystem(from, format!("copied but failed to remove source: {}", e))
            })
        }
    }
}
