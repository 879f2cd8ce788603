//! Watch loop and per-file disposition
//!
//! One file is in flight at a time:
//!
//! ```text
//! Idle -> AwaitingDecision -> (Uploading ->)? Archiving -> Idle
//! ```
//!
//! Every path ends back in `Idle`, whatever failed along the way. Only a user
//! interrupt ends the loop.

use crate::core::archiver::Archiver;
use crate::core::config::Config;
use crate::core::decision::{Decision, DecisionPrompt};
use crate::core::scanner;
use crate::core::uploader::Uploader;
use crate::error::{PaxError, Result};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

/// Transient feedback and the wait between polls
pub trait Notifier {
    /// Schedule the auto-dismissing "upload successful" notice.
    fn confirm_upload(&mut self, url: &str);

    /// Wait up to `wait`, servicing any pending notice. Returns
    /// [`PaxError::Interrupted`] when the user asked to quit.
    fn idle(&mut self, wait: Duration) -> Result<()>;
}

/// Everything the orchestrator needs from the user interface
pub trait Frontend: DecisionPrompt + Notifier {}

impl<T: DecisionPrompt + Notifier> Frontend for T {}

/// Where a file is in its disposition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessingState {
    Idle,
    AwaitingDecision,
    Uploading,
    Archiving,
}

/// What happened to one file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
    pub file: PathBuf,
    /// `None` when the file was skipped before a decision was made
    pub decision: Option<Decision>,
    pub url: Option<String>,
    pub archived_to: Option<PathBuf>,
}

impl Outcome {
    fn skipped(file: &Path) -> Self {
        Self {
            file: file.to_path_buf(),
            decision: None,
            url: None,
            archived_to: None,
        }
    }

    /// Uploaded and filed: the case that earns a confirmation.
    pub fn is_complete_upload(&self) -> bool {
        self.decision == Some(Decision::UploadAndArchive)
            && self.url.is_some()
            && self.archived_to.is_some()
    }
}

/// Runs the action chosen for a file
pub struct Dispatcher {
    uploader: Uploader,
    upload_archive: Archiver,
    local_archive: Archiver,
    state: ProcessingState,
}

impl Dispatcher {
    pub fn new(config: &Config, uploader: Uploader) -> Self {
        Self {
            uploader,
            upload_archive: Archiver::new(&config.upload_dir),
            local_archive: Archiver::new(&config.save_dir),
            state: ProcessingState::Idle,
        }
    }

    pub fn state(&self) -> ProcessingState {
        self.state
    }

    fn transition(&mut self, to: ProcessingState) {
        log::debug!("state {:?} -> {:?}", self.state, to);
        self.state = to;
    }

    /// Carry out `decision` for `file`. Failures are logged, never raised.
    pub fn dispose(&mut self, file: &Path, decision: Decision) -> Outcome {
        let name = display_name(file);
        let mut outcome = Outcome::skipped(file);
        outcome.decision = Some(decision);

        match decision {
            Decision::UploadAndArchive => {
                // A colliding file stays in the watched folder; it is never uploaded
                if let Err(e) = self.upload_archive.vacant_destination(file) {
                    log::error!("Not uploading {}: {}", name, e);
                    return outcome;
                }

                self.transition(ProcessingState::Uploading);
                match self.uploader.upload(file) {
                    Ok(url) => outcome.url = Some(url),
                    Err(e) => log::error!("Error uploading {}: {}", name, e),
                }

                self.transition(ProcessingState::Archiving);
                outcome.archived_to = archive_logged(&self.upload_archive, file);

                match (&outcome.url, &outcome.archived_to) {
                    (Some(_), Some(_)) => log::info!("File uploaded & saved successfully: {}", name),
                    (None, Some(_)) => log::warn!("File saved without upload: {}", name),
                    (Some(_), None) => log::warn!("File uploaded but not saved: {}", name),
                    (None, None) => log::error!("File neither uploaded nor saved: {}", name),
                }
            }
            Decision::ArchiveOnly => {
                self.transition(ProcessingState::Archiving);
                outcome.archived_to = archive_logged(&self.local_archive, file);
                if outcome.archived_to.is_some() {
                    log::info!("File saved but not uploaded: {}", name);
                }
            }
        }

        outcome
    }
}

fn archive_logged(archiver: &Archiver, file: &Path) -> Option<PathBuf> {
    match archiver.archive(file) {
        Ok(path) => Some(path),
        Err(e) => {
            log::error!(
                "Error saving {} under {:?}: {}",
                display_name(file),
                archiver.root(),
                e
            );
            None
        }
    }
}

fn display_name(file: &Path) -> String {
    file.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| file.display().to_string())
}

/// Owns the poll loop
pub struct Orchestrator<F: Frontend> {
    watch_dir: PathBuf,
    poll_interval: Duration,
    frontend: F,
    dispatcher: Dispatcher,
}

impl<F: Frontend> Orchestrator<F> {
    pub fn new(config: &Config, frontend: F, uploader: Uploader) -> Self {
        Self {
            watch_dir: config.watch_dir.clone(),
            poll_interval: config.poll_interval,
            frontend,
            dispatcher: Dispatcher::new(config, uploader),
        }
    }

    pub fn state(&self) -> ProcessingState {
        self.dispatcher.state()
    }

    pub fn frontend(&self) -> &F {
        &self.frontend
    }

    /// Take one file from discovery back to `Idle`.
    ///
    /// Only an interrupt is returned as an error; every other failure is
    /// logged and reflected in the outcome.
    pub fn process_file(&mut self, file: &Path) -> Result<Outcome> {
        self.dispatcher.transition(ProcessingState::AwaitingDecision);

        let mut acted: Option<Outcome> = None;
        let dispatcher = &mut self.dispatcher;
        let prompted = self.frontend.prompt(file, &mut |decision| {
            if acted.is_none() {
                acted = Some(dispatcher.dispose(file, decision));
            }
        });

        let outcome = match prompted {
            Ok(decision) => match acted {
                Some(outcome) => outcome,
                None => self.dispatcher.dispose(file, decision),
            },
            Err(PaxError::Interrupted) => {
                self.dispatcher.transition(ProcessingState::Idle);
                return Err(PaxError::Interrupted);
            }
            Err(e) if e.is_transient() => {
                log::warn!("Skipping {}: {}", display_name(file), e);
                Outcome::skipped(file)
            }
            Err(e) => {
                log::error!("Prompt failed for {}: {}", display_name(file), e);
                acted.unwrap_or_else(|| Outcome::skipped(file))
            }
        };

        self.dispatcher.transition(ProcessingState::Idle);

        if outcome.is_complete_upload() {
            if let Some(url) = outcome.url.as_deref() {
                self.frontend.confirm_upload(url);
            }
        }

        Ok(outcome)
    }

    /// Scan once and dispose of every file found, one after another.
    pub fn run_cycle(&mut self) -> Result<Vec<Outcome>> {
        let files = match scanner::scan(&self.watch_dir) {
            Ok(files) => files,
            Err(e) => {
                log::error!("Failed to scan {:?}: {}", self.watch_dir, e);
                return Ok(Vec::new());
            }
        };

        let mut outcomes = Vec::with_capacity(files.len());
        for file in files {
            outcomes.push(self.process_file(&file)?);
        }
        Ok(outcomes)
    }

    /// Poll until `shutdown` is raised or the user interrupts.
    pub fn run(&mut self, shutdown: &AtomicBool) -> Result<()> {
        let mut next_scan = Instant::now();

        while !shutdown.load(Ordering::Relaxed) {
            if Instant::now() >= next_scan {
                match self.run_cycle() {
                    Ok(_) => {}
                    Err(PaxError::Interrupted) => break,
                    Err(e) => log::error!("Scan cycle failed: {}", e),
                }
                next_scan = Instant::now() + self.poll_interval;
            }

            let wait = next_scan.saturating_duration_since(Instant::now());
            match self.frontend.idle(wait) {
                Ok(()) => {}
                Err(PaxError::Interrupted) => break,
                Err(e) => {
                    log::error!("UI error while idle: {}", e);
                    std::thread::sleep(wait);
                }
            }
        }

        log::info!("Stopped watching {:?}", self.watch_dir);
        Ok(())
    }
}
