//! Per-file upload decision
//!
//! A decision is collected by a [`PromptSession`]: the first of a user input
//! or the deadline settles it, and nothing can change it afterwards. The
//! session is pure state; [`await_decision`] pumps an input source on the
//! calling thread until the session settles, which keeps the wait
//! cooperative (no helper threads) while still honouring the timeout.

use crate::error::{PaxError, Result};
use std::fmt;
use std::path::Path;
use std::time::{Duration, Instant};

/// Longest single wait between countdown redraws.
pub const REDRAW_INTERVAL: Duration = Duration::from_millis(250);

/// What happens to a watched file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// Send to the image host, then file under the upload root
    UploadAndArchive,
    /// File under the local root only
    ArchiveOnly,
}

impl Decision {
    /// Decision taken when nobody answers in time.
    pub const DEFAULT: Decision = Decision::ArchiveOnly;
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Decision::UploadAndArchive => write!(f, "upload and archive"),
            Decision::ArchiveOnly => write!(f, "archive only"),
        }
    }
}

/// Inputs a prompt can receive
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptInput {
    Accept,
    Decline,
    /// Ctrl+C: leave the application, not a decision
    Interrupt,
    /// Terminal resized or similar; only triggers a redraw
    Refresh,
}

/// Source of monotonic time, swappable in tests.
pub trait Clock {
    fn now(&self) -> Instant;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Blocking input source for a prompt
pub trait PromptInputs {
    /// Wait at most `timeout` for the next input; `None` when nothing arrived.
    fn next_input(&mut self, timeout: Duration) -> Result<Option<PromptInput>>;
}

/// Presents a file and produces exactly one decision for it
pub trait DecisionPrompt {
    /// Ask about `file`. `act` is run with the decision before the prompt is
    /// torn down, and the prompt is always closed before this returns.
    fn prompt(&mut self, file: &Path, act: &mut dyn FnMut(Decision)) -> Result<Decision>;
}

/// Deadline-bound, settle-once decision state
#[derive(Debug)]
pub struct PromptSession {
    deadline: Instant,
    decision: Option<Decision>,
}

impl PromptSession {
    pub fn start(now: Instant, timeout: Duration) -> Self {
        Self {
            deadline: now + timeout,
            decision: None,
        }
    }

    pub fn decision(&self) -> Option<Decision> {
        self.decision
    }

    pub fn remaining(&self, now: Instant) -> Duration {
        self.deadline.saturating_duration_since(now)
    }

    /// Apply a user input. Returns the decision once settled.
    pub fn resolve(&mut self, input: PromptInput) -> Option<Decision> {
        if self.decision.is_none() {
            self.decision = match input {
                PromptInput::Accept => Some(Decision::UploadAndArchive),
                PromptInput::Decline => Some(Decision::ArchiveOnly),
                PromptInput::Interrupt | PromptInput::Refresh => None,
            };
        }
        self.decision
    }

    /// Fire the timeout default if the deadline has passed and nothing was
    /// decided yet. Returns the decision once settled.
    pub fn expire(&mut self, now: Instant) -> Option<Decision> {
        if self.decision.is_none() && now >= self.deadline {
            self.decision = Some(Decision::DEFAULT);
        }
        self.decision
    }
}

/// Pump `inputs` until a decision is made or `timeout` elapses.
///
/// `redraw` is called with the remaining time before every wait so a view can
/// show a countdown. An interrupt aborts with [`PaxError::Interrupted`].
pub fn await_decision<I, C, F>(
    inputs: &mut I,
    clock: &C,
    timeout: Duration,
    mut redraw: F,
) -> Result<Decision>
where
    I: PromptInputs + ?Sized,
    C: Clock + ?Sized,
    F: FnMut(Duration) -> Result<()>,
{
    let mut session = PromptSession::start(clock.now(), timeout);

    loop {
        let now = clock.now();
        if let Some(decision) = session.expire(now) {
            log::debug!("No answer within {:?}, defaulting to {}", timeout, decision);
            return Ok(decision);
        }

        let remaining = session.remaining(now);
        redraw(remaining)?;

        match inputs.next_input(remaining.min(REDRAW_INTERVAL))? {
            Some(PromptInput::Interrupt) => return Err(PaxError::Interrupted),
            Some(input) => {
                if let Some(decision) = session.resolve(input) {
                    return Ok(decision);
                }
            }
            None => {}
        }
    }
}
