//! Terminal front end: the per-file preview prompt and the upload notice.
//!
//! Both views share one [`Screen`] and are driven from the watch loop's
//! thread. The prompt pumps keyboard input until the decision settles; the
//! notice is serviced from [`Notifier::idle`] between polls and dismisses
//! itself when its deadline passes.

use std::path::Path;
use std::thread;
use std::time::{Duration, Instant};

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use super::preview::PreviewImage;
use super::render::{render_notice, render_prompt, NoticeView, PromptStatus, PromptView};
use super::terminal::Screen;
use crate::core::config::Config;
use crate::core::decision::{
    await_decision, Clock, Decision, DecisionPrompt, PromptInput, PromptInputs, SystemClock,
    REDRAW_INTERVAL,
};
use crate::core::orchestrator::Notifier;
use crate::error::{PaxError, Result};

/// Keys accepted while the confirmation notice is up
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeInput {
    Dismiss,
    Interrupt,
}

fn is_ctrl_c(key: &KeyEvent) -> bool {
    key.modifiers.contains(KeyModifiers::CONTROL)
        && matches!(key.code, KeyCode::Char('c') | KeyCode::Char('C'))
}

/// Key binding for the preview prompt
pub fn map_prompt_key(key: &KeyEvent) -> Option<PromptInput> {
    if is_ctrl_c(key) {
        return Some(PromptInput::Interrupt);
    }
    match key.code {
        KeyCode::Char('y') | KeyCode::Char('Y') => Some(PromptInput::Accept),
        KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => Some(PromptInput::Decline),
        _ => None,
    }
}

/// Key binding for the confirmation notice
pub fn map_notice_key(key: &KeyEvent) -> Option<NoticeInput> {
    if is_ctrl_c(key) {
        return Some(NoticeInput::Interrupt);
    }
    match key.code {
        KeyCode::Enter | KeyCode::Esc | KeyCode::Char('o') | KeyCode::Char('O') => {
            Some(NoticeInput::Dismiss)
        }
        _ => None,
    }
}

/// Wait up to `timeout` for the next terminal event.
fn read_event(timeout: Duration) -> Result<Option<Event>> {
    if !event::poll(timeout).map_err(|e| PaxError::tui(format!("Event poll failed: {}", e)))? {
        return Ok(None);
    }
    let event = event::read().map_err(|e| PaxError::tui(format!("Event read failed: {}", e)))?;
    Ok(Some(event))
}

fn pressed(event: &Event) -> Option<&KeyEvent> {
    match event {
        Event::Key(key) if key.kind == KeyEventKind::Press => Some(key),
        _ => None,
    }
}

/// Keyboard input for the prompt, read from crossterm
#[derive(Debug, Default)]
pub struct CrosstermInputs;

impl PromptInputs for CrosstermInputs {
    fn next_input(&mut self, timeout: Duration) -> Result<Option<PromptInput>> {
        Ok(match read_event(timeout)? {
            Some(Event::Resize(..)) => Some(PromptInput::Refresh),
            Some(event) => pressed(&event).and_then(map_prompt_key),
            None => None,
        })
    }
}

/// Confirmation waiting for its auto-dismiss deadline
#[derive(Debug, Clone)]
pub struct PendingNotice {
    pub url: String,
    pub expires_at: Instant,
}

impl PendingNotice {
    pub fn new(url: &str, now: Instant, duration: Duration) -> Self {
        Self {
            url: url.to_string(),
            expires_at: now + duration,
        }
    }

    pub fn remaining(&self, now: Instant) -> Duration {
        self.expires_at.saturating_duration_since(now)
    }

    pub fn is_expired(&self, now: Instant) -> bool {
        now >= self.expires_at
    }
}

/// Full-screen terminal implementation of the prompt and notifier
pub struct TerminalUi {
    screen: Screen,
    inputs: CrosstermInputs,
    clock: SystemClock,
    notice: Option<PendingNotice>,
    prompt_timeout: Duration,
    notice_duration: Duration,
}

impl TerminalUi {
    pub fn new(config: &Config) -> Self {
        Self {
            screen: Screen::new(),
            inputs: CrosstermInputs,
            clock: SystemClock,
            notice: None,
            prompt_timeout: config.prompt_timeout,
            notice_duration: config.notice_duration,
        }
    }

    fn run_prompt(
        &mut self,
        file_name: &str,
        preview: Option<&PreviewImage>,
        act: &mut dyn FnMut(Decision),
    ) -> Result<Decision> {
        let terminal = self.screen.open()?;

        let decision = await_decision(
            &mut self.inputs,
            &self.clock,
            self.prompt_timeout,
            |remaining| {
                terminal.draw(|frame| {
                    render_prompt(
                        frame,
                        &PromptView {
                            file_name,
                            preview,
                            remaining,
                            status: PromptStatus::Waiting,
                        },
                    )
                })?;
                Ok(())
            },
        )?;

        terminal.draw(|frame| {
            render_prompt(
                frame,
                &PromptView {
                    file_name,
                    preview,
                    remaining: Duration::ZERO,
                    status: PromptStatus::Working(decision),
                },
            )
        })?;

        act(decision);
        Ok(decision)
    }

    fn dismiss_notice(&mut self) -> Result<()> {
        self.notice = None;
        self.screen.close()
    }

    /// Show the notice and wait at most `wait` for a key.
    fn pump_notice(&mut self, notice: &PendingNotice, wait: Duration) -> Result<()> {
        let remaining = notice.remaining(self.clock.now());

        let terminal = self.screen.open()?;
        terminal.draw(|frame| {
            render_notice(
                frame,
                &NoticeView {
                    url: &notice.url,
                    remaining,
                },
            )
        })?;

        let slice = wait.min(remaining).min(REDRAW_INTERVAL);
        let key = read_event(slice)?
            .as_ref()
            .and_then(pressed)
            .and_then(map_notice_key);

        match key {
            Some(NoticeInput::Dismiss) => self.dismiss_notice(),
            Some(NoticeInput::Interrupt) => {
                self.dismiss_notice()?;
                Err(PaxError::Interrupted)
            }
            None => Ok(()),
        }
    }
}

impl DecisionPrompt for TerminalUi {
    fn prompt(&mut self, file: &Path, act: &mut dyn FnMut(Decision)) -> Result<Decision> {
        // A new file takes over the screen from any confirmation still showing
        self.notice = None;

        let preview = match PreviewImage::open(file) {
            Ok(preview) => Some(preview),
            Err(e) if e.is_transient() => {
                self.screen.close()?;
                return Err(e);
            }
            Err(e) => {
                log::warn!("No preview for {:?}: {}", file, e);
                None
            }
        };

        let file_name = file
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();

        let decided = self.run_prompt(&file_name, preview.as_ref(), act);
        let closed = self.screen.close();
        // The decoded image lives exactly as long as the prompt was on screen
        drop(preview);

        let decision = decided?;
        closed?;
        Ok(decision)
    }
}

impl Notifier for TerminalUi {
    fn confirm_upload(&mut self, url: &str) {
        self.notice = Some(PendingNotice::new(url, self.clock.now(), self.notice_duration));
    }

    fn idle(&mut self, wait: Duration) -> Result<()> {
        let until = self.clock.now() + wait;

        loop {
            let now = self.clock.now();
            if now >= until {
                return Ok(());
            }

            match self.notice.clone() {
                None => {
                    thread::sleep(until - now);
                    return Ok(());
                }
                Some(notice) if notice.is_expired(now) => self.dismiss_notice()?,
                Some(notice) => self.pump_notice(&notice, until - now)?,
            }
        }
    }
}
