//! Terminal lifecycle for the full-screen views.
//!
//! The alternate screen is entered lazily when a view needs it and left as
//! soon as the view closes. Log output produced while it is up would be
//! wiped together with the alternate screen, so it is held back and written
//! out once the normal screen is restored.

use crate::error::{PaxError, Result};
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io::{self, Stdout, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

pub type TuiTerminal = Terminal<CrosstermBackend<Stdout>>;

static HOLD_LOGS: AtomicBool = AtomicBool::new(false);
static HELD_LOGS: Mutex<Vec<u8>> = Mutex::new(Vec::new());

/// Log target that defers output while a full-screen view is showing
pub struct LogWriter;

impl Write for LogWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if HOLD_LOGS.load(Ordering::Acquire) {
            if let Ok(mut held) = HELD_LOGS.lock() {
                held.extend_from_slice(buf);
                return Ok(buf.len());
            }
        }
        io::stderr().write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        io::stderr().flush()
    }
}

fn hold_logs() {
    HOLD_LOGS.store(true, Ordering::Release);
}

fn release_logs() {
    HOLD_LOGS.store(false, Ordering::Release);
    let pending = match HELD_LOGS.lock() {
        Ok(mut held) => std::mem::take(&mut *held),
        Err(_) => return,
    };
    if !pending.is_empty() {
        let mut stderr = io::stderr();
        let _ = stderr.write_all(&pending);
        let _ = stderr.flush();
    }
}

/// Owns raw mode and the alternate screen while a view is open
#[derive(Default)]
pub struct Screen {
    terminal: Option<TuiTerminal>,
}

impl Screen {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_open(&self) -> bool {
        self.terminal.is_some()
    }

    /// Enter the alternate screen if needed and hand out the terminal.
    pub fn open(&mut self) -> Result<&mut TuiTerminal> {
        if self.terminal.is_none() {
            hold_logs();
            match enter() {
                Ok(terminal) => self.terminal = Some(terminal),
                Err(e) => {
                    let _ = execute!(io::stdout(), LeaveAlternateScreen);
                    let _ = disable_raw_mode();
                    release_logs();
                    return Err(e);
                }
            }
        }

        self.terminal
            .as_mut()
            .ok_or_else(|| PaxError::tui("terminal not available"))
    }

    /// Leave the alternate screen. Safe to call when nothing is open.
    pub fn close(&mut self) -> Result<()> {
        let Some(mut terminal) = self.terminal.take() else {
            return Ok(());
        };

        let left = execute!(terminal.backend_mut(), LeaveAlternateScreen);
        let raw = disable_raw_mode();
        let cursor = terminal.show_cursor();
        release_logs();

        left.map_err(|e| PaxError::tui(format!("Failed to leave alternate screen: {}", e)))?;
        raw.map_err(|e| PaxError::tui(format!("Failed to disable raw mode: {}", e)))?;
        cursor.map_err(|e| PaxError::tui(format!("Failed to show cursor: {}", e)))?;
        Ok(())
    }
}

fn enter() -> Result<TuiTerminal> {
    enable_raw_mode().map_err(|e| PaxError::tui(format!("Failed to enable raw mode: {}", e)))?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)
        .map_err(|e| PaxError::tui(format!("Failed to enter alternate screen: {}", e)))?;

    Terminal::new(CrosstermBackend::new(stdout))
        .map_err(|e| PaxError::tui(format!("Failed to create terminal: {}", e)))
}

impl Drop for Screen {
    fn drop(&mut self) {
        let _ = self.close();
    }
}
