// System clipboard access

use crate::error::{PaxError, Result};

/// Destination for shareable links
pub trait Clipboard {
    fn set_text(&mut self, text: &str) -> Result<()>;
}

/// The desktop clipboard, via arboard.
///
/// The arboard handle is opened lazily and kept for the life of the process:
/// on X11 the contents are only served while the owning handle is alive.
#[derive(Default)]
pub struct SystemClipboard {
    inner: Option<arboard::Clipboard>,
}

impl SystemClipboard {
    pub fn new() -> Self {
        Self::default()
    }

    fn handle(&mut self) -> Result<&mut arboard::Clipboard> {
        if self.inner.is_none() {
            let clipboard = arboard::Clipboard::new()
                .map_err(|e| PaxError::clipboard(format!("failed to open clipboard: {}", e)))?;
            self.inner = Some(clipboard);
        }
        self.inner
            .as_mut()
            .ok_or_else(|| PaxError::clipboard("clipboard unavailable"))
    }
}

impl Clipboard for SystemClipboard {
    fn set_text(&mut self, text: &str) -> Result<()> {
        self.handle()?
            .set_text(text.to_owned())
            .map_err(|e| PaxError::clipboard(e.to_string()))
    }
}
