//! Local clipboard access behind a narrow seam
//!
//! The platform clipboard is an external collaborator with transient
//! failures; callers log and keep polling rather than treat an error as
//! fatal.

use arboard::Clipboard as ArboardClipboard;

use crate::{Error, Result};

/// Read/write access to the platform clipboard
pub trait Clipboard: Send + Sync {
    /// Current clipboard text; empty when nothing textual is present
    fn read(&self) -> Result<String>;

    fn write(&self, text: &str) -> Result<()>;
}

/// System clipboard via arboard
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClipboard;

impl Clipboard for SystemClipboard {
    fn read(&self) -> Result<String> {
        let mut clipboard =
            ArboardClipboard::new().map_err(|e| Error::Clipboard(e.to_string()))?;

        match clipboard.get_text() {
            Ok(text) => Ok(text),
            Err(arboard::Error::ContentNotAvailable) => Ok(String::new()),
            Err(e) => Err(Error::Clipboard(e.to_string())),
        }
    }

    fn write(&self, text: &str) -> Result<()> {
        let mut clipboard =
            ArboardClipboard::new().map_err(|e| Error::Clipboard(e.to_string()))?;

        clipboard
            .set_text(text)
            .map_err(|e| Error::Clipboard(e.to_string()))
    }
}
