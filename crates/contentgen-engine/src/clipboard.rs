use crate::error::ClipboardError;

pub trait Clipboard {
    fn set_text(&mut self, text: &str) -> Result<(), ClipboardError>;
}

/// OS clipboard. The handle is opened lazily so headless sessions only fail
/// when a copy is actually requested.
#[derive(Default)]
pub struct SystemClipboard {
    handle: Option<arboard::Clipboard>,
}

impl SystemClipboard {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Clipboard for SystemClipboard {
    fn set_text(&mut self, text: &str) -> Result<(), ClipboardError> {
        if self.handle.is_none() {
            let handle =
                arboard::Clipboard::new().map_err(|err| ClipboardError(err.to_string()))?;
            self.handle = Some(handle);
        }
        let Some(handle) = self.handle.as_mut() else {
            return Err(ClipboardError("clipboard unavailable".to_string()));
        };
        handle
            .set_text(text.to_string())
            .map_err(|err| ClipboardError(err.to_string()))
    }
}

/// In-memory clipboard for tests and headless runs.
#[derive(Debug, Default)]
pub struct MemoryClipboard {
    pub contents: Option<String>,
    pub fail_with: Option<String>,
}

impl Clipboard for MemoryClipboard {
    fn set_text(&mut self, text: &str) -> Result<(), ClipboardError> {
        if let Some(message) = &self.fail_with {
            return Err(ClipboardError(message.clone()));
        }
        self.contents = Some(text.to_string());
        Ok(())
    }
}
