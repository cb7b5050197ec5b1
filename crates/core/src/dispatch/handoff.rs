//! Hand-off channels: where a command goes when the user runs it themselves

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::io::Write;
use tracing::{debug, warn};

/// A clipboard-like sink. Every write replaces the previous content.
pub trait HandoffSink {
    /// Publish the literal command text
    fn publish(&mut self, text: &str) -> Result<()>;

    /// Short name used in messages ("clipboard", "stdout", ...)
    fn name(&self) -> &'static str;
}

impl<T: HandoffSink + ?Sized> HandoffSink for Box<T> {
    fn publish(&mut self, text: &str) -> Result<()> {
        (**self).publish(text)
    }

    fn name(&self) -> &'static str {
        (**self).name()
    }
}

/// Configured hand-off destination
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HandoffTarget {
    #[default]
    Clipboard,
    Stdout,
}

/// Open the sink for `target`, falling back to stdout when no clipboard is
/// reachable (headless sessions, builds without the `clipboard` feature).
pub fn open_sink(target: HandoffTarget) -> Box<dyn HandoffSink> {
    match target {
        HandoffTarget::Stdout => Box::new(StdoutSink),
        HandoffTarget::Clipboard => match ClipboardSink::new() {
            Ok(sink) => Box::new(sink),
            Err(e) => {
                warn!("Clipboard unavailable, handing off on stdout: {}", e);
                Box::new(StdoutSink)
            }
        },
    }
}

/// Prints the command on its own line so it can be piped or pasted
#[derive(Debug, Clone, Copy, Default)]
pub struct StdoutSink;

impl HandoffSink for StdoutSink {
    fn publish(&mut self, text: &str) -> Result<()> {
        let mut stdout = std::io::stdout().lock();
        writeln!(stdout, "{text}")?;
        stdout.flush()?;
        Ok(())
    }

    fn name(&self) -> &'static str {
        "stdout"
    }
}

/// Keeps the last published command in memory
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemorySink {
    contents: Option<String>,
    writes: usize,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contents(&self) -> Option<&str> {
        self.contents.as_deref()
    }

    pub fn writes(&self) -> usize {
        self.writes
    }
}

impl HandoffSink for MemorySink {
    fn publish(&mut self, text: &str) -> Result<()> {
        self.contents = Some(text.to_string());
        self.writes += 1;
        Ok(())
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}

/// System clipboard
#[cfg(feature = "clipboard")]
pub struct ClipboardSink {
    clipboard: arboard::Clipboard,
    hold: std::time::Duration,
}

#[cfg(feature = "clipboard")]
impl ClipboardSink {
    pub fn new() -> Result<Self> {
        let clipboard =
            arboard::Clipboard::new().map_err(|e| Error::HandoffError(e.to_string()))?;
        Ok(Self {
            clipboard,
            hold: std::time::Duration::from_secs(2),
        })
    }

    /// How long to keep ownership after a write. On X11 the selection dies
    /// with its owner, and clipboard managers need time to copy it.
    pub fn with_hold(mut self, hold: std::time::Duration) -> Self {
        self.hold = hold;
        self
    }
}

#[cfg(feature = "clipboard")]
impl HandoffSink for ClipboardSink {
    fn publish(&mut self, text: &str) -> Result<()> {
        self.clipboard
            .set_text(text)
            .map_err(|e| Error::HandoffError(e.to_string()))?;
        debug!("Copied {} bytes to clipboard", text.len());
        if cfg!(target_os = "linux") && !self.hold.is_zero() {
            std::thread::sleep(self.hold);
        }
        Ok(())
    }

    fn name(&self) -> &'static str {
        "clipboard"
    }
}

#[cfg(not(feature = "clipboard"))]
pub struct ClipboardSink;

#[cfg(not(feature = "clipboard"))]
impl ClipboardSink {
    pub fn new() -> Result<Self> {
        debug!("Built without clipboard support");
        Err(Error::HandoffError(
            "built without the `clipboard` feature".to_string(),
        ))
    }
}

#[cfg(not(feature = "clipboard"))]
impl HandoffSink for ClipboardSink {
    fn publish(&mut self, _text: &str) -> Result<()> {
        Err(Error::HandoffError(
            "built without the `clipboard` feature".to_string(),
        ))
    }

    fn name(&self) -> &'static str {
        "clipboard"
    }
}
